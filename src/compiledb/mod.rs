//! Compilation database lookup.
//!
//! `compile_commands.json` is located by upward directory search from the
//! invocation's database root and deserialized with serde. Matching of the
//! target path tolerates separator style and a leading `./`.

pub mod command;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants;
use crate::paths;

/// Errors while resolving a compile entry.
#[derive(Error, Debug)]
pub enum CompileDbError {
    #[error("compile_commands.json not found in {0} or any parent directory")]
    DatabaseNotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("no compile entry matches {0}")]
    NoMatch(String),

    #[error("{count} compile entries match {target}")]
    Ambiguous { target: String, count: usize },
}

/// One record from the compilation database.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompileEntry {
    pub directory: String,
    pub command: String,
    pub file: String,
}

/// Resolve the compile entry for `target`.
///
/// Exactly one entry must match, either by the entry's file path directly
/// or by the path joined onto the entry's directory.
pub fn find_entry(database_root: &Path, target: &Path) -> Result<CompileEntry, CompileDbError> {
    let db_path = paths::find_in_parents(database_root, constants::COMPILE_DB_FILENAME)
        .ok_or_else(|| CompileDbError::DatabaseNotFound(database_root.to_path_buf()))?;

    let content = std::fs::read_to_string(&db_path).map_err(|e| CompileDbError::Read {
        path: db_path.clone(),
        source: e,
    })?;
    let entries: Vec<CompileEntry> =
        serde_json::from_str(&content).map_err(|e| CompileDbError::Parse {
            path: db_path,
            source: e,
        })?;

    let target_norm = paths::normalize(&target.to_string_lossy());
    let mut matches: Vec<CompileEntry> = entries
        .into_iter()
        .filter(|entry| entry_matches(entry, &target_norm))
        .collect();

    match matches.len() {
        0 => Err(CompileDbError::NoMatch(target_norm)),
        1 => Ok(matches.remove(0)),
        count => Err(CompileDbError::Ambiguous {
            target: target_norm,
            count,
        }),
    }
}

fn entry_matches(entry: &CompileEntry, target_norm: &str) -> bool {
    let file = paths::normalize(&entry.file);
    if file == target_norm {
        return true;
    }
    let joined = Path::new(&entry.directory).join(target_norm);
    file == paths::normalize(&joined.to_string_lossy())
}
