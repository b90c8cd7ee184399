//! Parsing of the wrapped clang-tidy argument vector.
//!
//! Only three things are extracted: the target source file, the
//! compilation-database root (`-p`), and the optional `--export-fixes`
//! path. Everything else is opaque and passed through to the tool.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors when interpreting the wrapped command line.
#[derive(Error, Debug)]
pub enum InvocationError {
    #[error("unable to determine the target source file from the clang-tidy command line")]
    MissingTarget,
}

/// Parsed representation of one wrapped-tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Source file under analysis.
    pub target: PathBuf,

    /// Root directory the compilation database is searched from.
    pub database_root: PathBuf,

    /// Path the tool exports its structured result to, when requested.
    pub export_path: Option<PathBuf>,
}

/// Argument shapes with no meaningful fingerprint; the cache is never
/// consulted for these and the tool always runs.
const BYPASS_FLAGS: &[&str] = &[
    "--version",
    "-version",
    "-list-checks",
    "--list-checks",
    "-dump-config",
    "--dump-config",
    "-explain-config",
    "--explain-config",
    "--help",
    "-h",
];

/// Returns `true` when the invocation is a pure informational query.
pub fn should_bypass(args: &[String]) -> bool {
    args.iter().any(|arg| BYPASS_FLAGS.contains(&arg.as_str()))
}

/// Extract the value of a CLI option at `position`.
///
/// If `args[position]` equals one of `names`, the next argument is the
/// value and the returned position skips both. If it starts with one of
/// `prefixes`, the remainder of the argument is the value. Otherwise the
/// position is returned unchanged with no value.
fn extract_option(
    args: &[String],
    position: usize,
    names: &[&str],
    prefixes: &[&str],
) -> (usize, Option<String>) {
    if position + 1 < args.len() && names.contains(&args[position].as_str()) {
        return (position + 2, Some(args[position + 1].clone()));
    }
    for prefix in prefixes {
        if let Some(value) = args[position].strip_prefix(prefix) {
            return (position + 1, Some(value.to_string()));
        }
    }
    (position, None)
}

/// Parse the argument vector of one wrapped clang-tidy call.
pub fn parse(args: &[String]) -> Result<Invocation, InvocationError> {
    let mut target: Option<PathBuf> = None;
    let mut database_root: Option<PathBuf> = None;
    let mut export_path: Option<PathBuf> = None;

    let mut i = 0;
    while i < args.len() {
        let (next, value) = extract_option(
            args,
            i,
            &["-export-fixes", "--export-fixes"],
            &["-export-fixes=", "--export-fixes="],
        );
        if next > i {
            export_path = value.map(PathBuf::from);
            i = next;
            continue;
        }

        let (next, value) = extract_option(args, i, &["-p", "--p"], &["-p=", "--p="]);
        if next > i {
            database_root = value.map(PathBuf::from);
            i = next;
            continue;
        }

        // The target is the final positional argument
        if i + 1 == args.len() {
            target = Some(PathBuf::from(&args[i]));
        }
        i += 1;
    }

    let target = target.filter(|t| !t.as_os_str().is_empty());
    let Some(target) = target else {
        return Err(InvocationError::MissingTarget);
    };

    // clang-tidy defaults the database root to the target's parent directory
    let database_root = database_root.unwrap_or_else(|| parent_or_dot(&target));

    Ok(Invocation {
        target,
        database_root,
        export_path,
    })
}

fn parent_or_dot(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
