//! Path helpers shared by the compile-database and fingerprint code.

use std::path::{Path, PathBuf};

/// Search for `filename` in `start` and successively in each parent
/// directory, returning the full path of the first match.
pub fn find_in_parents(start: &Path, filename: &str) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        let candidate = dir.join(filename);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

/// Normalize a path string for cross-platform comparison: forward
/// slashes only, no leading `./`.
pub fn normalize(path: &str) -> String {
    let posix = path.replace('\\', "/");
    match posix.strip_prefix("./") {
        Some(rest) => rest.to_string(),
        None => posix,
    }
}

/// Resolve an executable name to an absolute path.
///
/// Names containing a path separator are resolved directly; bare names
/// are searched for in each entry of `PATH`.
pub fn resolve_executable(name: &str) -> Option<PathBuf> {
    let direct = Path::new(name);
    if direct.components().count() > 1 {
        return std::fs::canonicalize(direct).ok();
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
