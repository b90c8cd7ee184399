//! Fingerprint derivation for one analysis run.
//!
//! The fingerprint captures "this exact preprocessed source, under this
//! exact analysis configuration, with this exact tool build". It is the
//! sole cache key: equal fingerprints replay cached results, so every
//! input that can change the tool's output must feed the digest.
//!
//! Derivation pipeline (each step depends on the previous):
//! 1. resolve the compile entry for the target
//! 2. parse its compiler command line
//! 3. run the preprocessor (`-E -P`) into a scoped temp file and hash it
//! 4. hash the project `.clang-tidy`
//! 5. optionally hash the tool binary itself
//! 6. fold the digests, in that fixed order, into one SHA-256 state

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::compiledb::command::{self, CommandError, CompilerCommand};
use crate::compiledb::{self, CompileDbError, CompileEntry};
use crate::config::Config;
use crate::constants;
use crate::invocation::Invocation;
use crate::paths;

/// Size of a fingerprint in bytes (SHA-256).
pub const FINGERPRINT_LEN: usize = 32;

/// Content-derived digest used as the cache key for one analysis run.
///
/// Compared as raw bytes; rendered as lowercase hex only when a storage
/// key is formed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    pub fn from_bytes(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Lowercase hexadecimal rendering, used for storage keys.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

/// Errors during fingerprint computation. All of them are fatal to the
/// wrapped run: there is no fallback to "always run the tool".
#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error(transparent)]
    CompileDb(#[from] CompileDbError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("failed to create a temporary preprocessor output file: {0}")]
    TempFile(std::io::Error),

    #[error("failed to run preprocessor {compiler}: {source}")]
    PreprocessorSpawn {
        compiler: String,
        source: std::io::Error,
    },

    #[error("preprocessor {compiler} exited with {status}")]
    PreprocessorFailed {
        compiler: String,
        status: ExitStatus,
    },

    #[error("failed to read preprocessed output: {0}")]
    ReadOutput(std::io::Error),

    #[error(".clang-tidy not found in {0} or any parent directory")]
    ConfigNotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unable to resolve {0} to an executable")]
    ToolNotFound(String),

    #[error("failed to read tool binary {path}: {source}")]
    ReadTool {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Compute the fingerprint for one invocation.
///
/// `working_dir` anchors the upward search for the project `.clang-tidy`.
pub async fn compute(
    config: &Config,
    invocation: &Invocation,
    working_dir: &Path,
) -> Result<Fingerprint, FingerprintError> {
    let entry = compiledb::find_entry(&invocation.database_root, &invocation.target)?;
    let compile_command = command::parse(&entry.command)?;

    let preprocessed = preprocessed_digest(
        &entry,
        &compile_command,
        config.tool.base_dir.as_deref(),
    )
    .await?;
    let tidy_config = tidy_config_digest(working_dir)?;

    // Fixed feed order keeps the fingerprint reproducible
    let mut hasher = Sha256::new();
    hasher.update(preprocessed);
    hasher.update(tidy_config);
    if config.tool.hash_binary {
        hasher.update(tool_binary_digest(&config.tool.path)?);
    }
    Ok(Fingerprint(hasher.finalize().into()))
}

/// Run the compiler in preprocess-only mode and hash its output.
///
/// `-P` suppresses linemarkers, which would otherwise embed absolute
/// header paths and make the digest machine-dependent. The temp file is
/// removed on every exit path when the guard drops.
async fn preprocessed_digest(
    entry: &CompileEntry,
    command: &CompilerCommand,
    base_dir: Option<&Path>,
) -> Result<[u8; 32], FingerprintError> {
    let tmp = tempfile::Builder::new()
        .prefix("tidycache-")
        .suffix(".i")
        .tempfile()
        .map_err(FingerprintError::TempFile)?;
    let output_path = tmp.path().to_path_buf();

    let status = tokio::process::Command::new(&command.compiler)
        .args(&command.arguments)
        .arg("-E")
        .arg("-P")
        .arg("-o")
        .arg(&output_path)
        .arg(&command.input)
        .current_dir(&entry.directory)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| FingerprintError::PreprocessorSpawn {
            compiler: command.compiler.clone(),
            source: e,
        })?;
    if !status.success() {
        return Err(FingerprintError::PreprocessorFailed {
            compiler: command.compiler.clone(),
            status,
        });
    }

    let data = tokio::fs::read(&output_path)
        .await
        .map_err(FingerprintError::ReadOutput)?;

    let digest = match base_dir {
        Some(dir) => {
            let prefix = dir.to_string_lossy();
            sha256(&replace_all(&data, prefix.as_bytes(), b"."))
        }
        None => sha256(&data),
    };
    Ok(digest)
}

/// Hash the project-level `.clang-tidy`, searched upward from `working_dir`.
fn tidy_config_digest(working_dir: &Path) -> Result<[u8; 32], FingerprintError> {
    let path = paths::find_in_parents(working_dir, constants::TIDY_CONFIG_FILENAME)
        .ok_or_else(|| FingerprintError::ConfigNotFound(working_dir.to_path_buf()))?;
    let data = std::fs::read(&path).map_err(|e| FingerprintError::ReadConfig {
        path: path.clone(),
        source: e,
    })?;
    Ok(sha256(&data))
}

/// Hash the analysis tool's own binary, resolved through `PATH`.
/// Different tool builds can emit different diagnostics for the same input.
fn tool_binary_digest(tool: &str) -> Result<[u8; 32], FingerprintError> {
    let path = paths::resolve_executable(tool)
        .ok_or_else(|| FingerprintError::ToolNotFound(tool.to_string()))?;
    let data = std::fs::read(&path).map_err(|e| FingerprintError::ReadTool {
        path: path.clone(),
        source: e,
    })?;
    Ok(sha256(&data))
}

fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Replace every occurrence of `needle` in `haystack` with `replacement`.
fn replace_all(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Vec<u8> {
    if needle.is_empty() {
        return haystack.to_vec();
    }
    let mut result = Vec::with_capacity(haystack.len());
    let mut rest = haystack;
    while let Some(pos) = find(rest, needle) {
        result.extend_from_slice(&rest[..pos]);
        result.extend_from_slice(replacement);
        rest = &rest[pos + needle.len()..];
    }
    result.extend_from_slice(rest);
    result
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
