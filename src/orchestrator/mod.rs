//! Cache-or-run decision flow for one wrapped invocation.
//!
//! Three paths: **bypassed** (informational queries; the tool always
//! runs, the cache is never consulted), **hit** (the cached result is
//! replayed and the tool never runs), and **miss** (the tool runs; its
//! exported result is stored only after a confirmed successful exit).

use std::path::{Path, PathBuf};

use colored::Colorize;
use thiserror::Error;

use crate::cache::{CacheError, CacheStore};
use crate::config::Config;
use crate::fingerprint::{self, FingerprintError};
use crate::invocation::{self, InvocationError};
use crate::runner::{self, RunError};

/// Errors from the orchestrator.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),

    #[error("cache lookup failed: {0}")]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Run(#[from] RunError),

    #[error("failed to write the cached result to {path}: {source}")]
    WriteExport {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {path} after the tool run: {source}")]
    ReadExport {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// How one wrapped invocation was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Informational query; the cache was not consulted.
    Bypassed,
    /// Cached result replayed; the tool was not invoked.
    Hit,
    /// Tool invoked; its result was captured for next time.
    Miss,
}

/// Wires invocation parsing, fingerprinting, the cache store, and the
/// tool runner together for a single process run.
pub struct Orchestrator {
    config: Config,
    store: Box<dyn CacheStore>,
}

impl Orchestrator {
    pub fn new(config: Config, store: Box<dyn CacheStore>) -> Self {
        Self { config, store }
    }

    /// Evaluate one wrapped clang-tidy invocation.
    ///
    /// Fingerprint and cache-lookup failures are fatal; a cache-write
    /// failure after a successful run is reported to stderr only and
    /// does not affect the run's outcome.
    pub async fn evaluate(
        &self,
        working_dir: &Path,
        args: &[String],
    ) -> Result<Outcome, OrchestratorError> {
        if invocation::should_bypass(args) {
            runner::run_tool(&self.config.tool.path, args).await?;
            return Ok(Outcome::Bypassed);
        }

        let invocation = invocation::parse(args)?;
        let fingerprint = fingerprint::compute(&self.config, &invocation, working_dir).await?;

        if let Some(content) = self.store.find(&fingerprint).await? {
            if let Some(path) = &invocation.export_path {
                tokio::fs::write(path, &content).await.map_err(|e| {
                    OrchestratorError::WriteExport {
                        path: path.clone(),
                        source: e,
                    }
                })?;
            }
            return Ok(Outcome::Hit);
        }

        runner::run_tool(&self.config.tool.path, args).await?;

        let content = match &invocation.export_path {
            Some(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|e| OrchestratorError::ReadExport {
                        path: path.clone(),
                        source: e,
                    })?
            }
            None => Vec::new(),
        };
        if let Err(e) = self.store.save(&fingerprint, &content).await {
            eprintln!(
                "{} failed to store cache entry {fingerprint}: {e}",
                "Warning:".yellow(),
            );
        }
        Ok(Outcome::Miss)
    }
}
