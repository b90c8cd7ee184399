//! Pluggable fingerprint-keyed result cache.
//!
//! All backends implement the two-method [`CacheStore`] contract; the
//! orchestrator never knows which one is behind it. Selection happens
//! once at startup from configuration.

pub mod fs;
pub mod kv;
pub mod object_store;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::Config;
use crate::fingerprint::Fingerprint;

/// Errors from a cache backend. "Entry not present" is never an error.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("could not determine the cache directory")]
    NoCacheDir,

    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cache request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cache backend returned {status} for {url}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        url: String,
    },
}

/// Content-addressed blob store keyed by fingerprint.
///
/// `find` must distinguish "not present" (`Ok(None)`) from a transport
/// or storage failure (`Err`), and must not mutate state. `save` stores
/// or wholesale-overwrites the blob for a fingerprint.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn find(&self, fingerprint: &Fingerprint) -> Result<Option<Vec<u8>>, CacheError>;

    async fn save(&self, fingerprint: &Fingerprint, content: &[u8]) -> Result<(), CacheError>;
}

/// Storage key for a fingerprint: its lowercase hex encoding.
pub fn entry_key(fingerprint: &Fingerprint) -> String {
    fingerprint.to_hex()
}

/// Select the backend from configuration: object store, then key-value
/// service, then the local filesystem store.
pub fn from_config(config: &Config) -> Result<Box<dyn CacheStore>, CacheError> {
    if let Some(store) = &config.cache.object_store {
        return Ok(Box::new(object_store::ObjectStore::new(store.clone())));
    }
    if let Some(kv) = &config.cache.kv {
        return Ok(Box::new(kv::KvStore::new(kv.clone())));
    }
    Ok(Box::new(fs::FsStore::new(config.cache.dir.clone())?))
}
