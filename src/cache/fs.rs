//! Local filesystem blob store.
//!
//! Entries live under `~/.cache/tidycache` by default, sharded into
//! `xx/yy/<rest-of-hex>` by the leading key bytes to bound directory
//! fan-out.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::cache::{self, CacheError, CacheStore};
use crate::constants;
use crate::fingerprint::Fingerprint;

/// Filesystem-backed cache store.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a store rooted at `dir`, or at the platform cache
    /// directory when no override is given.
    pub fn new(dir: Option<PathBuf>) -> Result<Self, CacheError> {
        let root = dir
            .or_else(|| dirs::cache_dir().map(|d| d.join(constants::APP_NAME)))
            .ok_or(CacheError::NoCacheDir)?;
        Ok(Self { root })
    }

    /// Return the store's root directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Shard directory and full entry path for a fingerprint.
    fn entry_path(&self, fingerprint: &Fingerprint) -> (PathBuf, PathBuf) {
        let key = cache::entry_key(fingerprint);
        let shard = self.root.join(&key[0..2]).join(&key[2..4]);
        let entry = shard.join(&key[4..]);
        (shard, entry)
    }

    /// Remove all cached entries, returning the stats from before.
    pub fn clear(&self) -> Result<CacheStats, std::io::Error> {
        let stats = self.stats()?;
        if self.root.exists() {
            std::fs::remove_dir_all(&self.root)?;
        }
        Ok(stats)
    }

    /// Count entries and total bytes under the store root.
    pub fn stats(&self) -> Result<CacheStats, std::io::Error> {
        let mut stats = CacheStats {
            entries: 0,
            total_bytes: 0,
        };
        if self.root.exists() {
            visit(&self.root, &mut stats)?;
        }
        Ok(stats)
    }
}

fn visit(dir: &Path, stats: &mut CacheStats) -> Result<(), std::io::Error> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            visit(&entry.path(), stats)?;
        } else if file_type.is_file() {
            stats.entries += 1;
            stats.total_bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
    }
    Ok(())
}

#[async_trait]
impl CacheStore for FsStore {
    async fn find(&self, fingerprint: &Fingerprint) -> Result<Option<Vec<u8>>, CacheError> {
        let (_, entry) = self.entry_path(fingerprint);
        match tokio::fs::read(&entry).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Io {
                path: entry,
                source: e,
            }),
        }
    }

    async fn save(&self, fingerprint: &Fingerprint, content: &[u8]) -> Result<(), CacheError> {
        let (shard, entry) = self.entry_path(fingerprint);
        tokio::fs::create_dir_all(&shard)
            .await
            .map_err(|e| CacheError::Io {
                path: shard.clone(),
                source: e,
            })?;
        tokio::fs::write(&entry, content)
            .await
            .map_err(|e| CacheError::Io {
                path: entry,
                source: e,
            })
    }
}

/// Statistics about the local store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached entries.
    pub entries: usize,
    /// Total size in bytes.
    pub total_bytes: u64,
}

impl CacheStats {
    /// Format total_bytes as a human-readable string.
    pub fn human_size(&self) -> String {
        const KB: u64 = 1024;
        const MB: u64 = 1024 * KB;

        if self.total_bytes >= MB {
            format!("{:.1} MiB", self.total_bytes as f64 / MB as f64)
        } else if self.total_bytes >= KB {
            format!("{:.1} KiB", self.total_bytes as f64 / KB as f64)
        } else {
            format!("{} B", self.total_bytes)
        }
    }
}
