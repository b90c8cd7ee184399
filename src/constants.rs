//! App-wide constants.
//!
//! Centralises the tool name, well-known filenames, and environment
//! variable names so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "tidycache";

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wrapped analysis tool invoked when no override is configured.
pub const DEFAULT_TOOL: &str = "clang-tidy";

/// Compilation database filename, located by upward directory search.
pub const COMPILE_DB_FILENAME: &str = "compile_commands.json";

/// Project-level analysis configuration whose bytes join the fingerprint.
pub const TIDY_CONFIG_FILENAME: &str = ".clang-tidy";

/// Directory name under `~/.config/` for the global config file.
pub const CONFIG_DIR: &str = "tidycache";


// ── Environment variable names ──────────────────────────────────────

pub const ENV_BINARY: &str = "TIDYCACHE_BINARY";
pub const ENV_BASE_DIR: &str = "TIDYCACHE_BASE_DIR";
pub const ENV_HASH_BINARY: &str = "TIDYCACHE_HASH_BINARY";
pub const ENV_CACHE_DIR: &str = "TIDYCACHE_CACHE_DIR";
pub const ENV_OBJECT_STORE_URL: &str = "TIDYCACHE_OBJECT_STORE_URL";
pub const ENV_OBJECT_STORE_BUCKET: &str = "TIDYCACHE_OBJECT_STORE_BUCKET";
pub const ENV_OBJECT_STORE_TOKEN: &str = "TIDYCACHE_OBJECT_STORE_TOKEN";
pub const ENV_KV_URL: &str = "TIDYCACHE_KV_URL";
pub const ENV_KV_PASSWORD: &str = "TIDYCACHE_KV_PASSWORD";
pub const ENV_KV_NAMESPACE: &str = "TIDYCACHE_KV_NAMESPACE";
