//! tidycache: fingerprint-keyed result cache for clang-tidy (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod cache;
pub mod compiledb;
pub mod config;
pub mod constants;
pub mod env;
pub mod fingerprint;
pub mod invocation;
pub mod orchestrator;
pub mod paths;
pub mod runner;
