//! Clap argument types for the management surface.
//!
//! Only the management commands go through clap; a wrapped clang-tidy
//! invocation is dispatched in `main` before parsing and never reaches
//! these types.

use clap::Parser;

use tidycache::constants;

/// Fingerprint-keyed result cache for clang-tidy.
#[derive(Parser, Debug)]
#[command(
    name = constants::APP_NAME,
    version = constants::VERSION,
    about = "Fingerprint-keyed result cache for clang-tidy.\n\n\
             Invoke with any clang-tidy argument vector to run through the cache,\n\
             or with one of the management commands below.",
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available management commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Manage the local result cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Print version information.
    Version,
}

/// Cache management subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum CacheAction {
    /// Remove all locally cached results.
    Clear,
    /// Show cache statistics (entry count and size).
    Stats,
    /// Print the local cache directory path.
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cache_stats() {
        let cli = Cli::try_parse_from(["tidycache", "cache", "stats"]).unwrap();
        match cli.command {
            Command::Cache {
                action: CacheAction::Stats,
            } => {}
            other => panic!("expected cache stats, got {other:?}"),
        }
    }

    #[test]
    fn parse_cache_clear() {
        let cli = Cli::try_parse_from(["tidycache", "cache", "clear"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Cache {
                action: CacheAction::Clear
            }
        ));
    }

    #[test]
    fn parse_version() {
        let cli = Cli::try_parse_from(["tidycache", "version"]).unwrap();
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn unknown_subcommand_fails() {
        assert!(Cli::try_parse_from(["tidycache", "frobnicate"]).is_err());
    }
}
