//! CLI parsing, TOML config loading, and PID file lifecycle for
//! `pacserve`. Kept in its own crate so the binary and any future
//! auxiliary tool (a `--validate-configs` linter, say) share one
//! config surface, matching the teacher stack's crate split.

pub mod cli;
pub mod config;
pub mod error;
pub mod pidfile;

pub use cli::Cli;
pub use config::Config;
pub use error::ConfigError;
