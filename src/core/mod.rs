//! Core application functionality
//!
//! This module contains the application shell around the library:
//! - Error types shared by every stage of loading
//! - CLI parsing and the user config file
//! - The runner that dispatches subcommands

pub mod cli;
pub mod config_file;
pub mod errors;
pub mod platform;
pub mod runner;

// Re-export commonly used items
pub use cli::CliArgs;
pub use config_file::ConfigFile;
pub use errors::{FontError, FontResult, TriangulateError};
pub use runner::run_app;
