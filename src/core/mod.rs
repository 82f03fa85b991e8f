//! Command-line application layer
//!
//! - CLI parsing and validation
//! - The user settings file
//! - The runner tying settings, pipeline and output together

pub mod cli;
pub mod config_file;
pub mod platform;
pub mod runner;

pub use cli::CliArgs;
pub use config_file::ConfigFile;
pub use runner::run_app;
