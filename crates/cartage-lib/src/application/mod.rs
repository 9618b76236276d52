//! Application layer modules
//!
//! CLI interface, configuration loading, and command execution.

pub mod cli;
pub mod commands;
pub mod config;
pub mod env;
pub mod loader;
pub mod project;

// Re-export main types for convenience
pub use cli::{Cli, CliConfig, Commands};
pub use commands::{execute_command, execute_command_with_project};
pub use config::AppConfig;
pub use env::EnvironmentConfig;
pub use loader::*;
pub use project::{Project, ProjectError};
