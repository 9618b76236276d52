use clap::{Parser, Subcommand};

use super::config::AppConfig;

/// cartage CLI - source dependency resolution
#[derive(Debug, Clone, Parser)]
#[command(name = "cartage")]
#[command(about = "Resolve, mirror and order source dependencies")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Global configuration options
    #[command(flatten)]
    pub config: AppConfig,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Configuration loaded from CLI
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub app_config: AppConfig,
    pub command: Option<Commands>,
}

/// Available cartage commands
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Resolve the Cartfile and write Cartfile.resolved
    Update {
        #[arg(help = "Only update these dependencies; all of them when empty")]
        dependencies: Vec<String>,
    },

    /// List pinned dependencies that have newer versions
    Outdated,

    /// Print resolved dependencies in the order they must be built
    BuildOrder {
        #[arg(help = "Dependencies to build, with everything they need; all when empty")]
        dependencies: Vec<String>,
    },

    /// Print everything the named dependencies need
    Transitive {
        #[arg(required = true, help = "Dependencies to inspect")]
        dependencies: Vec<String>,
    },

    /// Show version information
    Version,
}

impl Commands {
    /// Whether the command reads the project's Cartfile
    pub fn requires_cartfile(&self) -> bool {
        matches!(self, Commands::Update { .. } | Commands::Outdated)
    }

    /// Whether the command reads an existing Cartfile.resolved
    pub fn requires_resolved(&self) -> bool {
        match self {
            Commands::Outdated | Commands::BuildOrder { .. } | Commands::Transitive { .. } => true,
            Commands::Update { .. } | Commands::Version => false,
        }
    }
}

#[cfg(test)]
mod tests {
    include!("cli.test.rs");
}
