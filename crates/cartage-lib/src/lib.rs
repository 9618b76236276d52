//! # cartage Library
//!
//! Resolves versioned source dependencies into a reproducible pin set,
//! keeps local git mirrors of them fresh, and derives build orders.
//!
//! ## Core Modules
//!
//! - [`cartfile`] - Dependency, version and manifest types; Cartfile merging
//! - [`sync`] - Deduplicated clone/fetch of repository mirrors
//! - [`resolver`] - Backtracking version resolution over a requirement provider
//! - [`graph`] - Transitive dependencies and build order of a resolution
//! - [`outdated`] - Pinned vs. newest-allowed vs. newest versions
//! - [`application`] - CLI interface, configuration and command handlers
//! - [`primitives`] / [`logger`] - Shared config types and tracing setup
//! - [`testing`] - In-memory provider and mirror for tests
//!
//! ## Quick Start
//!
//! ```no_run
//! use cartage_lib::cartfile::Cartfile;
//! use cartage_lib::resolver::{ResolveOptions, Resolver};
//! use cartage_lib::testing::{InMemoryProvider, github};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let provider = InMemoryProvider::new().with_version(&github("antitypical/Result"), "3.2.4", vec![]);
//! let cartfile = Cartfile::parse("Cartfile", "github \"antitypical/Result\" ~> 3.0\n")?;
//! let resolved = Resolver::new(Arc::new(provider))
//!     .resolve(&cartfile, &ResolveOptions::default())
//!     .await?;
//! print!("{resolved}");
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod cartfile;
pub mod graph;
pub mod logger;
pub mod outdated;
pub mod primitives;
pub mod resolver;
pub mod sync;
pub mod testing;

// Re-export commonly used types for convenience
pub use application::{AppConfig, Cli, Commands, Project, execute_command};
pub use cartfile::{Cartfile, Dependency, PinnedVersion, ResolvedCartfile, VersionSpecifier};
pub use graph::BuildGraph;
pub use logger::Logger;
pub use outdated::{OutdatedAnalyzer, OutdatedDependency};
pub use primitives::{ColorChoice, ConfigError, LogFormat, LogLevel, LogOutput, LoggerError};
pub use resolver::{RequirementProvider, ResolveOptions, Resolver, UpdatePolicy};
pub use sync::{FetchCache, ProjectEvent, Synchronizer};

// Private imports for the main function
use anyhow::{Context, Result};
use application::CliConfig;

pub async fn main() -> Result<()> {
    let config = CliConfig::load().context("Failed to load configuration")?;
    Logger::init(config.app_config.to_logger_config()).context("Failed to initialize logging")?;

    execute_command(config).await
}
