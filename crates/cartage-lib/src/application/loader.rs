//! Configuration loading
//!
//! Layers `.env` files, standard environment variables and CLI arguments
//! into one validated [`AppConfig`].

use crate::primitives::ConfigError;
use clap::Parser;
use tracing::trace;

use super::{
    cli::{Cli, CliConfig},
    config::AppConfig,
    env::EnvironmentConfig,
};

/// Dotenv files read from the current directory, highest priority first
pub const ENV_FILES: [&str; 2] = [".env.local", ".env"];

/// Load dotenv files into the process environment; missing files are skipped
pub fn load_env_files() -> Result<(), ConfigError> {
    for env_file in ENV_FILES {
        match dotenvy::from_filename(env_file) {
            Ok(path) => trace!(path = %path.display(), "Loaded environment file"),
            Err(e) if e.not_found() => {}
            Err(e) => {
                return Err(ConfigError::EnvFileError {
                    file: env_file.to_string(),
                    source: e,
                });
            }
        }
    }
    Ok(())
}

impl CliConfig {
    /// Load config: defaults -> .env -> env vars -> CLI
    pub fn load() -> Result<Self, ConfigError> {
        load_env_files()?;
        Self::from_cli(Cli::parse(), &EnvironmentConfig::load()?)
    }

    /// Finish a parsed command line: apply color variables, then validate
    pub fn from_cli(cli: Cli, environment: &EnvironmentConfig) -> Result<Self, ConfigError> {
        let mut app_config = cli.config;
        app_config.color = environment.apply_color_config(app_config.color);
        app_config.validate()?;

        Ok(Self {
            app_config,
            command: cli.command,
        })
    }
}

impl AppConfig {
    /// Configuration from `CARTAGE_*` environment variables alone
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Configuration from `CARTAGE_*` pairs, ignoring everything else
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config: AppConfig = envy::prefixed("CARTAGE_").from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    include!("loader.test.rs");
}
