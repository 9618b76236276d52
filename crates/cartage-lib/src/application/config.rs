//! Application configuration management
//!
//! Handles config loading, validation, and environment variable processing
//! following the precedence: defaults -> .env -> env vars -> CLI args.

use crate::primitives::*;
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default configuration values
pub mod defaults {
    pub const LOG_LEVEL: &str = "warn";
    pub const LOG_FORMAT: &str = "text";
    pub const LOG_OUTPUT: &str = "stderr";
    pub const COLOR: &str = "auto";
    pub const NET_TIMEOUT: &str = "30";
    pub const FETCH_INTERVAL: &str = "60";
    /// Directory name used under the platform cache or home directory
    pub const CACHE_NAME: &str = "cartage";
}

/// Default value functions for configuration fields
mod default_fns {
    use crate::primitives::{ColorChoice, LogFormat, LogLevel, LogOutput};
    use crate::sync::DEFAULT_FETCH_INTERVAL_SECS;

    pub fn log_level() -> LogLevel {
        LogLevel::Warning
    }

    pub fn log_format() -> LogFormat {
        LogFormat::Text
    }

    pub fn log_output() -> LogOutput {
        LogOutput::Stderr
    }

    pub fn color() -> ColorChoice {
        ColorChoice::Auto
    }

    pub fn net_timeout() -> u64 {
        30
    }

    pub fn fetch_interval() -> u64 {
        DEFAULT_FETCH_INTERVAL_SECS
    }
}

/// Application configuration structure
#[derive(Debug, Clone, Parser, Deserialize)]
pub struct AppConfig {
    /// Project directory containing the Cartfile
    #[arg(short, long, env = "CARTAGE_WORKDIR")]
    #[serde(default)]
    pub workdir: Option<PathBuf>,

    /// Where repository mirrors are kept
    #[arg(long, env = "CARTAGE_CACHE_DIR")]
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Seconds a fetched repository counts as fresh
    #[arg(long, env = "CARTAGE_FETCH_INTERVAL", default_value = defaults::FETCH_INTERVAL)]
    #[serde(default = "default_fns::fetch_interval")]
    pub fetch_interval: u64,

    /// HTTP timeout in seconds
    #[arg(short, long, env = "CARTAGE_NET_TIMEOUT", default_value = defaults::NET_TIMEOUT)]
    #[serde(default = "default_fns::net_timeout")]
    pub net_timeout: u64,

    /// Log verbosity (error, warn, info, debug, trace)
    #[arg(long, env = "CARTAGE_LOG_LEVEL", default_value = defaults::LOG_LEVEL)]
    #[serde(default = "default_fns::log_level")]
    pub log_level: LogLevel,

    /// Output format (text, json, yaml)
    #[arg(long, env = "CARTAGE_LOG_FORMAT", default_value = defaults::LOG_FORMAT)]
    #[serde(default = "default_fns::log_format")]
    pub log_format: LogFormat,

    /// Log output stream (stderr, stdout)
    #[arg(long, env = "CARTAGE_LOG_OUTPUT", default_value = defaults::LOG_OUTPUT)]
    #[serde(default = "default_fns::log_output")]
    pub log_output: LogOutput,

    /// Color output control (auto, always, never)
    #[arg(short, long, env = "CARTAGE_COLOR", default_value = defaults::COLOR)]
    #[serde(default = "default_fns::color")]
    pub color: ColorChoice,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workdir: None,
            cache_dir: None,
            fetch_interval: default_fns::fetch_interval(),
            net_timeout: default_fns::net_timeout(),
            log_level: default_fns::log_level(),
            log_format: default_fns::log_format(),
            log_output: default_fns::log_output(),
            color: default_fns::color(),
        }
    }
}

impl AppConfig {
    pub fn to_logger_config(&self) -> LoggerConfig {
        LoggerConfig {
            level: self.log_level,
            format: self.log_format,
            output: self.log_output,
            color: self.color,
        }
    }

    pub fn fetch_interval(&self) -> Duration {
        Duration::from_secs(self.fetch_interval)
    }

    pub fn net_timeout(&self) -> Duration {
        Duration::from_secs(self.net_timeout)
    }

    /// Project directory, falling back to the current one
    pub fn project_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.workdir {
            Some(workdir) => Ok(workdir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// Mirror cache directory, falling back to the platform default
    pub fn cache_root(&self) -> Result<PathBuf, ConfigError> {
        if let Some(cache_dir) = &self.cache_dir {
            return Ok(cache_dir.clone());
        }

        if let Some(dirs) = directories::ProjectDirs::from("", "", defaults::CACHE_NAME) {
            return Ok(dirs.cache_dir().to_path_buf());
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(format!(".{}", defaults::CACHE_NAME)))
            .ok_or_else(|| ConfigError::ValidationFailed {
                reason: "no cache directory available; set CARTAGE_CACHE_DIR".to_string(),
            })
    }

    /// Validate the final configuration, filling in directories
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.net_timeout == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "net timeout must be at least one second".to_string(),
            });
        }

        self.workdir = Some(self.project_dir()?);
        self.cache_dir = Some(self.cache_root()?);
        Ok(())
    }
}
