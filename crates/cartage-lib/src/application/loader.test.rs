use super::*;
use crate::application::Commands;
use crate::primitives::{ColorChoice, LogFormat, LogLevel};
use std::ffi::OsString;
use tempfile::TempDir;

fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[test]
fn test_config_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.log_level, LogLevel::Warning);
    assert_eq!(config.net_timeout, 30);
    assert_eq!(config.fetch_interval, 60);
    assert_eq!(config.color, ColorChoice::Auto);
}

#[test]
fn test_from_cli_fills_directories() {
    let workdir = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let args: Vec<OsString> = vec![
        "cartage".into(),
        "--workdir".into(),
        workdir.path().into(),
        "--cache-dir".into(),
        cache.path().into(),
        "outdated".into(),
    ];
    let cli = Cli::try_parse_from(args).unwrap();

    let config = CliConfig::from_cli(cli, &EnvironmentConfig::default()).unwrap();
    assert_eq!(config.app_config.workdir.as_deref(), Some(workdir.path()));
    assert_eq!(config.app_config.cache_dir.as_deref(), Some(cache.path()));
    assert_eq!(config.command, Some(Commands::Outdated));
}

#[test]
fn test_from_cli_applies_color_environment() {
    let cli = Cli::try_parse_from(["cartage", "--cache-dir", "/tmp/cartage-cache"]).unwrap();
    let environment = EnvironmentConfig {
        no_color: Some("1".to_string()),
        ..EnvironmentConfig::default()
    };

    let config = CliConfig::from_cli(cli, &environment).unwrap();
    assert_eq!(config.app_config.color, ColorChoice::Never);
    assert!(config.app_config.workdir.is_some());
    assert_eq!(config.command, None);
}

#[test]
fn test_from_vars_reads_prefixed_values() {
    let config = AppConfig::from_vars(vars(&[
        ("CARTAGE_CACHE_DIR", "/tmp/cartage-cache"),
        ("CARTAGE_FETCH_INTERVAL", "5"),
        ("CARTAGE_LOG_LEVEL", "debug"),
        ("CARTAGE_LOG_FORMAT", "json"),
        ("UNRELATED_SETTING", "ignored"),
    ]))
    .unwrap();

    assert_eq!(config.fetch_interval(), std::time::Duration::from_secs(5));
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.log_format, LogFormat::Json);
    assert_eq!(
        config.cache_dir.as_deref(),
        Some(std::path::Path::new("/tmp/cartage-cache"))
    );
}

#[test]
fn test_zero_timeout_is_rejected() {
    let err = AppConfig::from_vars(vars(&[("CARTAGE_NET_TIMEOUT", "0")])).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { .. }));
}

#[test]
fn test_invalid_value_is_a_parse_error() {
    let err = AppConfig::from_vars(vars(&[("CARTAGE_FETCH_INTERVAL", "soon")])).unwrap_err();
    assert!(matches!(err, ConfigError::EnvironmentParsingFailed { .. }));
}
