use cartage_lib::application::{AppConfig, Cli, CliConfig, Commands, EnvironmentConfig};
use cartage_lib::primitives::{ColorChoice, ConfigError, LogLevel};
use clap::Parser;

fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[test]
fn test_config_default_creation() {
    let config = AppConfig::default();

    assert!(config.net_timeout > 0);
    assert_eq!(config.fetch_interval, 60);
    assert_eq!(config.color, ColorChoice::Auto);
    assert!(config.workdir.is_none());
}

#[test]
fn test_environment_layer() {
    let config = AppConfig::from_vars(vars(&[
        ("CARTAGE_WORKDIR", "/tmp/project"),
        ("CARTAGE_CACHE_DIR", "/tmp/cartage-cache"),
        ("CARTAGE_NET_TIMEOUT", "5"),
        ("CARTAGE_LOG_LEVEL", "trace"),
        ("CARTAGE_COLOR", "never"),
    ]))
    .unwrap();

    assert_eq!(config.net_timeout(), std::time::Duration::from_secs(5));
    assert_eq!(config.log_level, LogLevel::Trace);
    assert_eq!(config.color, ColorChoice::Never);
    assert_eq!(config.project_dir().unwrap(), std::path::PathBuf::from("/tmp/project"));
}

#[test]
fn test_validation_errors_surface() {
    let err = AppConfig::from_vars(vars(&[("CARTAGE_NET_TIMEOUT", "0")])).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { .. }));
}

#[test]
fn test_cli_layer_wins_over_color_environment() {
    let cli = Cli::try_parse_from([
        "cartage",
        "--color",
        "always",
        "--cache-dir",
        "/tmp/cartage-cache",
        "transitive",
        "Moya",
    ])
    .unwrap();
    let environment = EnvironmentConfig {
        no_color: Some("1".to_string()),
        ..EnvironmentConfig::default()
    };

    let config = CliConfig::from_cli(cli, &environment).unwrap();
    assert_eq!(config.app_config.color, ColorChoice::Always);
    assert_eq!(
        config.command,
        Some(Commands::Transitive {
            dependencies: vec!["Moya".to_string()]
        })
    );
}
