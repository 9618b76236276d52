use super::*;

#[test]
fn test_parse_update_with_names() {
    let cli = Cli::try_parse_from(["cartage", "update", "Moya", "Result"]).unwrap();
    assert_eq!(
        cli.command,
        Some(Commands::Update {
            dependencies: vec!["Moya".to_string(), "Result".to_string()]
        })
    );
}

#[test]
fn test_parse_global_options() {
    let cli = Cli::try_parse_from([
        "cartage",
        "--workdir",
        "/tmp/project",
        "--fetch-interval",
        "5",
        "--log-level",
        "debug",
        "build-order",
    ])
    .unwrap();

    assert_eq!(cli.config.workdir.as_deref(), Some(std::path::Path::new("/tmp/project")));
    assert_eq!(cli.config.fetch_interval, 5);
    assert_eq!(cli.config.log_level, crate::primitives::LogLevel::Debug);
    assert_eq!(
        cli.command,
        Some(Commands::BuildOrder {
            dependencies: vec![]
        })
    );
}

#[test]
fn test_transitive_requires_a_name() {
    assert!(Cli::try_parse_from(["cartage", "transitive"]).is_err());
}

#[test]
fn test_command_requirements() {
    assert!(Commands::Outdated.requires_cartfile());
    assert!(Commands::Outdated.requires_resolved());
    assert!(!Commands::Version.requires_resolved());
    assert!(!Commands::Update { dependencies: vec![] }.requires_resolved());
    assert!(Commands::Transitive { dependencies: vec![] }.requires_resolved());
    assert!(!Commands::BuildOrder { dependencies: vec![] }.requires_cartfile());
}
