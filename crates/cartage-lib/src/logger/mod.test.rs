use super::*;

#[test]
fn test_filter_directives() {
    let directives = Logger::filter_directives(LogLevel::Debug);
    assert!(directives.starts_with("cartage=debug,cartage_lib=debug,"));
    assert!(directives.contains("reqwest=warn"));
    assert!(directives.ends_with(",debug"));

    // Must be accepted by the subscriber
    assert!(EnvFilter::try_new(&directives).is_ok());
}

#[test]
fn test_init_once() {
    let config = LoggerConfig {
        level: LogLevel::Trace,
        format: LogFormat::Text,
        output: LogOutput::Stderr,
        color: ColorChoice::Never,
    };

    let logger = Logger::init(config.clone()).unwrap();
    assert_eq!(logger.config().level, LogLevel::Trace);
    assert!(Logger::is_initialized());

    assert!(matches!(
        Logger::init(config),
        Err(LoggerError::AlreadyInitialized)
    ));
}
