use super::*;

macro_rules! test_enum_completeness {
    ($enum_type:ty, $test_name:ident) => {
        #[test]
        fn $test_name() {
            for variant in <$enum_type>::value_variants() {
                let possible_value = variant
                    .to_possible_value()
                    .expect("every variant has a possible value");

                let parsed: $enum_type = possible_value.get_name().parse().unwrap();
                assert_eq!(parsed, *variant, "round-trip through primary name");
            }
        }
    };
}

macro_rules! test_fromstr_aliases {
    ($enum_type:ty, $test_name:ident, $expected_mappings:expr) => {
        #[test]
        fn $test_name() {
            let mappings: &[(&str, $enum_type)] = &$expected_mappings;

            for (input, expected) in mappings {
                let parsed: Result<$enum_type, _> = input.parse();
                assert_eq!(
                    parsed.ok(),
                    Some(*expected),
                    "wrong variant for input '{}'",
                    input
                );
            }
        }
    };
}

test_enum_completeness!(LogLevel, test_log_level_completeness);
test_enum_completeness!(LogFormat, test_log_format_completeness);
test_enum_completeness!(LogOutput, test_log_output_completeness);
test_enum_completeness!(ColorChoice, test_color_choice_completeness);

test_fromstr_aliases!(
    LogLevel,
    test_log_level_aliases,
    [
        ("error", LogLevel::Error),
        ("fatal", LogLevel::Error),
        ("warn", LogLevel::Warning),
        ("warning", LogLevel::Warning),
        ("info", LogLevel::Info),
        ("debug", LogLevel::Debug),
        ("trace", LogLevel::Trace),
        ("verbose", LogLevel::Trace),
        ("DEBUG", LogLevel::Debug),
    ]
);

test_fromstr_aliases!(
    LogFormat,
    test_log_format_aliases,
    [
        ("text", LogFormat::Text),
        ("plain", LogFormat::Text),
        ("json", LogFormat::Json),
        ("yml", LogFormat::Yaml),
    ]
);

test_fromstr_aliases!(
    ColorChoice,
    test_color_choice_aliases,
    [
        ("auto", ColorChoice::Auto),
        ("always", ColorChoice::Always),
        ("force", ColorChoice::Always),
        ("never", ColorChoice::Never),
        ("off", ColorChoice::Never),
    ]
);

#[test]
fn test_unknown_value_names_input() {
    let err = "loud".parse::<LogLevel>().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to parse configuration value 'loud': invalid log level"
    );
}

#[test]
fn test_log_level_directives() {
    assert_eq!(LogLevel::Warning.as_directive(), "warn");
    assert_eq!(LogLevel::Trace.as_directive(), "trace");
    assert!(LogLevel::Error < LogLevel::Trace);
}

#[test]
fn test_ansi_follows_color_choice() {
    let mut config = LoggerConfig {
        level: LogLevel::Info,
        format: LogFormat::Text,
        output: LogOutput::Stderr,
        color: ColorChoice::Always,
    };
    assert!(config.ansi());

    config.color = ColorChoice::Never;
    assert!(!config.ansi());

    config.color = ColorChoice::Always;
    config.format = LogFormat::Json;
    assert!(!config.ansi());
}
