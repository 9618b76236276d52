use super::*;

fn env(pairs: &[(&str, &str)]) -> EnvironmentConfig {
    envy::from_iter(
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string())),
    )
    .unwrap()
}

#[test]
fn test_no_color() {
    let config = env(&[("NO_COLOR", "1")]);
    assert_eq!(config.apply_color_config(ColorChoice::Auto), ColorChoice::Never);
}

#[test]
fn test_empty_no_color_is_ignored() {
    let config = env(&[("NO_COLOR", "")]);
    assert_eq!(config.apply_color_config(ColorChoice::Auto), ColorChoice::Auto);
}

#[test]
fn test_force_color_wins_over_no_color() {
    let config = env(&[("CLICOLOR", "0"), ("NO_COLOR", "1"), ("FORCE_COLOR", "1")]);
    assert_eq!(config.apply_color_config(ColorChoice::Auto), ColorChoice::Always);
}

#[test]
fn test_ci_disables_color() {
    let config = env(&[("CI", "true"), ("FORCE_COLOR", "1")]);
    assert_eq!(config.apply_color_config(ColorChoice::Auto), ColorChoice::Never);
}

#[test]
fn test_invalid_force_color_is_ignored() {
    let config = env(&[("FORCE_COLOR", "invalid")]);
    assert_eq!(config.apply_color_config(ColorChoice::Auto), ColorChoice::Auto);
}

#[test]
fn test_explicit_choice_is_kept() {
    let config = env(&[("NO_COLOR", "1")]);
    assert_eq!(
        config.apply_color_config(ColorChoice::Always),
        ColorChoice::Always
    );
    assert_eq!(
        EnvironmentConfig::default().apply_color_config(ColorChoice::Never),
        ColorChoice::Never
    );
}
