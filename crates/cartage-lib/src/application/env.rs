//! Standard color and CI environment variables
//!
//! Applied only when the color choice was left on `auto`; an explicit
//! `--color` or `CARTAGE_COLOR` always wins.

use crate::primitives::{ColorChoice, ConfigError};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvironmentConfig {
    /// NO_COLOR (any non-empty value disables color)
    pub no_color: Option<String>,
    /// FORCE_COLOR (0/false disables, 1/2/3/true enables)
    pub force_color: Option<String>,
    /// CLICOLOR (0 disables color)
    pub clicolor: Option<String>,
    /// CI (any value disables color)
    pub ci: Option<String>,
}

impl EnvironmentConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(envy::from_env()?)
    }

    /// Precedence, lowest first: CLICOLOR, NO_COLOR, FORCE_COLOR; CI overrides all
    pub fn apply_color_config(&self, mut color: ColorChoice) -> ColorChoice {
        if color != ColorChoice::Auto {
            return color;
        }

        if self.ci.is_some() {
            return ColorChoice::Never;
        }

        if self.clicolor.as_deref() == Some("0") {
            color = ColorChoice::Never;
        }

        if self.no_color.as_deref().is_some_and(|value| !value.is_empty()) {
            color = ColorChoice::Never;
        }

        match self.force_color.as_deref() {
            Some("0" | "false") => color = ColorChoice::Never,
            Some("1" | "2" | "3" | "true") => color = ColorChoice::Always,
            _ => {}
        }

        color
    }
}

#[cfg(test)]
mod tests {
    include!("env.test.rs");
}
