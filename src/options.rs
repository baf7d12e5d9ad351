//! Persisted engine options: template source URL and theme preference.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Template URL used when no options have ever been saved.
pub const DEFAULT_TEMPLATE_URL: &str =
    "https://raw.githubusercontent.com/postrv/revcheck/main/templates/default.yaml";

/// Theme preference for rendering callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Auto => "auto",
        };
        f.write_str(name)
    }
}

/// Error parsing a theme name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown theme '{0}', expected light, dark, or auto")]
pub struct ParseThemeError(String);

impl FromStr for Theme {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "auto" => Ok(Self::Auto),
            other => Err(ParseThemeError(other.to_string())),
        }
    }
}

/// The singleton options record.
///
/// Fields absent from the persisted record fall back to compiled-in defaults;
/// there is no partial-merge write, callers read-modify-write the whole
/// record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOptions {
    /// Template fetched when the caller does not supply a URL.
    pub default_template_url: String,
    /// Rendering theme preference.
    pub theme: Theme,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            default_template_url: DEFAULT_TEMPLATE_URL.to_string(),
            theme: Theme::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = EngineOptions::default();
        assert_eq!(options.theme, Theme::Auto);
        assert_eq!(options.default_template_url, DEFAULT_TEMPLATE_URL);
    }

    #[test]
    fn test_absent_fields_default() {
        let options: EngineOptions = serde_json::from_str("{}").expect("parse");
        assert_eq!(options, EngineOptions::default());

        let options: EngineOptions =
            serde_json::from_str(r#"{"theme":"dark"}"#).expect("parse");
        assert_eq!(options.theme, Theme::Dark);
        assert_eq!(options.default_template_url, DEFAULT_TEMPLATE_URL);
    }

    #[test]
    fn test_theme_wire_format_is_lowercase() {
        assert_eq!(serde_json::to_value(Theme::Auto).unwrap(), "auto");
        assert_eq!(serde_json::to_value(Theme::Light).unwrap(), "light");
    }

    #[test]
    fn test_theme_from_str() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!("LIGHT".parse::<Theme>().unwrap(), Theme::Light);
        assert!("solarized".parse::<Theme>().is_err());
    }

    #[test]
    fn test_options_roundtrip_uses_camel_case() {
        let options = EngineOptions::default();
        let json = serde_json::to_value(&options).expect("serialize");
        assert!(json.get("defaultTemplateUrl").is_some());
    }
}
