//! Light/dark theme flag.
//!
//! The theme is a plain `Copy` value. The dashboard owns one and hands it (or
//! the palette derived from it) to every render call; switching themes means
//! replacing the value with [`Theme::toggled`].

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// The only way to change the theme: produce the other one.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Label of the button that switches away from this theme.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Dark => "Light Mode",
            Theme::Light => "Dark Mode",
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(ConfigError::Theme(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_returns_new_value() {
        let theme = Theme::default();
        let flipped = theme.toggled();
        assert_eq!(theme, Theme::Dark);
        assert_eq!(flipped, Theme::Light);
        assert_eq!(flipped.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggle_label(), "Light Mode");
    }

    #[test]
    fn test_parse() {
        assert_eq!("LIGHT".parse::<Theme>().unwrap(), Theme::Light);
        assert!("sepia".parse::<Theme>().is_err());
    }
}
