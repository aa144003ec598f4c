//! Presentation preferences: UI language and theme

use super::ParseEnumError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Interface language.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    #[default]
    En,
    /// Hebrew
    He,
}

/// Document text direction implied by a [`Language`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextDirection {
    /// Left to right
    Ltr,
    /// Right to left
    Rtl,
}

impl TextDirection {
    /// Value of the HTML `dir` attribute.
    #[must_use]
    pub const fn as_attr(self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }
}

impl Language {
    /// All supported languages.
    pub const ALL: &'static [Self] = &[Self::En, Self::He];

    /// ISO 639-1 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::He => "he",
        }
    }

    /// Text direction the view layer applies when this language is active.
    #[must_use]
    pub const fn direction(self) -> TextDirection {
        match self {
            Self::En => TextDirection::Ltr,
            Self::He => TextDirection::Rtl,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|l| l.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ParseEnumError::new("language", s, Self::ALL.iter().copied().map(Self::code))
            })
    }
}

/// Color theme.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark background (default)
    #[default]
    Dark,
    /// Light background
    Light,
}

impl Theme {
    /// All supported themes.
    pub const ALL: &'static [Self] = &[Self::Dark, Self::Light];

    /// Lowercase name, also the CSS class the view layer toggles.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Theme {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ParseEnumError::new("theme", s, Self::ALL.iter().copied().map(Self::label))
            })
    }
}
