//! Culture codes and the variation context used for multi-locale property lookups.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocaleError {
    #[error("culture code is empty")]
    Empty,
    #[error("culture code `{0}` is not a valid language tag")]
    Invalid(String),
}

/// A normalised culture code such as `en-US` or `da`.
///
/// The language subtag is lower-cased, a two-letter region upper-cased and a
/// four-letter script title-cased, so `EN-us` and `en-US` compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    pub fn parse(raw: &str) -> Result<Self, LocaleError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LocaleError::Empty);
        }

        let mut parts = Vec::new();
        for (index, subtag) in trimmed.split(['-', '_']).enumerate() {
            let valid_chars = subtag.chars().all(|c| c.is_ascii_alphanumeric());
            if subtag.is_empty() || subtag.len() > 8 || !valid_chars {
                return Err(LocaleError::Invalid(trimmed.to_string()));
            }

            let normalized = if index == 0 {
                if !(2..=3).contains(&subtag.len()) || !subtag.chars().all(|c| c.is_ascii_alphabetic())
                {
                    return Err(LocaleError::Invalid(trimmed.to_string()));
                }
                subtag.to_ascii_lowercase()
            } else if subtag.len() == 2 && subtag.chars().all(|c| c.is_ascii_alphabetic()) {
                subtag.to_ascii_uppercase()
            } else if subtag.len() == 4 && subtag.chars().all(|c| c.is_ascii_alphabetic()) {
                let mut chars = subtag.chars();
                let first = chars.next().map(|c| c.to_ascii_uppercase());
                first
                    .into_iter()
                    .chain(chars.map(|c| c.to_ascii_lowercase()))
                    .collect()
            } else {
                subtag.to_ascii_lowercase()
            };
            parts.push(normalized);
        }

        Ok(Self(parts.join("-")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive key used for culture maps.
    pub fn key(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    pub fn language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = LocaleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(value: Locale) -> Self {
        value.0
    }
}

/// Culture selector for variant property values; `None` reads invariant values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VariationContext {
    culture: Option<Locale>,
}

impl VariationContext {
    pub fn invariant() -> Self {
        Self { culture: None }
    }

    pub fn for_culture(culture: Locale) -> Self {
        Self {
            culture: Some(culture),
        }
    }

    pub fn culture(&self) -> Option<&Locale> {
        self.culture.as_ref()
    }
}
