//! Token paths
//!
//! A token path is a dot-delimited address into the token hierarchy, e.g.
//! `components.button.primary.background`. Paths are validated on
//! construction so the rest of the engine can treat them as well-formed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A token path string that failed validation.
#[derive(Debug, Clone, Error)]
#[error("invalid token path '{raw}': {reason}")]
pub struct PathError {
    /// The offending raw string.
    pub raw: String,
    /// What was wrong with it.
    pub reason: String,
}

/// A validated, dot-delimited token path.
///
/// Invariants: non-empty, and every segment matches `[A-Za-z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TokenPath(String);

impl TokenPath {
    /// Parse and validate a token path.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError {
                raw: raw.to_string(),
                reason: "path cannot be empty".into(),
            });
        }
        for segment in raw.split('.') {
            if !is_valid_segment(segment) {
                return Err(PathError {
                    raw: raw.to_string(),
                    reason: format!("invalid segment '{segment}'"),
                });
            }
        }
        Ok(Self(raw.to_string()))
    }

    /// Whether a raw string would parse as a token path.
    pub fn is_well_formed(raw: &str) -> bool {
        !raw.is_empty() && raw.split('.').all(is_valid_segment)
    }

    /// The path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the dot-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// The first segment, which names the tier for tiered stores.
    pub fn head(&self) -> &str {
        self.0.split('.').next().unwrap_or("")
    }

    /// Everything after the first segment, if any.
    pub fn tail(&self) -> Option<&str> {
        self.0.split_once('.').map(|(_, rest)| rest)
    }

    /// The CSS custom-property name for this path: dots become dashes,
    /// prefixed with `--`.
    pub fn css_variable(&self) -> String {
        let mut var = String::with_capacity(self.0.len() + 2);
        var.push_str("--");
        for (i, segment) in self.segments().enumerate() {
            if i > 0 {
                var.push('-');
            }
            var.push_str(segment);
        }
        var
    }
}

fn is_valid_segment(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl fmt::Display for TokenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TokenPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for TokenPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        TokenPath::parse(&raw).map_err(serde::de::Error::custom)
    }
}
