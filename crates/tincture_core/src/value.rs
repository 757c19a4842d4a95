//! Token values
//!
//! A token value is either a concrete literal (color, dimension, number,
//! plain string) or a reference to another token path. References use the
//! design-token convention of wrapping the path in braces: `{semantic.colors.primary}`.
//! The brace syntax keeps references unambiguous against CSS literals, which
//! never start with `{`.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::path::TokenPath;

/// CSS function prefixes that mark a string literal as a color value.
const COLOR_FUNCTIONS: &[&str] = &["rgb(", "rgba(", "hsl(", "hsla(", "oklch(", "color("];

/// CSS length/angle/time units recognized when classifying dimensions.
const DIMENSION_UNITS: &[&str] = &[
    "px", "rem", "em", "vh", "vw", "vmin", "vmax", "pt", "ch", "ex", "fr", "deg", "ms", "s", "%",
];

/// A concrete, fully resolved design value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// An arbitrary string (font stacks, easing names, `1px solid #ccc`).
    ///
    /// Brace-wrapped text is reserved for the reference syntax: a `Str`
    /// constructed directly as `{a.b}` serializes to that string and reads
    /// back as a [`TokenValue::Reference`], not a literal.
    Str(String),
    /// A unitless number (line heights, z-indices, opacities).
    Number(f64),
    /// A CSS color (`#3b82f6`, `rgb(...)`, `hsl(...)`).
    Color(String),
    /// A number with a CSS unit (`16px`, `1.5rem`, `200ms`).
    Dimension {
        /// Numeric magnitude.
        value: f64,
        /// CSS unit suffix.
        unit: String,
    },
}

impl Literal {
    /// Classify a raw string into the most specific literal kind.
    pub fn classify(raw: &str) -> Literal {
        let trimmed = raw.trim();
        if trimmed.starts_with('#') || COLOR_FUNCTIONS.iter().any(|f| trimmed.starts_with(f)) {
            return Literal::Color(trimmed.to_string());
        }
        if let Ok(n) = trimmed.parse::<f64>() {
            return Literal::Number(n);
        }
        if let Some(dim) = parse_dimension(trimmed) {
            return dim;
        }
        Literal::Str(trimmed.to_string())
    }

    /// Render the literal as CSS text.
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

fn parse_dimension(s: &str) -> Option<Literal> {
    for unit in DIMENSION_UNITS {
        if let Some(number) = s.strip_suffix(unit) {
            // "s" alone would swallow words like "borders"; require the
            // prefix to parse as a number.
            if let Ok(value) = number.parse::<f64>() {
                return Some(Literal::Dimension {
                    value,
                    unit: (*unit).to_string(),
                });
            }
        }
    }
    None
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) | Literal::Color(s) => f.write_str(s),
            Literal::Number(n) => write!(f, "{n}"),
            Literal::Dimension { value, unit } => write!(f, "{value}{unit}"),
        }
    }
}

/// A token's stored value: a literal or a reference to another token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    /// A concrete value.
    Literal(Literal),
    /// A `{path}` reference to another token.
    Reference(TokenPath),
}

impl TokenValue {
    /// Parse a raw serialized string: `{path}` is a reference, everything
    /// else is classified as a literal.
    pub fn parse(raw: &str) -> Result<Self, crate::path::PathError> {
        let trimmed = raw.trim();
        if let Some(inner) = trimmed
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
        {
            return Ok(TokenValue::Reference(TokenPath::parse(inner.trim())?));
        }
        Ok(TokenValue::Literal(Literal::classify(trimmed)))
    }

    /// Convenience constructor for a literal string value.
    pub fn literal(raw: &str) -> Self {
        TokenValue::Literal(Literal::classify(raw))
    }

    /// Convenience constructor for a reference; panics on a malformed path,
    /// so only for statically known paths (mostly tests and examples).
    pub fn reference(path: &str) -> Self {
        TokenValue::Reference(TokenPath::parse(path).unwrap())
    }

    /// The referenced path, if this value is a reference.
    pub fn as_reference(&self) -> Option<&TokenPath> {
        match self {
            TokenValue::Reference(path) => Some(path),
            TokenValue::Literal(_) => None,
        }
    }

    /// The literal, if this value is one.
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            TokenValue::Literal(lit) => Some(lit),
            TokenValue::Reference(_) => None,
        }
    }
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::Literal(lit) => lit.fmt(f),
            TokenValue::Reference(path) => write!(f, "{{{path}}}"),
        }
    }
}

impl Serialize for TokenValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TokenValue::Literal(Literal::Number(n)) => serializer.serialize_f64(*n),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for TokenValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> de::Visitor<'de> for ValueVisitor {
            type Value = TokenValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a token value string or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<TokenValue, E> {
                TokenValue::parse(v).map_err(E::custom)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<TokenValue, E> {
                Ok(TokenValue::Literal(Literal::Number(v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<TokenValue, E> {
                Ok(TokenValue::Literal(Literal::Number(v as f64)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<TokenValue, E> {
                Ok(TokenValue::Literal(Literal::Number(v as f64)))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_colors() {
        assert_eq!(
            Literal::classify("#3b82f6"),
            Literal::Color("#3b82f6".into())
        );
        assert_eq!(
            Literal::classify("rgb(59, 130, 246)"),
            Literal::Color("rgb(59, 130, 246)".into())
        );
    }

    #[test]
    fn classifies_dimensions_and_numbers() {
        assert_eq!(
            Literal::classify("16px"),
            Literal::Dimension {
                value: 16.0,
                unit: "px".into()
            }
        );
        assert_eq!(
            Literal::classify("1.5rem"),
            Literal::Dimension {
                value: 1.5,
                unit: "rem".into()
            }
        );
        assert_eq!(Literal::classify("1.5"), Literal::Number(1.5));
        // Words that happen to end in a unit stay strings.
        assert_eq!(Literal::classify("borders"), Literal::Str("borders".into()));
    }

    #[test]
    fn brace_syntax_parses_as_reference() {
        let value = TokenValue::parse("{semantic.colors.primary}").unwrap();
        assert_eq!(
            value.as_reference().unwrap().as_str(),
            "semantic.colors.primary"
        );
    }

    #[test]
    fn malformed_reference_path_is_rejected() {
        assert!(TokenValue::parse("{bad..path}").is_err());
    }

    #[test]
    fn display_round_trips_references() {
        let value = TokenValue::reference("primitives.color.blue-600");
        assert_eq!(value.to_string(), "{primitives.color.blue-600}");
    }

    #[test]
    fn serde_round_trips_every_kind() {
        for raw in ["#3b82f6", "16px", "{semantic.colors.primary}", "sans-serif"] {
            let value = TokenValue::parse(raw).unwrap();
            let json = serde_json::to_string(&value).unwrap();
            let back: TokenValue = serde_json::from_str(&json).unwrap();
            assert_eq!(back, value, "round trip failed for {raw}");
        }
        let number: TokenValue = serde_json::from_str("1.25").unwrap();
        assert_eq!(number, TokenValue::Literal(Literal::Number(1.25)));
    }

    #[test]
    fn brace_wrapped_str_reads_back_as_a_reference() {
        // Brace syntax is reserved for references, so a hand-built Str that
        // mimics it loses its literal-ness across serde.
        let odd = TokenValue::Literal(Literal::Str("{semantic.colors.primary}".into()));
        let json = serde_json::to_string(&odd).unwrap();
        let back: TokenValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TokenValue::reference("semantic.colors.primary"));
    }
}
