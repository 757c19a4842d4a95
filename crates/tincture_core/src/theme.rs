//! Theme and condition definitions
//!
//! A theme is an identity, a token store, and an ordered list of conditional
//! override sets. Themes are immutable once registered; updates replace the
//! store or condition list wholesale, which keeps versioning and cache
//! invalidation simple.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::store::TokenStore;
use crate::value::TokenValue;

/// A registered theme definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Stable identifier, unique within a manager.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Free-form version string; bump it when replacing the definition.
    #[serde(default)]
    pub version: String,
    /// The theme's token hierarchy.
    #[serde(default)]
    pub tokens: TokenStore,
    /// Conditional override sets, in declaration order.
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Theme {
    /// Start building a theme with the given id and name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Theme {
            id: id.into(),
            name: name.into(),
            ..Theme::default()
        }
    }
}

/// A context-evaluated override set.
///
/// During resolution, conditions are sorted by descending priority (ties
/// keep declaration order) and each matching condition contributes its
/// overrides. For a contested path the highest-priority match wins;
/// non-overlapping overrides from lower-priority matches still apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Identifier, unique within the owning theme.
    pub id: String,
    /// Boolean expression handed to the external evaluator verbatim.
    pub expression: String,
    /// Higher wins on conflicting paths.
    #[serde(default)]
    pub priority: i32,
    /// Token path → replacement value, applied when the expression is true.
    #[serde(default)]
    pub overrides: IndexMap<String, TokenValue>,
}

impl Condition {
    /// Build a condition with no overrides yet.
    pub fn new(id: impl Into<String>, expression: impl Into<String>, priority: i32) -> Self {
        Condition {
            id: id.into(),
            expression: expression.into(),
            priority,
            overrides: IndexMap::new(),
        }
    }

    /// Add one override, builder style.
    pub fn with_override(mut self, path: impl Into<String>, value: TokenValue) -> Self {
        self.overrides.insert(path.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_serde_round_trip_is_exact() {
        let theme = Theme {
            id: "aurora".into(),
            name: "Aurora".into(),
            version: "1.2.0".into(),
            tokens: {
                let mut store = TokenStore::default();
                store
                    .primitives
                    .insert("color.blue-600".into(), TokenValue::literal("#3b82f6"));
                store.semantic.insert(
                    "colors.primary".into(),
                    TokenValue::reference("primitives.color.blue-600"),
                );
                store
            },
            conditions: vec![Condition::new("dark", "context.scheme == \"dark\"", 10)
                .with_override("semantic.colors.primary", TokenValue::literal("#60a5fa"))],
        };

        let json = serde_json::to_string(&theme).unwrap();
        let back: Theme = serde_json::from_str(&json).unwrap();
        assert_eq!(back, theme);
    }
}
