//! Structural theme validation
//!
//! Validation rejects malformed themes before registration. It is purely
//! syntactic: reference *targets* are checked for shape, not existence,
//! since a theme may reference paths that only exist after branding or
//! condition overlays are applied. All violations are collected so an
//! author fixes everything in one pass.

use crate::error::Violation;
use crate::path::TokenPath;
use crate::store::{Tier, TokenStore};
use crate::theme::Theme;

/// Check a theme's structure, returning every violation found. An empty
/// vector means the theme is fit for registration.
pub fn validate_theme(theme: &Theme) -> Vec<Violation> {
    let mut violations = Vec::new();

    if theme.id.is_empty() {
        violations.push(Violation::new("theme", "id cannot be empty"));
    }
    if theme.name.is_empty() {
        violations.push(Violation::new("theme", "name cannot be empty"));
    }

    validate_store(&theme.tokens, &mut violations);

    let mut seen_ids = std::collections::HashSet::new();
    for condition in &theme.conditions {
        let subject = if condition.id.is_empty() {
            "condition".to_string()
        } else {
            format!("condition:{}", condition.id)
        };
        if condition.id.is_empty() {
            violations.push(Violation::new(&subject, "id cannot be empty"));
        } else if !seen_ids.insert(condition.id.as_str()) {
            violations.push(Violation::new(&subject, "duplicate condition id"));
        }
        if condition.expression.trim().is_empty() {
            violations.push(Violation::new(&subject, "expression cannot be empty"));
        }
        for path in condition.overrides.keys() {
            if !TokenPath::is_well_formed(path) {
                violations.push(Violation::new(
                    path.clone(),
                    format!("malformed override path in {subject}"),
                ));
            }
        }
    }

    violations
}

fn validate_store(store: &TokenStore, violations: &mut Vec<Violation>) {
    // Reference targets need no shape check here: `TokenValue::Reference`
    // holds a `TokenPath`, which is validated at parse time. Target
    // *existence* is deliberately deferred to resolution.
    for tier in [Tier::Primitives, Tier::Semantic, Tier::Components] {
        for suffix in store.tier(tier).keys() {
            let full = format!("{}.{suffix}", tier.prefix());
            if !TokenPath::is_well_formed(&full) {
                violations.push(Violation::new(full, "malformed token path"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Condition;
    use crate::value::TokenValue;

    #[test]
    fn well_formed_theme_has_no_violations() {
        let mut theme = Theme::new("aurora", "Aurora");
        theme
            .tokens
            .primitives
            .insert("color.blue-600".into(), TokenValue::literal("#3b82f6"));
        theme.conditions.push(Condition::new("dark", "scheme == \"dark\"", 10));
        assert!(validate_theme(&theme).is_empty());
    }

    #[test]
    fn collects_every_violation_not_just_the_first() {
        let mut theme = Theme::new("", "");
        theme
            .tokens
            .semantic
            .insert("bad path".into(), TokenValue::literal("#fff"));
        theme.conditions.push(Condition::new("c1", "", 0));
        theme.conditions.push(Condition::new("c1", "true", 0));

        let violations = validate_theme(&theme);
        let messages: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
        assert!(messages.contains(&"id cannot be empty"));
        assert!(messages.contains(&"name cannot be empty"));
        assert!(messages.contains(&"malformed token path"));
        assert!(messages.contains(&"expression cannot be empty"));
        assert!(messages.contains(&"duplicate condition id"));
        assert!(violations.len() >= 5);
    }

    #[test]
    fn reference_existence_is_not_checked_here() {
        let mut theme = Theme::new("aurora", "Aurora");
        theme.tokens.semantic.insert(
            "colors.primary".into(),
            TokenValue::reference("primitives.color.not-defined-yet"),
        );
        // Well formed but dangling: deferred to resolution.
        assert!(validate_theme(&theme).is_empty());
    }
}
