//! Token stores
//!
//! A store holds one theme's three token tiers: `primitives`, `semantic`,
//! and `components`. The first segment of a token path selects the tier; the
//! remainder is the key within it. Stores are immutable values once built,
//! so merged stores can be shared across concurrent resolutions freely.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::path::TokenPath;
use crate::value::TokenValue;

/// One layer of the token hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Raw scales: color ramps, spacing steps, type sizes.
    Primitives,
    /// Purpose-named aliases over primitives.
    Semantic,
    /// Per-component style assignments.
    Components,
}

impl Tier {
    /// The tier a path's first segment addresses, if it names one.
    pub fn of(path: &TokenPath) -> Option<Tier> {
        match path.head() {
            "primitives" => Some(Tier::Primitives),
            "semantic" => Some(Tier::Semantic),
            "components" => Some(Tier::Components),
            _ => None,
        }
    }

    /// The path prefix this tier owns.
    pub fn prefix(self) -> &'static str {
        match self {
            Tier::Primitives => "primitives",
            Tier::Semantic => "semantic",
            Tier::Components => "components",
        }
    }
}

/// A theme's token hierarchy: three tiers of path-suffix → value maps.
///
/// Tiers are logically layered (components reference semantic, semantic
/// references primitives) but nothing enforces the layering; the resolver
/// only forbids cycles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenStore {
    /// Raw scale values.
    #[serde(default)]
    pub primitives: IndexMap<String, TokenValue>,
    /// Purpose-named aliases.
    #[serde(default)]
    pub semantic: IndexMap<String, TokenValue>,
    /// Component style assignments.
    #[serde(default)]
    pub components: IndexMap<String, TokenValue>,
}

impl TokenStore {
    /// Look up the value stored at `path`. The first path segment selects
    /// the tier; the remainder is the key inside it.
    pub fn get(&self, path: &TokenPath) -> Option<&TokenValue> {
        let tier = Tier::of(path)?;
        let suffix = path.tail()?;
        self.tier(tier).get(suffix)
    }

    /// The map backing one tier.
    pub fn tier(&self, tier: Tier) -> &IndexMap<String, TokenValue> {
        match tier {
            Tier::Primitives => &self.primitives,
            Tier::Semantic => &self.semantic,
            Tier::Components => &self.components,
        }
    }

    /// Every full token path in the store, primitives first, then semantic,
    /// then components, each in insertion order. Deterministic.
    pub fn paths(&self) -> Vec<TokenPath> {
        let mut out = Vec::with_capacity(
            self.primitives.len() + self.semantic.len() + self.components.len(),
        );
        for tier in [Tier::Primitives, Tier::Semantic, Tier::Components] {
            for suffix in self.tier(tier).keys() {
                if let Ok(path) = TokenPath::parse(&format!("{}.{suffix}", tier.prefix())) {
                    out.push(path);
                }
            }
        }
        out
    }

    /// Total number of tokens across all tiers.
    pub fn len(&self) -> usize {
        self.primitives.len() + self.semantic.len() + self.components.len()
    }

    /// Whether the store holds no tokens at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Layer `overlay` on top of `base`, returning a new store. Overlay
    /// entries win on key conflicts; neither input is mutated.
    pub fn merged(base: &TokenStore, overlay: &TokenStore) -> TokenStore {
        TokenStore {
            primitives: merge_tier(&base.primitives, &overlay.primitives),
            semantic: merge_tier(&base.semantic, &overlay.semantic),
            components: merge_tier(&base.components, &overlay.components),
        }
    }

    /// Layer tenant branding over this store's semantic and component tiers.
    /// Primitives pass through untouched: branding retouches assignments,
    /// never the shared scales underneath them.
    pub fn with_branding(&self, branding: &BrandingOverlay) -> TokenStore {
        TokenStore {
            primitives: self.primitives.clone(),
            semantic: merge_tier(&self.semantic, &branding.semantic),
            components: merge_tier(&self.components, &branding.components),
        }
    }
}

fn merge_tier(
    base: &IndexMap<String, TokenValue>,
    overlay: &IndexMap<String, TokenValue>,
) -> IndexMap<String, TokenValue> {
    let mut merged = base.clone();
    for (key, value) in overlay {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// A tenant's branding fragment. Carries only semantic and component
/// overrides — there is deliberately no primitives map, so a tenant can
/// never redefine the primitive scales every theme shares.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandingOverlay {
    /// Semantic-tier overrides (path suffix → value).
    #[serde(default)]
    pub semantic: IndexMap<String, TokenValue>,
    /// Component-tier overrides (path suffix → value).
    #[serde(default)]
    pub components: IndexMap<String, TokenValue>,
}

impl BrandingOverlay {
    /// Whether the overlay carries no overrides.
    pub fn is_empty(&self) -> bool {
        self.semantic.is_empty() && self.components.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> TokenStore {
        let mut store = TokenStore::default();
        store
            .primitives
            .insert("color.blue-600".into(), TokenValue::literal("#3b82f6"));
        store.semantic.insert(
            "colors.primary".into(),
            TokenValue::reference("primitives.color.blue-600"),
        );
        store.components.insert(
            "button.primary.background".into(),
            TokenValue::reference("semantic.colors.primary"),
        );
        store
    }

    #[test]
    fn get_routes_through_the_tier_named_by_the_head_segment() {
        let store = sample_store();
        let path = TokenPath::parse("primitives.color.blue-600").unwrap();
        assert_eq!(store.get(&path), Some(&TokenValue::literal("#3b82f6")));

        let missing = TokenPath::parse("semantic.colors.accent").unwrap();
        assert_eq!(store.get(&missing), None);

        let unknown_tier = TokenPath::parse("misc.thing").unwrap();
        assert_eq!(store.get(&unknown_tier), None);
    }

    #[test]
    fn merged_prefers_overlay_and_leaves_inputs_alone() {
        let base = sample_store();
        let mut overlay = TokenStore::default();
        overlay
            .semantic
            .insert("colors.primary".into(), TokenValue::literal("#ff0000"));

        let merged = TokenStore::merged(&base, &overlay);
        let primary = TokenPath::parse("semantic.colors.primary").unwrap();
        assert_eq!(merged.get(&primary), Some(&TokenValue::literal("#ff0000")));
        // Base untouched.
        assert_eq!(
            base.get(&primary),
            Some(&TokenValue::reference("primitives.color.blue-600"))
        );
        // Non-conflicting keys survive.
        assert_eq!(merged.len(), base.len());
    }

    #[test]
    fn branding_cannot_touch_primitives() {
        let base = sample_store();
        let mut branding = BrandingOverlay::default();
        branding
            .semantic
            .insert("colors.primary".into(), TokenValue::literal("#00ff00"));

        let branded = base.with_branding(&branding);
        let primary = TokenPath::parse("semantic.colors.primary").unwrap();
        let blue = TokenPath::parse("primitives.color.blue-600").unwrap();
        assert_eq!(branded.get(&primary), Some(&TokenValue::literal("#00ff00")));
        assert_eq!(branded.get(&blue), Some(&TokenValue::literal("#3b82f6")));
    }

    #[test]
    fn paths_enumerates_all_tiers_deterministically() {
        let store = sample_store();
        let paths: Vec<String> = store.paths().iter().map(|p| p.to_string()).collect();
        assert_eq!(
            paths,
            vec![
                "primitives.color.blue-600",
                "semantic.colors.primary",
                "components.button.primary.background",
            ]
        );
    }
}
