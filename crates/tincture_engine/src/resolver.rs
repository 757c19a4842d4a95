//! Token reference resolution
//!
//! Resolution turns a token path into a concrete literal by following
//! `{path}` references through the merged store, applying any conditional
//! overrides for the exact paths visited along the way. The reference graph
//! is implicit in the path strings; an explicit visited set per call detects
//! cycles without ever materializing the graph.

use std::collections::BTreeMap;

use indexmap::IndexSet;

use tincture_core::{CancelToken, Literal, Result, ThemeError, TokenPath, TokenStore, TokenValue};

use crate::cache::{ArtifactKey, TokenCache, TokenKey};
use crate::condition::OverridePlan;

/// Hard caps bounding worst-case resolution work.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Maximum reference hops before a chain is treated as a cycle, even if
    /// no true cycle exists.
    pub max_depth: usize,
    /// Maximum conditions evaluated per resolution pass.
    pub max_conditions: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            max_depth: 32,
            max_conditions: 64,
        }
    }
}

/// Everything one resolution pass works against: the merged store, the
/// matched overrides, the cache scope, and the caller's cancel token.
pub struct ResolutionScope<'a> {
    /// Theme tokens with tenant branding already layered in.
    pub store: &'a TokenStore,
    /// Matched conditional overrides for this context.
    pub plan: &'a OverridePlan,
    /// Token-cache scope; `None` disables token-level caching.
    pub cache: Option<(&'a TokenCache, &'a ArtifactKey)>,
    /// Cooperative cancellation.
    pub cancel: &'a CancelToken,
}

/// Resolves token paths to literals. Stateless apart from its config; safe
/// to share across threads.
#[derive(Debug, Default, Clone)]
pub struct Resolver {
    config: ResolverConfig,
}

impl Resolver {
    /// Create a resolver with the given caps.
    pub fn new(config: ResolverConfig) -> Self {
        Resolver { config }
    }

    /// The configured caps.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve one token path to a literal.
    ///
    /// Deterministic: a fixed `(store, plan, path)` always yields the same
    /// literal or the same error. Overrides apply per exact path *before*
    /// the store lookup, so an override can redirect or replace any hop in
    /// a chain.
    pub fn resolve(&self, scope: &ResolutionScope<'_>, path: &TokenPath) -> Result<Literal> {
        let cache_key = scope.cache.map(|(_, artifact)| TokenKey {
            scope: artifact.clone(),
            path: path.to_string(),
        });
        if let (Some((cache, _)), Some(key)) = (scope.cache, &cache_key) {
            if let Some(hit) = cache.get(key) {
                return Ok(hit);
            }
        }

        let mut visited: IndexSet<String> = IndexSet::new();
        let mut current = path.clone();

        loop {
            scope.cancel.check()?;

            if visited.contains(current.as_str()) {
                let mut chain: Vec<String> = visited.into_iter().collect();
                chain.push(current.to_string());
                return Err(ThemeError::CircularReference { chain });
            }
            if visited.len() >= self.config.max_depth {
                return Err(ThemeError::DepthExceeded {
                    path: current.to_string(),
                    max_depth: self.config.max_depth,
                });
            }
            visited.insert(current.to_string());

            let value = scope
                .plan
                .override_for(current.as_str())
                .or_else(|| scope.store.get(&current))
                .ok_or_else(|| ThemeError::TokenNotFound {
                    path: current.to_string(),
                })?;

            match value {
                TokenValue::Literal(literal) => {
                    let literal = literal.clone();
                    if let (Some((cache, _)), Some(key)) = (scope.cache, cache_key) {
                        cache.insert(key, literal.clone());
                    }
                    return Ok(literal);
                }
                TokenValue::Reference(target) => {
                    tracing::trace!(from = %current, to = %target, "following token reference");
                    current = target.clone();
                }
            }
        }
    }

    /// Resolve every reachable token path: all paths in the store plus any
    /// paths introduced only by matched overrides. The first failure aborts
    /// the pass — partial output would mean silently missing tokens.
    pub fn resolve_all(
        &self,
        scope: &ResolutionScope<'_>,
    ) -> Result<BTreeMap<TokenPath, Literal>> {
        let mut resolved = BTreeMap::new();

        for path in scope.store.paths() {
            let literal = self.resolve(scope, &path)?;
            resolved.insert(path, literal);
        }
        for raw in scope.plan.override_paths() {
            let path = TokenPath::parse(raw).map_err(|e| ThemeError::Internal {
                message: format!("override path failed validation: {e}"),
            })?;
            if !resolved.contains_key(&path) {
                let literal = self.resolve(scope, &path)?;
                resolved.insert(path, literal);
            }
        }

        Ok(resolved)
    }
}
