//! Theme manager
//!
//! The public façade. Owns the theme registry, tenant registry, both cache
//! levels, and the compilation pipeline. One manager instance is
//! constructed per process (or tenant group) and shared by handle; there is
//! no global state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use rustc_hash::FxHashMap;

use tincture_core::{
    validate_theme, CancelToken, EvalContext, Result, TenantConfig, Theme, ThemeError, TokenValue,
};

use crate::cache::{ArtifactCache, ArtifactKey, CacheStats, Singleflight, TokenCache};
use crate::compiler::{self, CompiledTheme, CompilerOptions};
use crate::condition::{ConditionEvaluator, OverridePlan};
use crate::resolver::{ResolutionScope, Resolver, ResolverConfig};
use crate::storage::{self, ThemeStorage};
use crate::tenant::TenantRegistry;

/// Manager construction parameters.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Resolution caps.
    pub resolver: ResolverConfig,
    /// CSS output options.
    pub compiler: CompilerOptions,
    /// Token-level cache capacity (entries).
    pub token_cache_capacity: usize,
    /// Artifact-level cache capacity (compiled themes).
    pub artifact_cache_capacity: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        ManagerConfig {
            resolver: ResolverConfig::default(),
            compiler: CompilerOptions::default(),
            token_cache_capacity: 4096,
            artifact_cache_capacity: 256,
        }
    }
}

/// Notification emitted after a successful mutating call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeEvent {
    /// A theme was registered.
    ThemeRegistered {
        /// The new theme's id.
        id: String,
    },
    /// A theme was unregistered.
    ThemeUnregistered {
        /// The removed theme's id.
        id: String,
    },
    /// A tenant's configuration was created or replaced.
    TenantConfigured {
        /// The tenant.
        tenant_id: String,
    },
}

/// What to invalidate in both cache levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationScope {
    /// Everything compiled from this theme, across all tenants.
    Theme(String),
    /// Everything compiled for this tenant, across all themes.
    Tenant(String),
}

/// Counters exposed for observability.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManagerStats {
    /// Registered themes.
    pub themes: usize,
    /// Configured tenants.
    pub tenants: usize,
    /// Completed (committed) compilations.
    pub compilations: u64,
    /// Token-level cache counters.
    pub token_cache: CacheStats,
    /// Artifact-level cache counters.
    pub artifact_cache: CacheStats,
}

type Observer = Box<dyn Fn(&ThemeEvent) + Send + Sync>;

/// Orchestrates registration, tenant configuration, resolution, compilation,
/// and cache lifecycle.
pub struct ThemeManager {
    themes: RwLock<FxHashMap<String, Arc<Theme>>>,
    tenants: TenantRegistry,
    resolver: Resolver,
    compiler_options: CompilerOptions,
    token_cache: TokenCache,
    artifact_cache: ArtifactCache<CompiledTheme>,
    inflight: Singleflight<ArtifactKey, Result<Arc<CompiledTheme>>>,
    evaluator: Arc<dyn ConditionEvaluator>,
    storage: Option<Arc<dyn ThemeStorage>>,
    observers: RwLock<Vec<Observer>>,
    compilations: AtomicU64,
}

impl ThemeManager {
    /// Create a manager with the given config and condition evaluator.
    pub fn new(config: ManagerConfig, evaluator: Arc<dyn ConditionEvaluator>) -> Self {
        ThemeManager {
            themes: RwLock::new(FxHashMap::default()),
            tenants: TenantRegistry::new(),
            resolver: Resolver::new(config.resolver),
            compiler_options: config.compiler,
            token_cache: TokenCache::new(config.token_cache_capacity),
            artifact_cache: ArtifactCache::new(config.artifact_cache_capacity),
            inflight: Singleflight::new(),
            evaluator,
            storage: None,
            observers: RwLock::new(Vec::new()),
            compilations: AtomicU64::new(0),
        }
    }

    /// Attach a persistent backend. Registered themes and tenant configs
    /// are written through to it; [`ThemeManager::hydrate`] reads them back.
    pub fn with_storage(mut self, storage: Arc<dyn ThemeStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    // ========== Lifecycle ==========

    /// Register a theme. Fails with [`ThemeError::InvalidTheme`] (carrying
    /// every violation) on structural problems and
    /// [`ThemeError::DuplicateTheme`] if the id is taken — the existing
    /// theme and its caches are left untouched.
    pub fn register_theme(&self, theme: Theme, cancel: &CancelToken) -> Result<()> {
        cancel.check()?;

        let violations = validate_theme(&theme);
        if !violations.is_empty() {
            return Err(ThemeError::InvalidTheme { violations });
        }

        let id = theme.id.clone();
        {
            let mut themes = self.themes.write().unwrap();
            if themes.contains_key(&id) {
                return Err(ThemeError::DuplicateTheme { id });
            }
            if let Some(storage) = &self.storage {
                storage.put(&storage::theme_key(&id), &storage::encode_theme(&theme)?)?;
            }
            themes.insert(id.clone(), Arc::new(theme));
        }

        tracing::debug!(theme = %id, "theme registered");
        self.notify(&ThemeEvent::ThemeRegistered { id });
        Ok(())
    }

    /// Unregister a theme and invalidate everything compiled from it.
    /// Fails with [`ThemeError::ThemeInUse`] while any tenant's default
    /// still names it; repoint those tenants first.
    pub fn unregister_theme(&self, theme_id: &str, cancel: &CancelToken) -> Result<()> {
        cancel.check()?;

        {
            let mut themes = self.themes.write().unwrap();
            if !themes.contains_key(theme_id) {
                return Err(ThemeError::ThemeNotFound {
                    id: theme_id.to_string(),
                });
            }
            let holdouts = self.tenants.tenants_using(theme_id);
            if !holdouts.is_empty() {
                return Err(ThemeError::ThemeInUse {
                    id: theme_id.to_string(),
                    tenants: holdouts,
                });
            }
            if let Some(storage) = &self.storage {
                storage.delete(&storage::theme_key(theme_id))?;
            }
            themes.remove(theme_id);
        }

        self.invalidate_cache(InvalidationScope::Theme(theme_id.to_string()));
        tracing::debug!(theme = %theme_id, "theme unregistered");
        self.notify(&ThemeEvent::ThemeUnregistered {
            id: theme_id.to_string(),
        });
        Ok(())
    }

    /// Insert or replace a tenant's configuration. A set `default_theme_id`
    /// must name a registered theme. Reconfiguring invalidates the tenant's
    /// cached artifacts so stale branding is never served.
    pub fn configure_tenant(&self, config: TenantConfig, cancel: &CancelToken) -> Result<()> {
        cancel.check()?;

        if config.tenant_id.is_empty() {
            return Err(ThemeError::Internal {
                message: "tenant_id cannot be empty".into(),
            });
        }

        let tenant_id = config.tenant_id.clone();
        {
            // The themes guard stays held through the registry insert so a
            // concurrent unregister_theme cannot remove the default theme
            // between the check and the insert. Lock order (themes, then
            // tenants) matches unregister_theme.
            let themes = self.themes.read().unwrap();
            if let Some(theme_id) = &config.default_theme_id {
                if !themes.contains_key(theme_id) {
                    return Err(ThemeError::ThemeNotFound {
                        id: theme_id.clone(),
                    });
                }
            }
            if let Some(storage) = &self.storage {
                storage.put(
                    &storage::tenant_key(&tenant_id),
                    &storage::encode_tenant(&config)?,
                )?;
            }
            self.tenants.configure(config);
        }

        self.invalidate_cache(InvalidationScope::Tenant(tenant_id.clone()));
        tracing::debug!(tenant = %tenant_id, "tenant configured");
        self.notify(&ThemeEvent::TenantConfigured { tenant_id });
        Ok(())
    }

    /// Load every theme and tenant config the backend holds. Returns the
    /// number of definitions loaded. Intended for startup; loaded themes
    /// skip the write-through (they are already persisted).
    pub fn hydrate(&self, cancel: &CancelToken) -> Result<usize> {
        let Some(storage) = self.storage.clone() else {
            return Ok(0);
        };

        let mut loaded = 0;
        for key in storage.list(storage::THEME_PREFIX)? {
            cancel.check()?;
            if let Some(bytes) = storage.get(&key)? {
                let theme = storage::decode_theme(&bytes)?;
                let violations = validate_theme(&theme);
                if !violations.is_empty() {
                    tracing::warn!(key = %key, "skipping stored theme that fails validation");
                    continue;
                }
                self.themes
                    .write()
                    .unwrap()
                    .insert(theme.id.clone(), Arc::new(theme));
                loaded += 1;
            }
        }
        for key in storage.list(storage::TENANT_PREFIX)? {
            cancel.check()?;
            if let Some(bytes) = storage.get(&key)? {
                let config = storage::decode_tenant(&bytes)?;
                // Same referential check as configure_tenant; themes are
                // hydrated first, so the registry is authoritative here.
                if let Some(theme_id) = &config.default_theme_id {
                    if !self.themes.read().unwrap().contains_key(theme_id) {
                        tracing::warn!(
                            key = %key,
                            theme = %theme_id,
                            "skipping stored tenant whose default theme is not registered"
                        );
                        continue;
                    }
                }
                self.tenants.configure(config);
                loaded += 1;
            }
        }

        tracing::debug!(loaded, "hydrated from storage");
        Ok(loaded)
    }

    // ========== Compilation ==========

    /// Compile (or fetch from cache) the theme for one tenant and context.
    ///
    /// An unconfigured tenant is not an error: the theme is compiled with
    /// no branding overlay. Concurrent calls for the identical
    /// `(tenant, theme, context)` collapse to a single compilation; waiting
    /// callers observe the winner's result.
    pub fn get_compiled_theme(
        &self,
        tenant_id: &str,
        theme_id: &str,
        context: &EvalContext,
        cancel: &CancelToken,
    ) -> Result<Arc<CompiledTheme>> {
        cancel.check()?;

        let theme = self.theme(theme_id).ok_or_else(|| ThemeError::ThemeNotFound {
            id: theme_id.to_string(),
        })?;
        let tenant = self.tenants.get(tenant_id);

        // Feature flags participate in condition evaluation, so they are
        // part of the effective context and of its hash.
        let mut effective = context.clone();
        if let Some(config) = &tenant {
            if !config.feature_flags.is_empty() {
                let flags: serde_json::Map<String, serde_json::Value> = config
                    .feature_flags
                    .iter()
                    .map(|(name, on)| (name.clone(), serde_json::Value::Bool(*on)))
                    .collect();
                effective.insert("flags", serde_json::Value::Object(flags));
            }
        }

        let key = ArtifactKey {
            tenant_id: tenant_id.to_string(),
            theme_id: theme_id.to_string(),
            context_hash: effective.context_hash(),
        };

        loop {
            if let Some(hit) = self.artifact_cache.get(&key) {
                return Ok(hit);
            }

            let (result, leader) = self.inflight.run(key.clone(), || {
                self.build_artifact(&theme, tenant.as_deref(), &key, &effective, cancel)
            });
            match result {
                // The in-flight compilation was cancelled by the token of the
                // caller that started it. This caller's token is still live,
                // so start a fresh compilation instead of propagating a
                // cancellation it never asked for.
                Err(ThemeError::Cancelled) if !leader && !cancel.is_cancelled() => {
                    tracing::trace!(
                        tenant = %key.tenant_id,
                        theme = %key.theme_id,
                        "in-flight compilation was cancelled; retrying"
                    );
                }
                result => {
                    if !leader {
                        tracing::trace!(
                            tenant = %key.tenant_id,
                            theme = %key.theme_id,
                            "observed in-flight compilation"
                        );
                    }
                    return result;
                }
            }
        }
    }

    /// Compile the tenant's default theme. Unlike
    /// [`ThemeManager::get_compiled_theme`], this *does* require the tenant
    /// to be configured with a default.
    pub fn get_default_theme(
        &self,
        tenant_id: &str,
        context: &EvalContext,
        cancel: &CancelToken,
    ) -> Result<Arc<CompiledTheme>> {
        let config =
            self.tenants
                .get(tenant_id)
                .ok_or_else(|| ThemeError::TenantNotConfigured {
                    tenant_id: tenant_id.to_string(),
                })?;
        let theme_id =
            config
                .default_theme_id
                .clone()
                .ok_or_else(|| ThemeError::TenantNotConfigured {
                    tenant_id: tenant_id.to_string(),
                })?;
        self.get_compiled_theme(tenant_id, &theme_id, context, cancel)
    }

    fn build_artifact(
        &self,
        theme: &Theme,
        tenant: Option<&TenantConfig>,
        key: &ArtifactKey,
        context: &EvalContext,
        cancel: &CancelToken,
    ) -> Result<Arc<CompiledTheme>> {
        cancel.check()?;

        let store = match tenant.and_then(|config| config.branding.as_ref()) {
            Some(branding) => theme.tokens.with_branding(branding),
            None => theme.tokens.clone(),
        };
        let plan = OverridePlan::build(
            &theme.conditions,
            context,
            self.evaluator.as_ref(),
            self.resolver.config().max_conditions,
        )?;

        let scope = ResolutionScope {
            store: &store,
            plan: &plan,
            cache: Some((&self.token_cache, key)),
            cancel,
        };
        let resolved = self.resolver.resolve_all(&scope)?;
        let values: std::collections::BTreeMap<_, _> = resolved
            .into_iter()
            .map(|(path, literal)| (path, TokenValue::Literal(literal)))
            .collect();
        let compiled = compiler::compile(key, &values, &self.compiler_options)?;

        // All-or-nothing: a cancelled call must not commit the artifact.
        cancel.check()?;
        let artifact = Arc::new(compiled);
        self.artifact_cache.insert(key.clone(), Arc::clone(&artifact));
        self.compilations.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            tenant = %key.tenant_id,
            theme = %key.theme_id,
            checksum = %artifact.checksum(),
            "theme compiled"
        );
        Ok(artifact)
    }

    // ========== Caches & observability ==========

    /// Targeted invalidation of both cache levels.
    pub fn invalidate_cache(&self, scope: InvalidationScope) {
        match &scope {
            InvalidationScope::Theme(id) => {
                self.token_cache.invalidate_theme(id);
                self.artifact_cache.invalidate_theme(id);
            }
            InvalidationScope::Tenant(id) => {
                self.token_cache.invalidate_tenant(id);
                self.artifact_cache.invalidate_tenant(id);
            }
        }
        tracing::debug!(?scope, "cache invalidated");
    }

    /// Register an observer invoked synchronously after each successful
    /// mutating call.
    pub fn subscribe(&self, observer: impl Fn(&ThemeEvent) + Send + Sync + 'static) {
        self.observers.write().unwrap().push(Box::new(observer));
    }

    fn notify(&self, event: &ThemeEvent) {
        for observer in self.observers.read().unwrap().iter() {
            observer(event);
        }
    }

    /// Current counters.
    pub fn stats(&self) -> ManagerStats {
        ManagerStats {
            themes: self.themes.read().unwrap().len(),
            tenants: self.tenants.len(),
            compilations: self.compilations.load(Ordering::Relaxed),
            token_cache: self.token_cache.stats(),
            artifact_cache: self.artifact_cache.stats(),
        }
    }

    // ========== Lookup ==========

    /// A registered theme by id.
    pub fn theme(&self, theme_id: &str) -> Option<Arc<Theme>> {
        self.themes.read().unwrap().get(theme_id).cloned()
    }

    /// Registered theme ids, sorted.
    pub fn theme_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.themes.read().unwrap().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// A tenant's configuration, if any.
    pub fn tenant(&self, tenant_id: &str) -> Option<Arc<TenantConfig>> {
        self.tenants.get(tenant_id)
    }
}
