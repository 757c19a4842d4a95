//! Tenant registry
//!
//! Maps tenant ids to their configurations. Configs are stored behind
//! `Arc` and replaced wholesale on reconfiguration, so concurrent readers
//! never observe a partial update. Isolation falls out of keying: nothing
//! here can read or write across tenant ids.

use std::sync::{Arc, RwLock};

use rustc_hash::FxHashMap;

use tincture_core::TenantConfig;

/// Thread-safe map of tenant id → active configuration.
#[derive(Debug, Default)]
pub struct TenantRegistry {
    configs: RwLock<FxHashMap<String, Arc<TenantConfig>>>,
}

impl TenantRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a tenant's configuration.
    pub fn configure(&self, config: TenantConfig) -> Arc<TenantConfig> {
        let shared = Arc::new(config);
        self.configs
            .write()
            .unwrap()
            .insert(shared.tenant_id.clone(), Arc::clone(&shared));
        shared
    }

    /// The configuration for a tenant, if one exists.
    pub fn get(&self, tenant_id: &str) -> Option<Arc<TenantConfig>> {
        self.configs.read().unwrap().get(tenant_id).cloned()
    }

    /// Remove a tenant's configuration.
    pub fn remove(&self, tenant_id: &str) -> Option<Arc<TenantConfig>> {
        self.configs.write().unwrap().remove(tenant_id)
    }

    /// Tenants whose default theme is `theme_id`, sorted for stable error
    /// reporting.
    pub fn tenants_using(&self, theme_id: &str) -> Vec<String> {
        let mut using: Vec<String> = self
            .configs
            .read()
            .unwrap()
            .values()
            .filter(|config| config.default_theme_id.as_deref() == Some(theme_id))
            .map(|config| config.tenant_id.clone())
            .collect();
        using.sort_unstable();
        using
    }

    /// Number of configured tenants.
    pub fn len(&self) -> usize {
        self.configs.read().unwrap().len()
    }

    /// Whether no tenant is configured.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
