//! Tenant configuration
//!
//! Each tenant selects a default theme, may carry a branding overlay, and
//! owns a set of feature flags that are injected into the evaluation context
//! under the `flags` key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::store::BrandingOverlay;

/// One tenant's theming configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Isolation boundary: caches and branding are scoped to this id.
    pub tenant_id: String,
    /// Theme used when the caller does not name one; must reference a
    /// registered theme when set.
    #[serde(default)]
    pub default_theme_id: Option<String>,
    /// Semantic/component overrides layered over the selected theme.
    #[serde(default)]
    pub branding: Option<BrandingOverlay>,
    /// Opaque flags exposed to condition expressions as `flags.<name>`.
    #[serde(default)]
    pub feature_flags: BTreeMap<String, bool>,
}

impl TenantConfig {
    /// Build a config with only the tenant id set.
    pub fn new(tenant_id: impl Into<String>) -> Self {
        TenantConfig {
            tenant_id: tenant_id.into(),
            ..TenantConfig::default()
        }
    }
}
