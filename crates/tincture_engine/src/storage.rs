//! Persistent storage seam
//!
//! The engine treats persistence as an external capability: a key-value
//! backend with get/put/delete/list. Keys are namespaced `theme:<id>` and
//! `tenant:<id>`; payloads are JSON and round-trip definitions exactly.
//! [`MemoryStorage`] is the reference backend for tests and embedding.

use std::collections::BTreeMap;
use std::sync::RwLock;

use tincture_core::{Result, TenantConfig, Theme, ThemeError};

/// Key prefix for theme definitions.
pub const THEME_PREFIX: &str = "theme:";
/// Key prefix for tenant configurations.
pub const TENANT_PREFIX: &str = "tenant:";

/// The storage key for a theme id.
pub fn theme_key(id: &str) -> String {
    format!("{THEME_PREFIX}{id}")
}

/// The storage key for a tenant id.
pub fn tenant_key(id: &str) -> String {
    format!("{TENANT_PREFIX}{id}")
}

/// External key-value backend consumed by the engine. Implementations must
/// be safe to call from multiple threads; calls may block.
pub trait ThemeStorage: Send + Sync {
    /// Fetch the value at `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    /// Store `value` at `key`, replacing any existing value.
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;
    /// Remove the value at `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<()>;
    /// All keys starting with `prefix`, in lexicographic order.
    fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Serialize a theme for storage.
pub fn encode_theme(theme: &Theme) -> Result<Vec<u8>> {
    serde_json::to_vec(theme).map_err(storage_error)
}

/// Deserialize a stored theme.
pub fn decode_theme(bytes: &[u8]) -> Result<Theme> {
    serde_json::from_slice(bytes).map_err(storage_error)
}

/// Serialize a tenant config for storage.
pub fn encode_tenant(config: &TenantConfig) -> Result<Vec<u8>> {
    serde_json::to_vec(config).map_err(storage_error)
}

/// Deserialize a stored tenant config.
pub fn decode_tenant(bytes: &[u8]) -> Result<TenantConfig> {
    serde_json::from_slice(bytes).map_err(storage_error)
}

fn storage_error(err: serde_json::Error) -> ThemeError {
    ThemeError::Storage {
        message: err.to_string(),
    }
}

/// In-memory reference backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ThemeStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .entries
            .read()
            .unwrap()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tincture_core::TokenValue;

    #[test]
    fn themes_round_trip_exactly() {
        let mut theme = Theme::new("aurora", "Aurora");
        theme.version = "2.0.0".into();
        theme
            .tokens
            .primitives
            .insert("color.blue-600".into(), TokenValue::literal("#3b82f6"));
        theme.tokens.semantic.insert(
            "colors.primary".into(),
            TokenValue::reference("primitives.color.blue-600"),
        );

        let storage = MemoryStorage::new();
        storage
            .put(&theme_key(&theme.id), &encode_theme(&theme).unwrap())
            .unwrap();

        let bytes = storage.get(&theme_key("aurora")).unwrap().unwrap();
        assert_eq!(decode_theme(&bytes).unwrap(), theme);
    }

    #[test]
    fn tenant_configs_round_trip_exactly() {
        let mut config = TenantConfig::new("acme");
        config.default_theme_id = Some("aurora".into());
        config.feature_flags.insert("beta".into(), false);

        let storage = MemoryStorage::new();
        storage
            .put(&tenant_key(&config.tenant_id), &encode_tenant(&config).unwrap())
            .unwrap();

        let bytes = storage.get(&tenant_key("acme")).unwrap().unwrap();
        assert_eq!(decode_tenant(&bytes).unwrap(), config);
    }

    #[test]
    fn list_filters_by_namespace_prefix() {
        let storage = MemoryStorage::new();
        storage.put(&theme_key("a"), b"{}").unwrap();
        storage.put(&theme_key("b"), b"{}").unwrap();
        storage.put(&tenant_key("acme"), b"{}").unwrap();

        assert_eq!(
            storage.list(THEME_PREFIX).unwrap(),
            vec!["theme:a".to_string(), "theme:b".to_string()]
        );
        assert_eq!(storage.list(TENANT_PREFIX).unwrap(), vec!["tenant:acme"]);
    }

    #[test]
    fn delete_is_idempotent() {
        let storage = MemoryStorage::new();
        storage.put("theme:x", b"{}").unwrap();
        storage.delete("theme:x").unwrap();
        storage.delete("theme:x").unwrap();
        assert!(storage.get("theme:x").unwrap().is_none());
    }
}
