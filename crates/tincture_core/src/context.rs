//! Evaluation context
//!
//! Condition expressions evaluate against an arbitrary key-value bag: time
//! of day, locale, feature flags, anything the host cares to pass. The bag
//! is untyped by design; the engine only needs it to be serializable so a
//! stable hash can key the caches.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Hash prefix length used for cache keys. Collisions at 64 bits of hex are
/// not a correctness concern for cache keying.
const HASH_LEN: usize = 16;

/// An opaque bag of request-time data handed to condition expressions.
///
/// Keys are kept in a `BTreeMap` so serialization is canonical and the
/// derived hash is stable across insertion orders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvalContext {
    entries: BTreeMap<String, Value>,
}

impl EvalContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Insert a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrow the underlying map (for handing to external evaluators).
    pub fn entries(&self) -> &BTreeMap<String, Value> {
        &self.entries
    }

    /// Stable hash of the context contents: SHA-256 over canonical JSON,
    /// truncated hex. Identical logical contents always hash identically.
    pub fn context_hash(&self) -> String {
        // BTreeMap keys serialize sorted, and serde_json's default map is
        // itself ordered, so nested objects stay canonical too.
        let canonical =
            serde_json::to_string(&self.entries).unwrap_or_else(|_| String::from("{}"));
        let digest = Sha256::digest(canonical.as_bytes());
        let mut hex = String::with_capacity(HASH_LEN);
        for byte in digest.iter().take(HASH_LEN / 2) {
            use std::fmt::Write;
            let _ = write!(hex, "{byte:02x}");
        }
        hex
    }
}

impl FromIterator<(String, Value)> for EvalContext {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        EvalContext {
            entries: iter.into_iter().collect(),
        }
    }
}
