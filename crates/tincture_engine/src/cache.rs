//! Bounded, multi-level memoization
//!
//! Two cache levels back the engine: a token-level cache used inside the
//! resolver (one entry per resolved token path) and an artifact-level cache
//! holding whole compiled themes. Both are LRU-bounded; invalidation is a
//! targeted sweep by theme or tenant id so unrelated tenants stay warm.
//!
//! [`Singleflight`] collapses concurrent computations of the same artifact
//! key into one: losers block on the winner and observe its result.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use lru::LruCache;

use tincture_core::Literal;

/// Identity of one compiled artifact: tenant, theme, and context hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    /// Owning tenant ("" for tenantless callers).
    pub tenant_id: String,
    /// Source theme id.
    pub theme_id: String,
    /// Hash of the evaluation context.
    pub context_hash: String,
}

/// Identity of one resolved token value within an artifact scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenKey {
    /// The artifact scope this token was resolved under.
    pub scope: ArtifactKey,
    /// The resolved token path.
    pub path: String,
}

/// Hit/miss/entry counts for one cache level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found an entry.
    pub hits: u64,
    /// Lookups that did not.
    pub misses: u64,
    /// Entries currently resident.
    pub entries: usize,
}

/// LRU cache of resolved token literals, keyed
/// `(tenant, theme, context_hash, path)`.
pub struct TokenCache {
    inner: Mutex<LruCache<TokenKey, Literal>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TokenCache {
    /// Create a cache bounded to `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        TokenCache {
            inner: Mutex::new(LruCache::new(bounded(capacity))),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a resolved literal.
    pub fn get(&self, key: &TokenKey) -> Option<Literal> {
        let found = self.inner.lock().unwrap().get(key).cloned();
        match &found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// Store a resolved literal. Idempotent: re-inserting a key simply
    /// replaces the (identical, by determinism) value.
    pub fn insert(&self, key: TokenKey, value: Literal) {
        self.inner.lock().unwrap().put(key, value);
    }

    /// Drop every entry resolved against the given theme.
    pub fn invalidate_theme(&self, theme_id: &str) {
        self.sweep(|key| key.scope.theme_id == theme_id);
    }

    /// Drop every entry resolved for the given tenant.
    pub fn invalidate_tenant(&self, tenant_id: &str) {
        self.sweep(|key| key.scope.tenant_id == tenant_id);
    }

    fn sweep(&self, matches: impl Fn(&TokenKey) -> bool) {
        let mut cache = self.inner.lock().unwrap();
        let doomed: Vec<TokenKey> = cache
            .iter()
            .filter(|(key, _)| matches(key))
            .map(|(key, _)| key.clone())
            .collect();
        for key in doomed {
            cache.pop(&key);
        }
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.inner.lock().unwrap().len(),
        }
    }
}

/// LRU cache of compiled artifacts, keyed `(tenant, theme, context_hash)`.
pub struct ArtifactCache<A> {
    inner: Mutex<LruCache<ArtifactKey, Arc<A>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<A> ArtifactCache<A> {
    /// Create a cache bounded to `capacity` artifacts (minimum 1).
    pub fn new(capacity: usize) -> Self {
        ArtifactCache {
            inner: Mutex::new(LruCache::new(bounded(capacity))),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a compiled artifact.
    pub fn get(&self, key: &ArtifactKey) -> Option<Arc<A>> {
        let found = self.inner.lock().unwrap().get(key).cloned();
        match &found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// Commit a compiled artifact.
    pub fn insert(&self, key: ArtifactKey, artifact: Arc<A>) {
        self.inner.lock().unwrap().put(key, artifact);
    }

    /// Drop every artifact compiled from the given theme.
    pub fn invalidate_theme(&self, theme_id: &str) {
        self.sweep(|key| key.theme_id == theme_id);
    }

    /// Drop every artifact compiled for the given tenant.
    pub fn invalidate_tenant(&self, tenant_id: &str) {
        self.sweep(|key| key.tenant_id == tenant_id);
    }

    fn sweep(&self, matches: impl Fn(&ArtifactKey) -> bool) {
        let mut cache = self.inner.lock().unwrap();
        let doomed: Vec<ArtifactKey> = cache
            .iter()
            .filter(|(key, _)| matches(key))
            .map(|(key, _)| key.clone())
            .collect();
        for key in doomed {
            cache.pop(&key);
        }
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.inner.lock().unwrap().len(),
        }
    }
}

fn bounded(capacity: usize) -> NonZeroUsize {
    NonZeroUsize::new(capacity.max(1)).unwrap()
}

enum FlightState<V> {
    Pending,
    Done(V),
    Abandoned,
}

struct Flight<V> {
    state: Mutex<FlightState<V>>,
    done: Condvar,
}

/// Removes the flight from the table when the leader finishes, whether it
/// produced a value or unwound. A flight still `Pending` at that point is
/// marked `Abandoned` so waiters stop blocking and retry.
struct FlightGuard<'a, K, V>
where
    K: std::hash::Hash + Eq,
{
    table: &'a Mutex<HashMap<K, Arc<Flight<V>>>>,
    key: &'a K,
    flight: &'a Arc<Flight<V>>,
}

impl<K, V> Drop for FlightGuard<'_, K, V>
where
    K: std::hash::Hash + Eq,
{
    fn drop(&mut self) {
        self.table.lock().unwrap().remove(self.key);
        {
            let mut state = self.flight.state.lock().unwrap();
            if matches!(*state, FlightState::Pending) {
                *state = FlightState::Abandoned;
            }
        }
        self.flight.done.notify_all();
    }
}

/// Collapses concurrent computations of the same key into one.
///
/// The first caller for a key becomes the leader and runs `compute`; every
/// concurrent caller for the same key blocks until the leader finishes and
/// then clones the leader's result (success or failure alike). If the leader
/// panics, its flight is abandoned and each waiter retries, so a poisoned
/// computation never wedges the table.
pub struct Singleflight<K, V> {
    inflight: Mutex<HashMap<K, Arc<Flight<V>>>>,
}

impl<K, V> Default for Singleflight<K, V> {
    fn default() -> Self {
        Singleflight {
            inflight: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> Singleflight<K, V>
where
    K: std::hash::Hash + Eq + Clone,
    V: Clone,
{
    /// Create an empty flight table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `compute` for `key`, or wait for the in-flight computation.
    /// Returns the value and whether this caller was the leader.
    pub fn run(&self, key: K, compute: impl FnOnce() -> V) -> (V, bool) {
        let mut compute = Some(compute);
        loop {
            let (flight, leader) = {
                let mut inflight = self.inflight.lock().unwrap();
                match inflight.get(&key) {
                    Some(existing) => (Arc::clone(existing), false),
                    None => {
                        let flight = Arc::new(Flight {
                            state: Mutex::new(FlightState::Pending),
                            done: Condvar::new(),
                        });
                        inflight.insert(key.clone(), Arc::clone(&flight));
                        (flight, true)
                    }
                }
            };

            if leader {
                let guard = FlightGuard {
                    table: &self.inflight,
                    key: &key,
                    flight: &flight,
                };
                // A caller leads at most once: the leader branch returns.
                let compute = compute.take().expect("flight led twice");
                let value = compute();
                *flight.state.lock().unwrap() = FlightState::Done(value.clone());
                drop(guard);
                return (value, true);
            }

            let mut state = flight.state.lock().unwrap();
            loop {
                match &*state {
                    FlightState::Done(value) => return (value.clone(), false),
                    FlightState::Abandoned => break,
                    FlightState::Pending => state = flight.done.wait(state).unwrap(),
                }
            }
            // The leader unwound without a result; loop and try again,
            // possibly becoming the leader this time.
        }
    }
}
