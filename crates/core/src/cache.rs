//! Small TTL cache for read-heavy aggregates.
//!
//! One abstraction (key, value, insertion instant, freshness window)
//! reused everywhere a short-lived cache is needed, instead of ad-hoc
//! per-call-site timestamp checks. Entries past the TTL behave as
//! misses; callers recompute and re-insert.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Default freshness window for dashboard aggregates: 5 minutes.
pub const DASHBOARD_TTL: Duration = Duration::from_secs(300);

/// A freshness-bounded key/value cache.
///
/// Thread-safe via an interior `RwLock`; designed to be shared behind
/// `Arc` in application state. Stale entries are evicted lazily on
/// access.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, (Instant, V)>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache whose entries stay fresh for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached value if it is still fresh.
    ///
    /// A stale entry is removed and reported as a miss.
    pub async fn get(&self, key: &K) -> Option<V> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((inserted_at, value)) if inserted_at.elapsed() < self.ttl => {
                    return Some(value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Entry exists but is stale: evict under the write lock.
        self.entries.write().await.remove(key);
        None
    }

    /// Insert or replace a value, resetting its freshness window.
    pub async fn insert(&self, key: K, value: V) {
        self.entries.write().await.insert(key, (Instant::now(), value));
    }

    /// Drop a key, forcing the next read to recompute.
    pub async fn invalidate(&self, key: &K) {
        self.entries.write().await.remove(key);
    }

    /// Number of entries currently held (fresh or not yet evicted).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
