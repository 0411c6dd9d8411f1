//! Process-wide result cache.
//!
//! Entries are written only when a fetch resolves with a current ticket and
//! changed only by invalidation. Every fetch takes a ticket carrying the
//! key's generation at start; invalidating the key or starting a newer fetch
//! advances the generation, and a resolution holding an older ticket is
//! dropped. This keeps out-of-order responses from overwriting newer data.
//! Generations only increase, so forgetting a key's generation also rejects
//! every ticket issued for it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde_json::Value;

use crate::keys::QueryKey;

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Arc<Value>,
    fetched_at: Instant,
    invalidated: bool,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<QueryKey, CacheEntry>,
    generations: HashMap<QueryKey, u64>,
    next_generation: u64,
}

impl CacheState {
    fn bump(&mut self, key: &QueryKey) -> u64 {
        self.next_generation += 1;
        self.generations.insert(key.clone(), self.next_generation);
        self.next_generation
    }
}

/// Snapshot of one cached result.
#[derive(Debug, Clone)]
pub struct CachedQuery {
    pub data: Arc<Value>,
    pub fetched_at: Instant,
    pub invalidated: bool,
}

impl CachedQuery {
    pub fn is_fresh(&self, stale_time: Duration) -> bool {
        !self.invalidated && self.fetched_at.elapsed() < stale_time
    }
}

/// Permission to write one fetch result back into the cache.
#[derive(Debug)]
#[must_use = "resolve or drop the ticket once the fetch completes"]
pub struct FetchTicket {
    key: QueryKey,
    generation: u64,
}

impl FetchTicket {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

#[derive(Debug, Default)]
pub struct QueryCache {
    state: RwLock<CacheState>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &QueryKey) -> Option<CachedQuery> {
        let state = self.state.read();
        state.entries.get(key).map(|e| CachedQuery {
            data: e.data.clone(),
            fetched_at: e.fetched_at,
            invalidated: e.invalidated,
        })
    }

    /// Start a fetch for `key`. Supersedes any fetch already in flight.
    pub fn begin_fetch(&self, key: &QueryKey) -> FetchTicket {
        let mut state = self.state.write();
        let generation = state.bump(key);
        FetchTicket {
            key: key.clone(),
            generation,
        }
    }

    /// Store a fetch result if its ticket is still current. Returns whether
    /// the result was stored.
    pub fn resolve(&self, ticket: FetchTicket, data: Arc<Value>) -> bool {
        let mut state = self.state.write();
        if state.generations.get(&ticket.key) != Some(&ticket.generation) {
            tracing::debug!(key = %ticket.key, "discarding superseded fetch result");
            return false;
        }
        state.entries.insert(
            ticket.key,
            CacheEntry {
                data,
                fetched_at: Instant::now(),
                invalidated: false,
            },
        );
        true
    }

    /// Mark every entry under `prefix` stale and supersede fetches in flight
    /// for those keys. Returns the number of cached entries marked.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut state = self.state.write();
        let pending: Vec<QueryKey> = state
            .generations
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        for key in &pending {
            state.bump(key);
        }
        let mut marked = 0;
        for (key, entry) in state.entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.invalidated = true;
                marked += 1;
            }
        }
        tracing::debug!(prefix = %prefix, marked, "invalidated cache entries");
        marked
    }

    /// Drop every entry under `prefix`. Fetches in flight for those keys can
    /// no longer write back.
    pub fn remove(&self, prefix: &QueryKey) -> usize {
        let mut state = self.state.write();
        let before = state.entries.len();
        state.entries.retain(|k, _| !k.starts_with(prefix));
        state.generations.retain(|k, _| !k.starts_with(prefix));
        before - state.entries.len()
    }

    /// Drop everything. Fetches in flight can no longer write back.
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.entries.clear();
        state.generations.clear();
    }

    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<QueryKey> {
        let mut keys: Vec<QueryKey> = self.state.read().entries.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fill(cache: &QueryCache, key: &QueryKey, value: Value) {
        let ticket = cache.begin_fetch(key);
        assert!(cache.resolve(ticket, Arc::new(value)));
    }

    #[test]
    fn resolve_then_get() {
        let cache = QueryCache::new();
        let key = QueryKey::root("accounts");
        fill(&cache, &key, json!([1, 2]));
        let cached = cache.get(&key).unwrap();
        assert_eq!(*cached.data, json!([1, 2]));
        assert!(cached.is_fresh(Duration::from_secs(60)));
        assert!(!cached.is_fresh(Duration::ZERO));
    }

    #[test]
    fn prefix_invalidation_marks_children() {
        let cache = QueryCache::new();
        let root = QueryKey::root("journal_entries");
        fill(&cache, &root.with("123"), json!({"id": "123"}));
        fill(&cache, &QueryKey::root("accounts"), json!([]));

        assert_eq!(cache.invalidate(&root), 1);
        assert!(cache.get(&root.with("123")).unwrap().invalidated);
        assert!(!cache.get(&QueryKey::root("accounts")).unwrap().invalidated);
    }

    #[test]
    fn stale_data_stays_readable_after_invalidation() {
        let cache = QueryCache::new();
        let key = QueryKey::root("payments");
        fill(&cache, &key, json!([{"amount": 10}]));
        cache.invalidate(&key);
        let cached = cache.get(&key).unwrap();
        assert_eq!(cached.data[0]["amount"], 10);
        assert!(!cached.is_fresh(Duration::from_secs(3600)));
    }

    #[test]
    fn older_ticket_loses_to_newer() {
        let cache = QueryCache::new();
        let key = QueryKey::root("beneficiaries");
        let first = cache.begin_fetch(&key);
        let second = cache.begin_fetch(&key);
        assert!(cache.resolve(second, Arc::new(json!("new"))));
        assert!(!cache.resolve(first, Arc::new(json!("old"))));
        assert_eq!(*cache.get(&key).unwrap().data, json!("new"));
    }

    #[test]
    fn invalidation_supersedes_inflight_fetch() {
        let cache = QueryCache::new();
        let key = QueryKey::root("journal_entries").with("9");
        let ticket = cache.begin_fetch(&key);
        cache.invalidate(&QueryKey::root("journal_entries"));
        assert!(!cache.resolve(ticket, Arc::new(json!("pre-mutation"))));
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn clear_and_remove() {
        let cache = QueryCache::new();
        fill(&cache, &QueryKey::root("a"), json!(1));
        fill(&cache, &QueryKey::root("a").with("x"), json!(2));
        fill(&cache, &QueryKey::root("b"), json!(3));
        assert_eq!(cache.remove(&QueryKey::root("a")), 2);
        assert_eq!(cache.keys(), vec![QueryKey::root("b")]);

        let ticket = cache.begin_fetch(&QueryKey::root("c"));
        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.resolve(ticket, Arc::new(json!(4))));
    }

    #[test]
    fn generations_do_not_outlive_entries() {
        let cache = QueryCache::new();
        for i in 0..1000i64 {
            fill(&cache, &QueryKey::root("a").with(i), json!(i));
        }
        let late = cache.begin_fetch(&QueryKey::root("a").with(7i64));
        assert_eq!(cache.remove(&QueryKey::root("a")), 1000);
        assert!(cache.state.read().generations.is_empty());
        assert!(!cache.resolve(late, Arc::new(json!("late"))));

        fill(&cache, &QueryKey::root("b"), json!(1));
        let pending = cache.begin_fetch(&QueryKey::root("c"));
        cache.clear();
        assert!(cache.state.read().generations.is_empty());
        assert!(!cache.resolve(pending, Arc::new(json!("late"))));
        assert!(cache.get(&QueryKey::root("c")).is_none());

        // A fresh fetch after clearing starts a new generation and is stored.
        fill(&cache, &QueryKey::root("c"), json!(2));
        assert_eq!(cache.state.read().generations.len(), 1);
    }
}
