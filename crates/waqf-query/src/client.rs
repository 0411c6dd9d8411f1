use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use waqf_core::config::WaqfConfig;

use crate::backend::Backend;
use crate::cache::QueryCache;
use crate::error::QueryError;
use crate::hooks::QuerySpec;
use crate::invalidation::{InvalidationRules, MutationEvent};
use crate::keys::QueryKey;

/// How long results stay fresh, per key root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StalePolicy {
    default: Duration,
    overrides: HashMap<String, Duration>,
}

impl Default for StalePolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl StalePolicy {
    pub fn new(default: Duration) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    pub fn from_config(config: &WaqfConfig) -> Self {
        Self {
            default: config.waqf.default_stale_time(),
            overrides: config
                .stale_overrides
                .iter()
                .map(|(root, secs)| (root.clone(), Duration::from_secs(*secs)))
                .collect(),
        }
    }

    pub fn with_override(mut self, root: impl Into<String>, stale_time: Duration) -> Self {
        self.overrides.insert(root.into(), stale_time);
        self
    }

    pub fn stale_time_for(&self, key: &QueryKey) -> Duration {
        key.root_name()
            .and_then(|root| self.overrides.get(root))
            .copied()
            .unwrap_or(self.default)
    }
}

/// Reads through the shared cache and writes through mutations.
///
/// Cloning is cheap; clones share the cache and the rules.
#[derive(Debug, Clone)]
pub struct QueryClient {
    cache: Arc<QueryCache>,
    rules: Arc<InvalidationRules>,
    stale: Arc<StalePolicy>,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(
            Arc::new(QueryCache::new()),
            InvalidationRules::default(),
            StalePolicy::default(),
        )
    }
}

impl QueryClient {
    pub fn new(cache: Arc<QueryCache>, rules: InvalidationRules, stale: StalePolicy) -> Self {
        Self {
            cache,
            rules: Arc::new(rules),
            stale: Arc::new(stale),
        }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn rules(&self) -> &InvalidationRules {
        &self.rules
    }

    pub fn stale_policy(&self) -> &StalePolicy {
        &self.stale
    }

    /// Cached data if fresh, otherwise the result of `fetch`.
    ///
    /// A failed fetch leaves the cache untouched. A successful fetch that
    /// was superseded while in flight is returned to the caller but not
    /// stored.
    pub async fn fetch_query<F, Fut>(
        &self,
        key: &QueryKey,
        stale_time: Duration,
        fetch: F,
    ) -> Result<Arc<Value>, QueryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, QueryError>>,
    {
        if let Some(cached) = self.cache.get(key) {
            if cached.is_fresh(stale_time) {
                tracing::trace!(key = %key, "cache hit");
                return Ok(cached.data);
            }
        }
        let ticket = self.cache.begin_fetch(key);
        let data = match fetch().await {
            Ok(data) => Arc::new(data),
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "fetch failed");
                return Err(e);
            }
        };
        self.cache.resolve(ticket, data.clone());
        Ok(data)
    }

    /// Fetch a spec through `backend` using its stale time, or the policy's.
    pub async fn fetch_spec(
        &self,
        backend: &dyn Backend,
        spec: &QuerySpec,
    ) -> Result<Arc<Value>, QueryError> {
        let stale_time = spec
            .stale_time
            .unwrap_or_else(|| self.stale.stale_time_for(&spec.key));
        self.fetch_query(&spec.key, stale_time, || spec.source.load(backend))
            .await
    }

    pub async fn fetch_typed<T: DeserializeOwned>(
        &self,
        backend: &dyn Backend,
        spec: &QuerySpec,
    ) -> Result<T, QueryError> {
        let data = self.fetch_spec(backend, spec).await?;
        Ok(T::deserialize(&*data)?)
    }

    /// Run a mutation. Its invalidation rule is applied only after it
    /// succeeds; a failed mutation leaves every cached entry as it was.
    pub async fn mutate<T, E, Fut>(&self, event: MutationEvent, op: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        match op.await {
            Ok(value) => {
                self.invalidate_event(&event);
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(%event, error = %e, "mutation failed, cache left intact");
                Err(e)
            }
        }
    }

    /// Call a stored procedure as a mutation.
    pub async fn mutate_rpc(
        &self,
        backend: &dyn Backend,
        event: MutationEvent,
        function: &str,
        args: &Value,
    ) -> Result<Value, QueryError> {
        self.mutate(event, async { backend.rpc(function, args).await.into_result() })
            .await
    }

    /// Apply the rule for `event`. Returns the prefixes invalidated.
    pub fn invalidate_event(&self, event: &MutationEvent) -> Vec<QueryKey> {
        let prefixes = self.rules.prefixes_for(event);
        let marked: usize = prefixes.iter().map(|p| self.cache.invalidate(p)).sum();
        tracing::debug!(%event, prefixes = prefixes.len(), marked, "applied invalidation rule");
        prefixes
    }

    /// Forget every cached result, e.g. on sign-out.
    pub fn reset(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use waqf_core::{Entity, MutationAction};

    #[tokio::test]
    async fn fresh_cache_skips_fetch() {
        let client = QueryClient::default();
        let key = QueryKey::root("accounts");
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let data = client
                .fetch_query(&key, Duration::from_secs(60), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(json!(["1100"]))
                })
                .await
                .unwrap();
            assert_eq!(*data, json!(["1100"]));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_cache_refetches() {
        let client = QueryClient::default();
        let key = QueryKey::root("accounts");
        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            client
                .fetch_query(&key, Duration::ZERO, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(json!([]))
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_fetch_does_not_cache() {
        let client = QueryClient::default();
        let key = QueryKey::root("accounts");
        let result = client
            .fetch_query(&key, Duration::from_secs(60), || async {
                Err(QueryError::EmptyResponse)
            })
            .await;
        assert!(result.is_err());
        assert!(client.cache().get(&key).is_none());
    }

    #[tokio::test]
    async fn successful_mutation_invalidates() {
        let client = QueryClient::default();
        let key = QueryKey::root("journal_entries").with("123");
        client
            .fetch_query(&key, Duration::from_secs(60), || async { Ok(json!({})) })
            .await
            .unwrap();

        let event = MutationEvent::new(Entity::JournalEntries, MutationAction::Create);
        let out: Result<u32, QueryError> = client.mutate(event, async { Ok(1) }).await;
        assert_eq!(out, Ok(1));
        assert!(client.cache().get(&key).unwrap().invalidated);
    }

    #[tokio::test]
    async fn failed_mutation_keeps_cache() {
        let client = QueryClient::default();
        let key = QueryKey::root("journal_entries").with("123");
        client
            .fetch_query(&key, Duration::from_secs(60), || async { Ok(json!({})) })
            .await
            .unwrap();

        let event = MutationEvent::new(Entity::JournalEntries, MutationAction::Create);
        let out: Result<(), QueryError> = client
            .mutate(event, async { Err(QueryError::EmptyResponse) })
            .await;
        assert!(out.is_err());
        assert!(!client.cache().get(&key).unwrap().invalidated);
    }

    #[test]
    fn stale_policy_overrides_by_root() {
        let policy = StalePolicy::new(Duration::from_secs(30))
            .with_override("accountant_kpis", Duration::from_secs(120));
        assert_eq!(
            policy.stale_time_for(&QueryKey::root("accountant_kpis")),
            Duration::from_secs(120)
        );
        assert_eq!(
            policy.stale_time_for(&QueryKey::root("accounts").with("1")),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn reset_empties_cache() {
        let client = QueryClient::default();
        let ticket = client.cache().begin_fetch(&QueryKey::root("a"));
        assert!(client.cache().resolve(ticket, Arc::new(json!(1))));
        client.reset();
        assert!(client.cache().is_empty());
    }
}
