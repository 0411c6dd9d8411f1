//! A mounted consumer of one query at a time.
//!
//! Each key change or unmount advances the observer's epoch. A fetch started
//! under an older epoch still resolves through the shared cache, but its
//! result is not delivered to the observer.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde_json::Value;

use crate::backend::Backend;
use crate::client::QueryClient;
use crate::error::QueryError;
use crate::hooks::QuerySpec;

#[derive(Debug, Clone, PartialEq)]
pub enum Observed {
    Data(Arc<Value>),
    /// The observer moved to another key or unmounted while fetching.
    Discarded,
}

impl Observed {
    pub fn data(&self) -> Option<&Arc<Value>> {
        match self {
            Observed::Data(data) => Some(data),
            Observed::Discarded => None,
        }
    }
}

#[derive(Debug)]
pub struct QueryObserver {
    client: QueryClient,
    spec: Mutex<Option<QuerySpec>>,
    epoch: AtomicU64,
    mounted: Mutex<bool>,
}

impl QueryObserver {
    pub fn new(client: QueryClient) -> Self {
        Self {
            client,
            spec: Mutex::new(None),
            epoch: AtomicU64::new(0),
            mounted: Mutex::new(true),
        }
    }

    pub fn with_spec(client: QueryClient, spec: QuerySpec) -> Self {
        let observer = Self::new(client);
        *observer.spec.lock() = Some(spec);
        observer
    }

    /// Switch to new parameters. Responses for the previous key are dropped.
    pub fn set_spec(&self, spec: QuerySpec) {
        let mut current = self.spec.lock();
        if current.as_ref().map(|s| &s.key) != Some(&spec.key) {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            tracing::trace!(key = %spec.key, "observer key changed");
        }
        *current = Some(spec);
    }

    pub fn spec(&self) -> Option<QuerySpec> {
        self.spec.lock().clone()
    }

    pub fn unmount(&self) {
        *self.mounted.lock() = false;
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        *self.mounted.lock()
    }

    pub async fn fetch(&self, backend: &dyn Backend) -> Result<Observed, QueryError> {
        if !self.is_mounted() {
            return Err(QueryError::Unmounted);
        }
        let spec = self.spec().ok_or(QueryError::NoKey)?;
        let epoch = self.epoch.load(Ordering::SeqCst);
        let data = self.client.fetch_spec(backend, &spec).await?;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            tracing::debug!(key = %spec.key, "discarding response for previous observer key");
            return Ok(Observed::Discarded);
        }
        Ok(Observed::Data(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendResponse;
    use crate::keys::FilterSet;
    use async_trait::async_trait;
    use serde_json::json;

    struct Rows;

    #[async_trait]
    impl Backend for Rows {
        async fn select(&self, table: &str, _filters: Option<&FilterSet>) -> BackendResponse {
            BackendResponse::ok(json!([{ "table": table }]))
        }

        async fn rpc(&self, _function: &str, _args: &Value) -> BackendResponse {
            BackendResponse::ok(json!({}))
        }
    }

    #[tokio::test]
    async fn fetch_without_spec_fails() {
        let observer = QueryObserver::new(QueryClient::default());
        assert_eq!(observer.fetch(&Rows).await, Err(QueryError::NoKey));
    }

    #[tokio::test]
    async fn unmounted_observer_refuses_fetch() {
        let observer = QueryObserver::with_spec(QueryClient::default(), QuerySpec::accounts());
        observer.unmount();
        assert_eq!(observer.fetch(&Rows).await, Err(QueryError::Unmounted));
    }

    #[tokio::test]
    async fn delivers_data_for_current_key() {
        let observer = QueryObserver::with_spec(QueryClient::default(), QuerySpec::accounts());
        let observed = observer.fetch(&Rows).await.unwrap();
        assert_eq!(observed.data().unwrap()[0]["table"], "accounts");
    }

    #[test]
    fn same_key_keeps_epoch() {
        let observer = QueryObserver::with_spec(QueryClient::default(), QuerySpec::accounts());
        observer.set_spec(QuerySpec::accounts());
        assert_eq!(observer.epoch.load(Ordering::SeqCst), 0);
        observer.set_spec(QuerySpec::beneficiary("b-1"));
        assert_eq!(observer.epoch.load(Ordering::SeqCst), 1);
    }
}
