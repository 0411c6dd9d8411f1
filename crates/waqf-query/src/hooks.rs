//! Query specs: a cache key paired with the backend call that fills it.

use std::time::Duration;

use serde_json::{Value, json};
use waqf_core::Entity;

use crate::backend::Backend;
use crate::error::QueryError;
use crate::filters::{
    BeneficiaryFilters, ContractFilters, DistributionFilters, DocumentFilters,
    JournalEntryFilters, PaymentFilters, PropertyFilters, QueryFilters,
};
use crate::keys::{FilterSet, QueryKey};
use crate::registry::QueryKeys;

#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// Rows of a table, filtered by equality or list membership.
    Table {
        table: String,
        filters: Option<FilterSet>,
    },
    /// A stored procedure.
    Rpc { function: String, args: Value },
}

impl DataSource {
    pub async fn load(&self, backend: &dyn Backend) -> Result<Value, QueryError> {
        let response = match self {
            DataSource::Table { table, filters } => backend.select(table, filters.as_ref()).await,
            DataSource::Rpc { function, args } => backend.rpc(function, args).await,
        };
        response.into_result()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub key: QueryKey,
    pub source: DataSource,
    /// Overrides the client's stale policy for this query.
    pub stale_time: Option<Duration>,
}

impl QuerySpec {
    pub fn new(key: QueryKey, source: DataSource) -> Self {
        Self {
            key,
            source,
            stale_time: None,
        }
    }

    pub fn stale_after(mut self, stale_time: Duration) -> Self {
        self.stale_time = Some(stale_time);
        self
    }

    fn table(key: QueryKey, entity: Entity, filters: Option<FilterSet>) -> Self {
        Self::new(
            key,
            DataSource::Table {
                table: entity.as_str().to_string(),
                filters,
            },
        )
    }

    fn rpc(key: QueryKey, function: &str, args: Value) -> Self {
        Self::new(
            key,
            DataSource::Rpc {
                function: function.to_string(),
                args,
            },
        )
    }

    /// Filtered list of any entity. The select uses the same normalized
    /// filters as the key.
    pub fn list<F: QueryFilters>(filters: &F) -> Self {
        let normalized = filters.normalized();
        let key = QueryKeys::all(F::ENTITY).with_filters(normalized.clone());
        Self::table(key, F::ENTITY, normalized)
    }

    fn by_id(entity: Entity, id: &str) -> Self {
        Self::table(
            QueryKeys::item(entity, id),
            entity,
            Some(FilterSet::single("id", id)),
        )
    }

    pub fn beneficiaries(filters: &BeneficiaryFilters) -> Self {
        Self::list(filters)
    }

    pub fn beneficiary(id: &str) -> Self {
        Self::by_id(Entity::Beneficiaries, id)
    }

    pub fn properties(filters: &PropertyFilters) -> Self {
        Self::list(filters)
    }

    pub fn contracts(filters: &ContractFilters) -> Self {
        Self::list(filters)
    }

    pub fn journal_entries(filters: &JournalEntryFilters) -> Self {
        Self::list(filters)
    }

    pub fn journal_entry(id: &str) -> Self {
        Self::by_id(Entity::JournalEntries, id)
    }

    pub fn accounts() -> Self {
        Self::table(QueryKeys::accounts(), Entity::Accounts, None)
    }

    pub fn payments(filters: &PaymentFilters) -> Self {
        Self::list(filters)
    }

    pub fn distributions(filters: &DistributionFilters) -> Self {
        Self::list(filters)
    }

    pub fn documents(filters: &DocumentFilters) -> Self {
        Self::list(filters)
    }

    pub fn user_roles(user_id: &str) -> Self {
        Self::table(
            QueryKeys::user_roles(user_id),
            Entity::UserRoles,
            Some(FilterSet::single("user_id", user_id)),
        )
    }

    pub fn accountant_kpis() -> Self {
        Self::rpc(QueryKeys::accountant_kpis(), "get_accountant_kpis", json!({}))
    }

    pub fn nazer_kpis() -> Self {
        Self::rpc(QueryKeys::nazer_kpis(), "get_nazer_kpis", json!({}))
    }

    pub fn beneficiary_stats(beneficiary_id: &str) -> Self {
        Self::rpc(
            QueryKeys::beneficiary_stats(beneficiary_id),
            "get_beneficiary_stats",
            json!({ "p_beneficiary_id": beneficiary_id }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendResponse;
    use crate::filters::JournalStatus;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl Backend for Echo {
        async fn select(&self, table: &str, filters: Option<&FilterSet>) -> BackendResponse {
            BackendResponse::ok(json!({ "table": table, "filters": filters }))
        }

        async fn rpc(&self, function: &str, args: &Value) -> BackendResponse {
            BackendResponse::ok(json!({ "function": function, "args": args }))
        }
    }

    #[test]
    fn list_key_and_select_share_filters() {
        let spec = QuerySpec::journal_entries(&JournalEntryFilters {
            status: Some(JournalStatus::Draft),
            search: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(spec.key.to_string(), r#"["journal_entries",{"status":"draft"}]"#);
        match &spec.source {
            DataSource::Table { table, filters } => {
                assert_eq!(table, "journal_entries");
                assert_eq!(filters.as_ref().map(FilterSet::len), Some(1));
            }
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn kpis_come_from_rpc() {
        let spec = QuerySpec::accountant_kpis();
        assert_eq!(spec.key, QueryKeys::accountant_kpis());
        assert!(matches!(spec.source, DataSource::Rpc { ref function, .. } if function == "get_accountant_kpis"));
    }

    #[tokio::test]
    async fn load_dispatches_by_source() {
        let table = QuerySpec::beneficiary("b-1").source.load(&Echo).await.unwrap();
        assert_eq!(table["table"], "beneficiaries");
        assert_eq!(table["filters"]["id"], "b-1");

        let rpc = QuerySpec::beneficiary_stats("b-1").source.load(&Echo).await.unwrap();
        assert_eq!(rpc["args"]["p_beneficiary_id"], "b-1");
    }
}
