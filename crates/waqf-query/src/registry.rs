//! Central factory of cache keys.
//!
//! Layout:
//! - `[entity]` addresses the whole collection and is the invalidation prefix
//! - `[entity, id]` addresses one record
//! - `[entity, {filters}]` addresses a filtered list; with no effective
//!   filter it collapses to `[entity]`
//! - `[entity, id, sub]` addresses data scoped under one record

use serde::Serialize;
use serde_json::{Map, Value};
use waqf_core::Entity;

use crate::filters::{
    BeneficiaryFilters, BeneficiaryRequestFilters, ContractFilters, DistributionFilters,
    DocumentFilters, JournalEntryFilters, MaintenanceFilters, PaymentFilters, PropertyFilters,
    QueryFilters,
};
use crate::keys::{FilterSet, QueryKey};

pub struct QueryKeys;

impl QueryKeys {
    pub fn all(entity: Entity) -> QueryKey {
        QueryKey::root(entity.as_str())
    }

    pub fn item(entity: Entity, id: &str) -> QueryKey {
        Self::all(entity).with(id)
    }

    pub fn list<F: QueryFilters>(filters: &F) -> QueryKey {
        Self::all(F::ENTITY).with_filters(filters.normalized())
    }

    /// Untyped entry point for callers holding an open mapping.
    pub fn list_raw(root: &str, filters: &Map<String, Value>) -> QueryKey {
        QueryKey::root(root).with_filters(FilterSet::from_map(filters))
    }

    /// Like [`list_raw`](Self::list_raw) for any serializable value.
    pub fn list_serialized<T: Serialize + ?Sized>(root: &str, filters: &T) -> QueryKey {
        QueryKey::root(root).with_filters(FilterSet::from_serialize(filters))
    }

    // Beneficiaries

    pub fn beneficiaries() -> QueryKey {
        Self::all(Entity::Beneficiaries)
    }

    pub fn beneficiary(id: &str) -> QueryKey {
        Self::item(Entity::Beneficiaries, id)
    }

    pub fn beneficiaries_list(filters: &BeneficiaryFilters) -> QueryKey {
        Self::list(filters)
    }

    pub fn beneficiary_requests(filters: &BeneficiaryRequestFilters) -> QueryKey {
        Self::list(filters)
    }

    pub fn beneficiary_stats(beneficiary_id: &str) -> QueryKey {
        Self::item(Entity::BeneficiaryStats, beneficiary_id)
    }

    // Properties and contracts

    pub fn properties() -> QueryKey {
        Self::all(Entity::Properties)
    }

    pub fn properties_list(filters: &PropertyFilters) -> QueryKey {
        Self::list(filters)
    }

    pub fn property_units(property_id: &str) -> QueryKey {
        Self::item(Entity::PropertyUnits, property_id)
    }

    pub fn contracts() -> QueryKey {
        Self::all(Entity::Contracts)
    }

    pub fn contract(id: &str) -> QueryKey {
        Self::item(Entity::Contracts, id)
    }

    pub fn contracts_list(filters: &ContractFilters) -> QueryKey {
        Self::list(filters)
    }

    pub fn tenants() -> QueryKey {
        Self::all(Entity::Tenants)
    }

    pub fn maintenance_requests(filters: &MaintenanceFilters) -> QueryKey {
        Self::list(filters)
    }

    // Accounting

    pub fn accounts() -> QueryKey {
        Self::all(Entity::Accounts)
    }

    pub fn account_ledger(account_id: &str) -> QueryKey {
        Self::item(Entity::Accounts, account_id).with("ledger")
    }

    pub fn journal_entries() -> QueryKey {
        Self::all(Entity::JournalEntries)
    }

    pub fn journal_entry(id: &str) -> QueryKey {
        Self::item(Entity::JournalEntries, id)
    }

    pub fn journal_entries_list(filters: &JournalEntryFilters) -> QueryKey {
        Self::list(filters)
    }

    pub fn fiscal_years() -> QueryKey {
        Self::all(Entity::FiscalYears)
    }

    pub fn payments_list(filters: &PaymentFilters) -> QueryKey {
        Self::list(filters)
    }

    pub fn invoices() -> QueryKey {
        Self::all(Entity::Invoices)
    }

    pub fn distributions_list(filters: &DistributionFilters) -> QueryKey {
        Self::list(filters)
    }

    pub fn distribution(id: &str) -> QueryKey {
        Self::item(Entity::Distributions, id)
    }

    // Documents, users, dashboards

    pub fn documents_list(filters: &DocumentFilters) -> QueryKey {
        Self::list(filters)
    }

    pub fn notifications(user_id: &str) -> QueryKey {
        Self::item(Entity::Notifications, user_id)
    }

    pub fn user_roles(user_id: &str) -> QueryKey {
        Self::item(Entity::UserRoles, user_id)
    }

    pub fn profile(user_id: &str) -> QueryKey {
        Self::item(Entity::Profiles, user_id)
    }

    pub fn audit_logs() -> QueryKey {
        Self::all(Entity::AuditLogs)
    }

    pub fn accountant_kpis() -> QueryKey {
        Self::all(Entity::AccountantKpis)
    }

    pub fn nazer_kpis() -> QueryKey {
        Self::all(Entity::NazerKpis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::BeneficiaryStatus;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn collection_keys_are_single_segment() {
        assert_eq!(QueryKeys::beneficiaries().to_string(), r#"["beneficiaries"]"#);
        assert_eq!(QueryKeys::accounts().to_string(), r#"["accounts"]"#);
    }

    #[test]
    fn empty_search_matches_status_only() {
        let a = QueryKeys::list_raw("beneficiaries", &obj(json!({"status": "active", "search": ""})));
        let b = QueryKeys::list_raw("beneficiaries", &obj(json!({"status": "active"})));
        assert_eq!(a, b);
    }

    #[test]
    fn typed_and_raw_filters_agree() {
        let typed = QueryKeys::beneficiaries_list(&BeneficiaryFilters {
            status: Some(BeneficiaryStatus::Active),
            ..Default::default()
        });
        let raw = QueryKeys::list_raw("beneficiaries", &obj(json!({"status": "active"})));
        assert_eq!(typed, raw);
    }

    #[test]
    fn unfiltered_list_is_collection_key() {
        assert_eq!(
            QueryKeys::beneficiaries_list(&BeneficiaryFilters::default()),
            QueryKeys::beneficiaries()
        );
    }

    #[test]
    fn item_and_filter_keys_differ() {
        let item = QueryKeys::journal_entry("draft");
        let filtered = QueryKeys::list_raw("journal_entries", &obj(json!({"status": "draft"})));
        assert_ne!(item, filtered);
        assert!(item.starts_with(&QueryKeys::journal_entries()));
        assert!(filtered.starts_with(&QueryKeys::journal_entries()));
    }

    #[test]
    fn ledger_is_scoped_under_account() {
        let ledger = QueryKeys::account_ledger("1100");
        assert_eq!(ledger.to_string(), r#"["accounts","1100","ledger"]"#);
        assert!(ledger.starts_with(&QueryKeys::accounts()));
    }
}
