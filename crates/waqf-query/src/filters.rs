//! Typed filter records, one per list query.
//!
//! Each struct serializes to a flat mapping and is normalized into a
//! [`FilterSet`] before it is embedded in a key, so `None` fields, empty
//! strings and empty lists never reach the cache address.

use chrono::NaiveDate;
use serde::Serialize;
use waqf_core::Entity;

use crate::keys::FilterSet;

pub trait QueryFilters: Serialize {
    /// Collection these filters apply to.
    const ENTITY: Entity;

    fn normalized(&self) -> Option<FilterSet> {
        FilterSet::from_serialize(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BeneficiaryStatus {
    Active,
    Suspended,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BeneficiaryCategory {
    Son,
    Daughter,
    Wife,
    Relative,
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BeneficiaryFilters {
    pub status: Option<BeneficiaryStatus>,
    pub category: Option<BeneficiaryCategory>,
    pub search: Option<String>,
    pub tribe: Option<String>,
    pub family_id: Option<String>,
}

impl QueryFilters for BeneficiaryFilters {
    const ENTITY: Entity = Entity::Beneficiaries;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BeneficiaryRequestFilters {
    pub beneficiary_id: Option<String>,
    pub status: Option<RequestStatus>,
    pub request_type: Option<String>,
}

impl QueryFilters for BeneficiaryRequestFilters {
    const ENTITY: Entity = Entity::BeneficiaryRequests;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Residential,
    Commercial,
    Land,
    Agricultural,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PropertyFilters {
    pub property_type: Option<PropertyType>,
    pub city: Option<String>,
    pub search: Option<String>,
}

impl QueryFilters for PropertyFilters {
    const ENTITY: Entity = Entity::Properties;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Draft,
    Active,
    Expired,
    Terminated,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContractFilters {
    pub status: Option<ContractStatus>,
    pub property_id: Option<String>,
    pub tenant_id: Option<String>,
    /// Contracts ending on or before this date.
    pub expiring_before: Option<NaiveDate>,
    pub search: Option<String>,
}

impl QueryFilters for ContractFilters {
    const ENTITY: Entity = Entity::Contracts;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalStatus {
    Draft,
    Posted,
    Cancelled,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JournalEntryFilters {
    pub status: Option<JournalStatus>,
    pub fiscal_year_id: Option<String>,
    pub account_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub search: Option<String>,
}

impl QueryFilters for JournalEntryFilters {
    const ENTITY: Entity = Entity::JournalEntries;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    Receipt,
    Disbursement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Paid,
    Cancelled,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentFilters {
    pub kind: Option<PaymentKind>,
    pub status: Option<PaymentStatus>,
    pub contract_id: Option<String>,
    pub beneficiary_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl QueryFilters for PaymentFilters {
    const ENTITY: Entity = Entity::Payments;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionStatus {
    Draft,
    PendingApproval,
    Approved,
    Distributed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistributionFilters {
    pub status: Option<DistributionStatus>,
    pub fiscal_year_id: Option<String>,
}

impl QueryFilters for DistributionFilters {
    const ENTITY: Entity = Entity::Distributions;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentFilters {
    pub folder_id: Option<String>,
    pub category: Option<String>,
    /// Matches documents carrying every listed tag.
    pub tags: Vec<String>,
    pub search: Option<String>,
}

impl QueryFilters for DocumentFilters {
    const ENTITY: Entity = Entity::Documents;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaintenanceFilters {
    pub property_id: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

impl QueryFilters for MaintenanceFilters {
    const ENTITY: Entity = Entity::MaintenanceRequests;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::FilterValue;

    #[test]
    fn default_filters_are_no_filter() {
        assert_eq!(BeneficiaryFilters::default().normalized(), None);
        assert_eq!(DocumentFilters::default().normalized(), None);
        assert_eq!(JournalEntryFilters::default().normalized(), None);
    }

    #[test]
    fn empty_search_is_dropped() {
        let filters = BeneficiaryFilters {
            status: Some(BeneficiaryStatus::Active),
            search: Some(String::new()),
            ..Default::default()
        };
        let set = filters.normalized().unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("status"), Some(&FilterValue::Text("active".into())));
    }

    #[test]
    fn dates_serialize_as_iso() {
        let filters = JournalEntryFilters {
            date_from: NaiveDate::from_ymd_opt(2025, 1, 1),
            ..Default::default()
        };
        let set = filters.normalized().unwrap();
        assert_eq!(
            set.get("date_from"),
            Some(&FilterValue::Text("2025-01-01".into()))
        );
    }

    #[test]
    fn tag_lists_keep_order() {
        let filters = DocumentFilters {
            tags: vec!["deed".into(), "2024".into()],
            ..Default::default()
        };
        let set = filters.normalized().unwrap();
        assert_eq!(
            set.get("tags"),
            Some(&FilterValue::List(vec![
                FilterValue::Text("deed".into()),
                FilterValue::Text("2024".into())
            ]))
        );
    }
}
