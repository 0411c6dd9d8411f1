use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::WaqfError;

/// Backend tables (and derived dashboards) the administration app reads.
///
/// The string form doubles as the root segment of every query key and as the
/// table name on the realtime change feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Beneficiaries,
    BeneficiaryRequests,
    Properties,
    PropertyUnits,
    Contracts,
    Tenants,
    Accounts,
    JournalEntries,
    FiscalYears,
    Distributions,
    Payments,
    Invoices,
    Documents,
    MaintenanceRequests,
    Notifications,
    UserRoles,
    Profiles,
    AuditLogs,
    AccountantKpis,
    NazerKpis,
    BeneficiaryStats,
}

impl Entity {
    pub const ALL: &'static [Entity] = &[
        Entity::Beneficiaries,
        Entity::BeneficiaryRequests,
        Entity::Properties,
        Entity::PropertyUnits,
        Entity::Contracts,
        Entity::Tenants,
        Entity::Accounts,
        Entity::JournalEntries,
        Entity::FiscalYears,
        Entity::Distributions,
        Entity::Payments,
        Entity::Invoices,
        Entity::Documents,
        Entity::MaintenanceRequests,
        Entity::Notifications,
        Entity::UserRoles,
        Entity::Profiles,
        Entity::AuditLogs,
        Entity::AccountantKpis,
        Entity::NazerKpis,
        Entity::BeneficiaryStats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Beneficiaries => "beneficiaries",
            Entity::BeneficiaryRequests => "beneficiary_requests",
            Entity::Properties => "properties",
            Entity::PropertyUnits => "property_units",
            Entity::Contracts => "contracts",
            Entity::Tenants => "tenants",
            Entity::Accounts => "accounts",
            Entity::JournalEntries => "journal_entries",
            Entity::FiscalYears => "fiscal_years",
            Entity::Distributions => "distributions",
            Entity::Payments => "payments",
            Entity::Invoices => "invoices",
            Entity::Documents => "documents",
            Entity::MaintenanceRequests => "maintenance_requests",
            Entity::Notifications => "notifications",
            Entity::UserRoles => "user_roles",
            Entity::Profiles => "profiles",
            Entity::AuditLogs => "audit_logs",
            Entity::AccountantKpis => "accountant_kpis",
            Entity::NazerKpis => "nazer_kpis",
            Entity::BeneficiaryStats => "beneficiary_stats",
        }
    }

    /// Derived dashboards are computed by stored procedures and have no table.
    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            Entity::AccountantKpis | Entity::NazerKpis | Entity::BeneficiaryStats
        )
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Entity {
    type Err = WaqfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Entity::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == wanted)
            .ok_or_else(|| WaqfError::UnknownEntity(s.to_string()))
    }
}

/// Kind of write performed against an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationAction {
    Create,
    Update,
    Delete,
    /// Journal entries and distributions move from draft to posted/approved.
    Approve,
}

impl fmt::Display for MutationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationAction::Create => write!(f, "create"),
            MutationAction::Update => write!(f, "update"),
            MutationAction::Delete => write!(f, "delete"),
            MutationAction::Approve => write!(f, "approve"),
        }
    }
}

impl std::str::FromStr for MutationAction {
    type Err = WaqfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" | "insert" => Ok(MutationAction::Create),
            "update" | "edit" => Ok(MutationAction::Update),
            "delete" | "remove" => Ok(MutationAction::Delete),
            "approve" | "post" => Ok(MutationAction::Approve),
            other => Err(WaqfError::UnknownAction(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Rtl,
    Ltr,
}

impl fmt::Display for TextDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextDirection::Rtl => write!(f, "rtl"),
            TextDirection::Ltr => write!(f, "ltr"),
        }
    }
}

impl std::str::FromStr for TextDirection {
    type Err = WaqfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rtl" => Ok(TextDirection::Rtl),
            "ltr" => Ok(TextDirection::Ltr),
            other => Err(WaqfError::UnknownDirection(other.to_string())),
        }
    }
}
