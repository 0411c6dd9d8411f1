use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::permissions::default_registry;

/// Fixed role names. Ordered by dashboard priority, highest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AppRole {
    /// Supervisor of the endowment.
    Nazer,
    Admin,
    Accountant,
    Cashier,
    Archivist,
    WaqfHeir,
    Beneficiary,
    User,
}

impl AppRole {
    pub const ALL: &'static [AppRole] = &[
        AppRole::Nazer,
        AppRole::Admin,
        AppRole::Accountant,
        AppRole::Cashier,
        AppRole::Archivist,
        AppRole::WaqfHeir,
        AppRole::Beneficiary,
        AppRole::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppRole::Nazer => "nazer",
            AppRole::Admin => "admin",
            AppRole::Accountant => "accountant",
            AppRole::Cashier => "cashier",
            AppRole::Archivist => "archivist",
            AppRole::WaqfHeir => "waqf_heir",
            AppRole::Beneficiary => "beneficiary",
            AppRole::User => "user",
        }
    }

    /// Route of the dashboard shown to a user whose primary role is `self`.
    pub fn dashboard(&self) -> &'static str {
        match self {
            AppRole::Nazer => "/nazer-dashboard",
            AppRole::Admin => "/admin-dashboard",
            AppRole::Accountant => "/accountant-dashboard",
            AppRole::Cashier => "/cashier-dashboard",
            AppRole::Archivist => "/archivist-dashboard",
            AppRole::WaqfHeir | AppRole::Beneficiary => "/beneficiary-portal",
            AppRole::User => "/dashboard",
        }
    }
}

impl fmt::Display for AppRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AppRole {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        AppRole::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == wanted)
            .ok_or_else(|| AuthError::UnknownRole(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub role: AppRole,
    pub display_name: String,
    /// Ordered as declared; duplicates are harmless.
    pub permissions: Vec<String>,
}

const NAZER_PERMISSIONS: &[&str] = &["*"];

const ADMIN_PERMISSIONS: &[&str] = &[
    "dashboard.view",
    "beneficiaries.*",
    "requests.*",
    "properties.*",
    "contracts.*",
    "tenants.*",
    "accounts.view",
    "journal.view",
    "distributions.view",
    "payments.view",
    "invoices.view",
    "documents.*",
    "maintenance.*",
    "reports.*",
    "users.*",
    "audit.view",
    "settings.manage",
];

const ACCOUNTANT_PERMISSIONS: &[&str] = &[
    "dashboard.view",
    "beneficiaries.view",
    "properties.view",
    "contracts.view",
    "tenants.view",
    "accounts.*",
    "journal.view",
    "journal.create",
    "journal.update",
    "journal.approve",
    "fiscal_years.manage",
    "distributions.view",
    "distributions.create",
    "payments.*",
    "invoices.*",
    "reports.*",
];

const CASHIER_PERMISSIONS: &[&str] = &[
    "dashboard.view",
    "beneficiaries.view",
    "contracts.view",
    "tenants.view",
    "payments.view",
    "payments.create",
    "invoices.view",
    "reports.view",
];

const ARCHIVIST_PERMISSIONS: &[&str] = &[
    "dashboard.view",
    "beneficiaries.view",
    "properties.view",
    "contracts.view",
    "documents.*",
    "reports.view",
];

const WAQF_HEIR_PERMISSIONS: &[&str] = &[
    "dashboard.view",
    "beneficiaries.view_own",
    "requests.view",
    "requests.create",
    "distributions.view",
    "properties.view",
    "reports.view",
];

const BENEFICIARY_PERMISSIONS: &[&str] = &[
    "dashboard.view",
    "beneficiaries.view_own",
    "requests.view",
    "requests.create",
];

const USER_PERMISSIONS: &[&str] = &["dashboard.view"];

fn default_definition(role: AppRole) -> RoleDefinition {
    let (display_name, perms): (&str, &[&str]) = match role {
        AppRole::Nazer => ("الناظر", NAZER_PERMISSIONS),
        AppRole::Admin => ("المشرف", ADMIN_PERMISSIONS),
        AppRole::Accountant => ("المحاسب", ACCOUNTANT_PERMISSIONS),
        AppRole::Cashier => ("أمين الصندوق", CASHIER_PERMISSIONS),
        AppRole::Archivist => ("الأرشيفي", ARCHIVIST_PERMISSIONS),
        AppRole::WaqfHeir => ("وريث الوقف", WAQF_HEIR_PERMISSIONS),
        AppRole::Beneficiary => ("المستفيد", BENEFICIARY_PERMISSIONS),
        AppRole::User => ("مستخدم", USER_PERMISSIONS),
    };
    RoleDefinition {
        role,
        display_name: display_name.to_string(),
        permissions: perms.iter().map(|p| p.to_string()).collect(),
    }
}

/// Static role configuration: what each role grants, and which keys exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleCatalog {
    registry: BTreeSet<String>,
    roles: BTreeMap<AppRole, RoleDefinition>,
}

impl Default for RoleCatalog {
    fn default() -> Self {
        Self {
            registry: default_registry(),
            roles: AppRole::ALL
                .iter()
                .map(|r| (*r, default_definition(*r)))
                .collect(),
        }
    }
}

impl RoleCatalog {
    /// A catalog with an explicit key registry and role list. Roles absent
    /// from `roles` grant nothing.
    pub fn new<I, S>(registry: I, roles: Vec<RoleDefinition>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            registry: registry.into_iter().map(Into::into).collect(),
            roles: roles.into_iter().map(|d| (d.role, d)).collect(),
        }
    }

    pub fn registry(&self) -> &BTreeSet<String> {
        &self.registry
    }

    pub fn definition(&self, role: AppRole) -> Option<&RoleDefinition> {
        self.roles.get(&role)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &RoleDefinition> {
        self.roles.values()
    }

    /// Union of the grants of every role in `roles`.
    pub fn effective_grants(&self, roles: &[AppRole]) -> BTreeSet<String> {
        roles
            .iter()
            .filter_map(|r| self.roles.get(r))
            .flat_map(|d| d.permissions.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_roundtrip() {
        for role in AppRole::ALL {
            assert_eq!(role.as_str().parse::<AppRole>().unwrap(), *role);
        }
        assert_eq!("Waqf-Heir".parse::<AppRole>().unwrap(), AppRole::WaqfHeir);
        assert!(matches!(
            "caliph".parse::<AppRole>(),
            Err(AuthError::UnknownRole(_))
        ));
    }

    #[test]
    fn default_catalog_covers_every_role() {
        let catalog = RoleCatalog::default();
        for role in AppRole::ALL {
            assert!(catalog.definition(*role).is_some(), "{role} missing");
        }
    }

    #[test]
    fn default_grants_reference_registered_categories() {
        let catalog = RoleCatalog::default();
        for def in catalog.definitions() {
            for grant in &def.permissions {
                if grant == "*" {
                    continue;
                }
                let covered = catalog
                    .registry()
                    .iter()
                    .any(|k| crate::permissions::grant_covers(grant, k));
                assert!(covered, "{} grants unknown {grant}", def.role);
            }
        }
    }

    #[test]
    fn union_of_roles() {
        let catalog = RoleCatalog::default();
        let grants = catalog.effective_grants(&[AppRole::Cashier, AppRole::Archivist]);
        assert!(grants.contains("payments.create"));
        assert!(grants.contains("documents.*"));
    }

    #[test]
    fn priority_follows_declaration_order() {
        assert!(AppRole::Nazer < AppRole::Accountant);
        assert!(AppRole::Accountant < AppRole::Beneficiary);
    }
}
