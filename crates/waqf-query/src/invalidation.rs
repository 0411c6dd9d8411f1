use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use waqf_core::{Entity, MutationAction, WaqfError};

use crate::keys::QueryKey;
use crate::registry::QueryKeys;

/// A successful write of `action` against `entity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MutationEvent {
    pub entity: Entity,
    pub action: MutationAction,
}

impl MutationEvent {
    pub fn new(entity: Entity, action: MutationAction) -> Self {
        Self { entity, action }
    }
}

impl fmt::Display for MutationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity, self.action)
    }
}

impl std::str::FromStr for MutationEvent {
    type Err = WaqfError;

    /// Parses `entity.action`, e.g. `journal_entries.create`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (entity, action) = s
            .rsplit_once('.')
            .ok_or_else(|| WaqfError::UnknownAction(s.to_string()))?;
        Ok(Self {
            entity: entity.parse()?,
            action: action.parse()?,
        })
    }
}

use Entity::*;
use MutationAction::*;

const LEDGER: &[Entity] = &[JournalEntries, Accounts, AccountantKpis, NazerKpis];

/// Default rule table: event -> collections whose cached results go stale.
const DEFAULT_RULES: &[(Entity, &[MutationAction], &[Entity])] = &[
    (JournalEntries, &[Create, Update, Delete], &[JournalEntries, AccountantKpis]),
    (JournalEntries, &[Approve], LEDGER),
    (Accounts, &[Create, Update, Delete], &[Accounts, AccountantKpis]),
    (FiscalYears, &[Create, Update, Approve], &[FiscalYears, JournalEntries, AccountantKpis]),
    (
        Payments,
        &[Create, Update, Delete, Approve],
        &[Payments, Invoices, JournalEntries, Accounts, AccountantKpis, NazerKpis],
    ),
    (Invoices, &[Create, Update, Delete], &[Invoices, Payments, AccountantKpis]),
    (
        Distributions,
        &[Create, Update, Delete],
        &[Distributions, NazerKpis],
    ),
    (
        Distributions,
        &[Approve],
        &[
            Distributions,
            Payments,
            JournalEntries,
            Accounts,
            BeneficiaryStats,
            AccountantKpis,
            NazerKpis,
        ],
    ),
    (
        Beneficiaries,
        &[Create, Update, Delete],
        &[Beneficiaries, BeneficiaryStats, NazerKpis],
    ),
    (BeneficiaryRequests, &[Create, Update, Delete], &[BeneficiaryRequests, BeneficiaryStats]),
    (
        BeneficiaryRequests,
        &[Approve],
        &[BeneficiaryRequests, Beneficiaries, BeneficiaryStats, Notifications],
    ),
    (
        Properties,
        &[Create, Update, Delete],
        &[Properties, PropertyUnits, NazerKpis],
    ),
    (PropertyUnits, &[Create, Update, Delete], &[PropertyUnits, Properties]),
    (
        Contracts,
        &[Create, Update, Delete, Approve],
        &[Contracts, Properties, PropertyUnits, Tenants, NazerKpis],
    ),
    (Tenants, &[Create, Update, Delete], &[Tenants, Contracts]),
    (Documents, &[Create, Update, Delete], &[Documents]),
    (
        MaintenanceRequests,
        &[Create, Update, Delete, Approve],
        &[MaintenanceRequests, Properties],
    ),
    (Notifications, &[Create, Update, Delete], &[Notifications]),
    (UserRoles, &[Create, Update, Delete], &[UserRoles, Profiles]),
    (Profiles, &[Create, Update, Delete], &[Profiles, UserRoles]),
];

/// Mutation event -> query-key prefixes to invalidate after it succeeds.
///
/// Events without a rule invalidate their own collection.
#[derive(Debug, Clone)]
pub struct InvalidationRules {
    rules: HashMap<MutationEvent, Vec<QueryKey>>,
}

impl Default for InvalidationRules {
    fn default() -> Self {
        let mut rules = HashMap::new();
        for (entity, actions, targets) in DEFAULT_RULES {
            for action in *actions {
                let prefixes = targets.iter().map(|t| QueryKeys::all(*t)).collect();
                rules.insert(MutationEvent::new(*entity, *action), prefixes);
            }
        }
        Self { rules }
    }
}

impl InvalidationRules {
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Replace the prefixes for one event.
    pub fn with_rule(mut self, event: MutationEvent, prefixes: Vec<QueryKey>) -> Self {
        self.rules.insert(event, prefixes);
        self
    }

    pub fn has_rule(&self, event: &MutationEvent) -> bool {
        self.rules.contains_key(event)
    }

    pub fn prefixes_for(&self, event: &MutationEvent) -> Vec<QueryKey> {
        match self.rules.get(event) {
            Some(prefixes) => prefixes.clone(),
            None => vec![QueryKeys::all(event.entity)],
        }
    }

    pub fn events(&self) -> impl Iterator<Item = &MutationEvent> {
        self.rules.keys()
    }
}
