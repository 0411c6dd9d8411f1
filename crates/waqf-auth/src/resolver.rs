//! Role/permission resolution for the signed-in user.
//!
//! A resolver is a snapshot: it is built from already-fetched role data and
//! every query is a pure function of that snapshot and the requested key.
//! Reloading roles produces a new resolver.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::permissions::has_permission;
use crate::roles::{AppRole, RoleCatalog};

/// Outcome of a permission query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    /// Role data has not finished loading.
    Pending,
    Granted,
    Denied,
}

impl PermissionDecision {
    /// Only `Granted` is true; pending never grants.
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionDecision::Granted)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, PermissionDecision::Pending)
    }
}

impl From<bool> for PermissionDecision {
    fn from(granted: bool) -> Self {
        if granted {
            PermissionDecision::Granted
        } else {
            PermissionDecision::Denied
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionState {
    Loading,
    Ready {
        roles: Vec<AppRole>,
        grants: BTreeSet<String>,
    },
    /// The role fetch failed; every check is denied.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct PermissionResolver {
    catalog: Arc<RoleCatalog>,
    state: PermissionState,
}

impl PermissionResolver {
    pub fn loading(catalog: Arc<RoleCatalog>) -> Self {
        Self {
            catalog,
            state: PermissionState::Loading,
        }
    }

    pub fn from_roles(catalog: Arc<RoleCatalog>, roles: &[AppRole]) -> Self {
        let mut roles = roles.to_vec();
        roles.sort();
        roles.dedup();
        let grants = catalog.effective_grants(&roles);
        tracing::debug!(?roles, grants = grants.len(), "resolved permissions");
        Self {
            catalog,
            state: PermissionState::Ready { roles, grants },
        }
    }

    pub fn failed(catalog: Arc<RoleCatalog>, error: impl Into<String>) -> Self {
        let error = error.into();
        tracing::warn!(%error, "role fetch failed, denying all permissions");
        Self {
            catalog,
            state: PermissionState::Failed(error),
        }
    }

    pub fn state(&self) -> &PermissionState {
        &self.state
    }

    pub fn catalog(&self) -> &Arc<RoleCatalog> {
        &self.catalog
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, PermissionState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            PermissionState::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Assigned roles, sorted by priority. Empty unless loaded.
    pub fn roles(&self) -> &[AppRole] {
        match &self.state {
            PermissionState::Ready { roles, .. } => roles,
            _ => &[],
        }
    }

    pub fn has_role(&self, role: AppRole) -> bool {
        self.roles().contains(&role)
    }

    /// Highest-priority assigned role; selects the dashboard.
    pub fn primary_role(&self) -> Option<AppRole> {
        self.roles().first().copied()
    }

    /// Registered keys the user holds, with wildcards expanded.
    pub fn permissions(&self) -> BTreeSet<String> {
        match &self.state {
            PermissionState::Ready { grants, .. } => self
                .catalog
                .registry()
                .iter()
                .filter(|k| has_permission(self.catalog.registry(), grants, k))
                .cloned()
                .collect(),
            _ => BTreeSet::new(),
        }
    }

    pub fn has_permission(&self, key: &str) -> PermissionDecision {
        match &self.state {
            PermissionState::Loading => PermissionDecision::Pending,
            PermissionState::Failed(_) => PermissionDecision::Denied,
            PermissionState::Ready { grants, .. } => {
                has_permission(self.catalog.registry(), grants, key).into()
            }
        }
    }

    /// Granted iff at least one key is granted. An empty list is denied.
    pub fn has_any_permission<S: AsRef<str>>(&self, keys: &[S]) -> PermissionDecision {
        if self.is_loading() {
            return PermissionDecision::Pending;
        }
        keys.iter()
            .any(|k| self.has_permission(k.as_ref()).is_granted())
            .into()
    }

    /// Granted iff every key is granted. An empty list is denied.
    pub fn has_all_permissions<S: AsRef<str>>(&self, keys: &[S]) -> PermissionDecision {
        if self.is_loading() {
            return PermissionDecision::Pending;
        }
        (!keys.is_empty()
            && keys
                .iter()
                .all(|k| self.has_permission(k.as_ref()).is_granted()))
        .into()
    }
}
