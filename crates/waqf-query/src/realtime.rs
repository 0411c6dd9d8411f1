//! Explicit table -> prefixes mapping for the realtime change feed.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use waqf_core::{Entity, MutationAction};

use crate::cache::QueryCache;
use crate::invalidation::{InvalidationRules, MutationEvent};
use crate::keys::QueryKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    pub const ALL: [ChangeKind; 3] = [ChangeKind::Insert, ChangeKind::Update, ChangeKind::Delete];

    pub fn action(self) -> MutationAction {
        match self {
            ChangeKind::Insert => MutationAction::Create,
            ChangeKind::Update => MutationAction::Update,
            ChangeKind::Delete => MutationAction::Delete,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeKind::Insert => "INSERT",
            ChangeKind::Update => "UPDATE",
            ChangeKind::Delete => "DELETE",
        })
    }
}

/// One row change pushed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: String,
    #[serde(rename = "eventType")]
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(table: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            table: table.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RealtimeTable {
    handlers: HashMap<(String, ChangeKind), Vec<QueryKey>>,
}

impl RealtimeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// One handler per table-backed entity and change kind, using the same
    /// prefixes a local mutation of that kind would invalidate.
    pub fn from_rules(rules: &InvalidationRules) -> Self {
        let mut table = Self::new();
        for entity in Entity::ALL.iter().filter(|e| !e.is_derived()) {
            for kind in ChangeKind::ALL {
                let event = MutationEvent::new(*entity, kind.action());
                table = table.on(entity.as_str(), kind, rules.prefixes_for(&event));
            }
        }
        table
    }

    pub fn on(mut self, table: impl Into<String>, kind: ChangeKind, prefixes: Vec<QueryKey>) -> Self {
        self.handlers.insert((table.into(), kind), prefixes);
        self
    }

    pub fn prefixes_for(&self, event: &ChangeEvent) -> &[QueryKey] {
        self.handlers
            .get(&(event.table.clone(), event.kind))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Invalidate what `event` touches. Changes on unmapped tables are
    /// ignored. Returns the number of cache entries marked stale.
    pub fn apply(&self, cache: &QueryCache, event: &ChangeEvent) -> usize {
        let prefixes = self.prefixes_for(event);
        if prefixes.is_empty() {
            tracing::debug!(table = %event.table, kind = %event.kind, "no realtime handler");
            return 0;
        }
        prefixes.iter().map(|p| cache.invalidate(p)).sum()
    }

    /// Whether the change can alter the signed-in user's permissions.
    pub fn touches_roles(event: &ChangeEvent) -> bool {
        event.table == Entity::UserRoles.as_str()
    }
}
