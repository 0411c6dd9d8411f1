//! Signed-in session: identity plus the role snapshot loaded at sign-in.
//!
//! A `Session` is created by [`Session::sign_in`], refreshed with
//! [`Session::reload_roles`] when a role change is observed, and torn down
//! by [`Session::sign_out`]. It is owned by the application's composition
//! root and passed explicitly to whatever needs permission checks.

use std::sync::Arc;

use crate::error::AuthError;
use crate::resolver::PermissionResolver;
use crate::roles::RoleCatalog;
use crate::store::RoleStore;
use crate::types::UserIdentity;

#[derive(Debug, Clone)]
pub struct Session {
    identity: UserIdentity,
    resolver: PermissionResolver,
    /// Incremented on every role reload.
    revision: u64,
}

impl Session {
    /// Start a session for an authenticated user and load their roles.
    ///
    /// A failed role fetch still yields a session; its resolver denies every
    /// permission and reports the failure.
    pub async fn sign_in(
        store: &dyn RoleStore,
        catalog: Arc<RoleCatalog>,
        identity: UserIdentity,
    ) -> Result<Self, AuthError> {
        let user = store.get_user(&identity.user_id).await?;
        if !user.is_active {
            return Err(AuthError::Unauthenticated);
        }
        let resolver = load_resolver(store, catalog, &identity.user_id).await;
        tracing::info!(user = %identity.email, roles = ?resolver.roles(), "signed in");
        Ok(Self {
            identity,
            resolver,
            revision: 0,
        })
    }

    /// A session whose roles are still being fetched.
    pub fn pending(catalog: Arc<RoleCatalog>, identity: UserIdentity) -> Self {
        Self {
            identity,
            resolver: PermissionResolver::loading(catalog),
            revision: 0,
        }
    }

    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Refetch roles after an assignment change; replaces the snapshot.
    pub async fn reload_roles(&mut self, store: &dyn RoleStore) {
        let catalog = self.resolver.catalog().clone();
        self.resolver = load_resolver(store, catalog, &self.identity.user_id).await;
        self.revision += 1;
        tracing::debug!(
            user = %self.identity.email,
            revision = self.revision,
            "reloaded roles"
        );
    }

    /// End the session. Consumes it so no stale permissions survive.
    pub fn sign_out(self) -> UserIdentity {
        tracing::info!(user = %self.identity.email, "signed out");
        self.identity
    }
}

async fn load_resolver(
    store: &dyn RoleStore,
    catalog: Arc<RoleCatalog>,
    user_id: &str,
) -> PermissionResolver {
    match store.list_user_roles(user_id).await {
        Ok(roles) => PermissionResolver::from_roles(catalog, &roles),
        Err(e) => PermissionResolver::failed(catalog, e.to_string()),
    }
}
