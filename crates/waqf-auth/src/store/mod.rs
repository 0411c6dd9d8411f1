pub mod sqlite;

pub use sqlite::SqliteRoleStore;

use async_trait::async_trait;

use crate::error::AuthError;
use crate::roles::AppRole;
use crate::types::*;

/// Users and their role assignments, as held by the backend.
#[async_trait]
pub trait RoleStore: Send + Sync {
    // Users
    async fn create_user(&self, req: &CreateUserRequest) -> Result<User, AuthError>;
    async fn get_user(&self, id: &str) -> Result<User, AuthError>;
    async fn get_user_by_email(&self, email: &str) -> Result<User, AuthError>;
    async fn list_users(&self) -> Result<Vec<User>, AuthError>;
    async fn update_user(&self, id: &str, req: &UpdateUserRequest) -> Result<User, AuthError>;
    async fn delete_user(&self, id: &str) -> Result<(), AuthError>;

    // User-Role
    async fn assign_role(&self, user_id: &str, role: AppRole) -> Result<(), AuthError>;
    async fn revoke_role(&self, user_id: &str, role: AppRole) -> Result<(), AuthError>;
    async fn list_user_roles(&self, user_id: &str) -> Result<Vec<AppRole>, AuthError>;
    async fn list_assignments(&self) -> Result<Vec<RoleAssignment>, AuthError>;

    // Audit
    async fn log_audit(
        &self,
        actor_id: Option<&str>,
        action: &str,
        target: Option<&str>,
    ) -> Result<(), AuthError>;
    async fn list_audit(&self, limit: u32, offset: u32) -> Result<Vec<AuditEntry>, AuthError>;

    // Lifecycle
    async fn migrate(&self) -> Result<(), AuthError>;
}

/// Resolve a user reference given as either an id or an email address.
pub async fn find_user(store: &dyn RoleStore, reference: &str) -> Result<User, AuthError> {
    if reference.contains('@') {
        store.get_user_by_email(reference).await
    } else {
        store.get_user(reference).await
    }
}
