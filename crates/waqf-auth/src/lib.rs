pub mod error;
pub mod gate;
pub mod permissions;
pub mod resolver;
pub mod roles;
pub mod session;
pub mod store;
pub mod types;

pub use error::AuthError;
pub use gate::{GateOutcome, PermissionGate};
pub use permissions::{has_permission, is_registered, PERMISSIONS};
pub use resolver::{PermissionDecision, PermissionResolver, PermissionState};
pub use roles::{AppRole, RoleCatalog, RoleDefinition};
pub use session::Session;
pub use store::{RoleStore, SqliteRoleStore};
pub use types::*;
