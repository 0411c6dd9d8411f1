//! Composition root: role catalog, role store, query client and the
//! signed-in session, wired once per command from the loaded config.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use waqf_auth::store::find_user;
use waqf_auth::{RoleCatalog, RoleStore, Session, SqliteRoleStore, UserIdentity};
use waqf_core::config::WaqfConfig;
use waqf_query::{
    ChangeEvent, InvalidationRules, QueryCache, QueryClient, RealtimeTable, StalePolicy,
};

pub struct AppContext {
    pub catalog: Arc<RoleCatalog>,
    pub store: Arc<dyn RoleStore>,
    pub client: QueryClient,
    realtime: RealtimeTable,
    session: Option<Session>,
}

impl AppContext {
    pub fn load_config(base_dir: &Path) -> Result<WaqfConfig> {
        let path = WaqfConfig::default_path(base_dir);
        WaqfConfig::load(&path)
            .with_context(|| format!("loading {} (run `waqf init` first?)", path.display()))
    }

    pub async fn open(base_dir: &Path) -> Result<Self> {
        let config = Self::load_config(base_dir)?;
        let store = SqliteRoleStore::open(&config.waqf.db_path)
            .with_context(|| format!("opening role database {}", config.waqf.db_path))?;
        store.migrate().await?;
        Ok(Self::with_store(&config, Arc::new(store)))
    }

    pub fn with_store(config: &WaqfConfig, store: Arc<dyn RoleStore>) -> Self {
        let rules = InvalidationRules::default();
        let realtime = RealtimeTable::from_rules(&rules);
        let client = QueryClient::new(
            Arc::new(QueryCache::new()),
            rules,
            StalePolicy::from_config(config),
        );
        Self {
            catalog: Arc::new(RoleCatalog::default()),
            store,
            client,
            realtime,
            session: None,
        }
    }

    /// Sign in as `reference` (id or email), replacing any current session.
    pub async fn sign_in(&mut self, reference: &str) -> Result<&Session> {
        self.sign_out();
        let user = find_user(self.store.as_ref(), reference)
            .await
            .with_context(|| format!("looking up user {reference}"))?;
        let session =
            Session::sign_in(self.store.as_ref(), self.catalog.clone(), UserIdentity::from(&user))
                .await?;
        Ok(self.session.insert(session))
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Refetch the signed-in user's roles after an assignment change.
    pub async fn reload_session(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.reload_roles(self.store.as_ref()).await;
            tracing::info!(
                user = %session.identity().email,
                roles = ?session.resolver().roles(),
                "session roles reloaded"
            );
        }
    }

    /// Apply a row change pushed by the backend: mark the affected cache
    /// entries stale and, for role assignment changes, refetch the signed-in
    /// user's roles. Returns the number of entries marked.
    pub async fn apply_change(&mut self, event: &ChangeEvent) -> usize {
        let marked = self.realtime.apply(self.client.cache(), event);
        if RealtimeTable::touches_roles(event) {
            self.reload_session().await;
        }
        marked
    }

    /// Drop the session and everything cached on its behalf.
    pub fn sign_out(&mut self) -> Option<UserIdentity> {
        let identity = self.session.take().map(Session::sign_out);
        if identity.is_some() {
            self.client.reset();
        }
        identity
    }

    /// Sign in as the acting user and require `permission`. Returns the
    /// actor's id for the audit log, or `None` for the local operator.
    pub async fn authorize(&mut self, actor: Option<&str>, permission: &str) -> Result<Option<String>> {
        let Some(actor) = actor else {
            return Ok(None);
        };
        let session = self.sign_in(actor).await?;
        let decision = session.resolver().has_permission(permission);
        if !decision.is_granted() {
            if let Some(error) = session.resolver().error() {
                bail!("{actor}: could not load roles ({error})");
            }
            bail!("{actor} lacks permission {permission}");
        }
        Ok(Some(session.identity().user_id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use waqf_auth::{AppRole, CreateUserRequest};
    use waqf_query::{ChangeKind, QueryKeys};

    async fn context() -> (AppContext, String) {
        let store = SqliteRoleStore::open_in_memory().unwrap();
        store.migrate().await.unwrap();
        let user = store
            .create_user(&CreateUserRequest {
                email: "nazer@waqf.test".into(),
                full_name: None,
            })
            .await
            .unwrap();
        let config = WaqfConfig::default_config(Path::new("/tmp/waqf-test"));
        (AppContext::with_store(&config, Arc::new(store)), user.id)
    }

    #[tokio::test]
    async fn sign_out_clears_cache() {
        let (mut ctx, _) = context().await;
        ctx.sign_in("nazer@waqf.test").await.unwrap();
        let ticket = ctx.client.cache().begin_fetch(&QueryKeys::accounts());
        assert!(ctx.client.cache().resolve(ticket, Arc::new(json!([]))));

        assert!(ctx.sign_out().is_some());
        assert!(ctx.client.cache().is_empty());
        assert!(ctx.session().is_none());
    }

    #[tokio::test]
    async fn authorize_requires_permission() {
        let (mut ctx, user_id) = context().await;
        assert!(ctx.authorize(Some(&user_id), "users.manage").await.is_err());

        ctx.store.assign_role(&user_id, AppRole::Nazer).await.unwrap();
        let actor = ctx.authorize(Some(&user_id), "users.manage").await.unwrap();
        assert_eq!(actor.as_deref(), Some(user_id.as_str()));
    }

    #[tokio::test]
    async fn local_operator_is_not_checked() {
        let (mut ctx, _) = context().await;
        assert_eq!(ctx.authorize(None, "users.manage").await.unwrap(), None);
    }

    #[tokio::test]
    async fn role_change_event_reloads_session() {
        let (mut ctx, user_id) = context().await;
        ctx.sign_in(&user_id).await.unwrap();
        let before = ctx.session().unwrap().revision();
        assert!(!ctx.session().unwrap().resolver().has_permission("users.manage").is_granted());

        let roles_key = QueryKeys::user_roles(&user_id);
        let ticket = ctx.client.cache().begin_fetch(&roles_key);
        assert!(ctx.client.cache().resolve(ticket, Arc::new(json!([]))));

        // Assigned by another client; only the change feed tells us.
        ctx.store.assign_role(&user_id, AppRole::Nazer).await.unwrap();
        let marked = ctx
            .apply_change(&ChangeEvent::new("user_roles", ChangeKind::Insert))
            .await;

        let session = ctx.session().unwrap();
        assert!(session.revision() > before);
        assert!(session.resolver().has_permission("users.manage").is_granted());
        assert_eq!(marked, 1);
        assert!(ctx.client.cache().get(&roles_key).unwrap().invalidated);
    }

    #[tokio::test]
    async fn other_table_changes_keep_session() {
        let (mut ctx, user_id) = context().await;
        ctx.sign_in(&user_id).await.unwrap();
        let before = ctx.session().unwrap().revision();
        ctx.apply_change(&ChangeEvent::new("journal_entries", ChangeKind::Update))
            .await;
        assert_eq!(ctx.session().unwrap().revision(), before);
    }

    #[test]
    fn stale_policy_comes_from_config() {
        let config = WaqfConfig::default_config(Path::new("/tmp/waqf-test"));
        let store = SqliteRoleStore::open_in_memory().unwrap();
        let ctx = AppContext::with_store(&config, Arc::new(store));
        assert_eq!(
            ctx.client.stale_policy().stale_time_for(&QueryKeys::accountant_kpis()),
            std::time::Duration::from_secs(60)
        );
    }
}
