use anyhow::Result;
use std::path::Path;

use waqf_auth::AppRole;
use waqf_auth::store::find_user;
use waqf_core::{Entity, MutationAction};
use waqf_query::MutationEvent;

use crate::context::AppContext;

pub async fn assign(base_dir: &Path, user: &str, role: &str, actor: Option<&str>) -> Result<()> {
    change(base_dir, user, role, actor, MutationAction::Create).await
}

pub async fn revoke(base_dir: &Path, user: &str, role: &str, actor: Option<&str>) -> Result<()> {
    change(base_dir, user, role, actor, MutationAction::Delete).await
}

async fn change(
    base_dir: &Path,
    user: &str,
    role: &str,
    actor: Option<&str>,
    action: MutationAction,
) -> Result<()> {
    let role: AppRole = role.parse()?;
    let mut ctx = AppContext::open(base_dir).await?;
    let actor_id = ctx.authorize(actor, "users.manage").await?;
    let target = find_user(ctx.store.as_ref(), user).await?;

    let store = ctx.store.clone();
    let event = MutationEvent::new(Entity::UserRoles, action);
    let audit_action = match action {
        MutationAction::Delete => "role.revoke",
        _ => "role.assign",
    };
    ctx.client
        .mutate(event, async {
            match action {
                MutationAction::Delete => store.revoke_role(&target.id, role).await,
                _ => store.assign_role(&target.id, role).await,
            }
        })
        .await?;
    ctx.store
        .log_audit(
            actor_id.as_deref(),
            audit_action,
            Some(&format!("{}:{}", target.id, role)),
        )
        .await?;

    match action {
        MutationAction::Delete => println!("Revoked {role} from {}", target.email),
        _ => println!("Assigned {role} to {}", target.email),
    }

    // Acting on yourself: show the permissions the change leaves you with.
    if ctx.session().is_some_and(|s| s.identity().user_id == target.id) {
        ctx.reload_session().await;
        if let Some(session) = ctx.session() {
            let resolver = session.resolver();
            let roles: Vec<&str> = resolver.roles().iter().map(|r| r.as_str()).collect();
            println!(
                "Your roles: {}",
                if roles.is_empty() { "none".to_string() } else { roles.join(", ") }
            );
            if !resolver.has_permission("users.manage").is_granted() {
                println!("You no longer hold users.manage.");
            }
        }
    }
    ctx.sign_out();
    Ok(())
}
