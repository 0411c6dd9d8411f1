use anyhow::Result;
use std::path::Path;

use waqf_auth::CreateUserRequest;

use crate::context::AppContext;

pub async fn add(base_dir: &Path, email: &str, name: Option<&str>, actor: Option<&str>) -> Result<()> {
    let mut ctx = AppContext::open(base_dir).await?;
    let actor_id = ctx.authorize(actor, "users.manage").await?;

    let user = ctx
        .store
        .create_user(&CreateUserRequest {
            email: email.to_string(),
            full_name: name.map(str::to_string),
        })
        .await?;
    ctx.store
        .log_audit(actor_id.as_deref(), "user.create", Some(&user.id))
        .await?;
    ctx.sign_out();

    println!("Created user {} ({})", user.email, user.id);
    Ok(())
}

pub async fn list(base_dir: &Path) -> Result<()> {
    let ctx = AppContext::open(base_dir).await?;
    let users = ctx.store.list_users().await?;

    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    println!("{:<38} {:<32} {:<8} ROLES", "ID", "EMAIL", "ACTIVE");
    println!("{}", "-".repeat(100));

    for user in &users {
        let roles = ctx.store.list_user_roles(&user.id).await?;
        let roles: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
        println!(
            "{:<38} {:<32} {:<8} {}",
            user.id,
            user.email,
            if user.is_active { "yes" } else { "no" },
            roles.join(", "),
        );
    }

    Ok(())
}
