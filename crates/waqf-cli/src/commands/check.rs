use anyhow::Result;
use std::path::Path;

use waqf_auth::{PermissionDecision, PermissionGate};

use crate::context::AppContext;

fn label(decision: PermissionDecision) -> &'static str {
    match decision {
        PermissionDecision::Granted => "granted",
        PermissionDecision::Denied => "denied",
        PermissionDecision::Pending => "pending",
    }
}

pub async fn run(base_dir: &Path, user: &str, permissions: &[String], all: bool) -> Result<()> {
    let mut ctx = AppContext::open(base_dir).await?;
    let session = ctx.sign_in(user).await?;
    let resolver = session.resolver();

    println!("User:      {}", session.identity().email);
    if let Some(error) = resolver.error() {
        println!("Roles:     unavailable ({error}); every check is denied");
    } else {
        let roles: Vec<&str> = resolver.roles().iter().map(|r| r.as_str()).collect();
        println!("Roles:     {}", if roles.is_empty() { "none".to_string() } else { roles.join(", ") });
    }
    if let Some(primary) = resolver.primary_role() {
        println!("Dashboard: {}", primary.dashboard());
    }
    println!();

    for key in permissions {
        println!("  {:<28} {}", key, label(resolver.has_permission(key)));
    }

    let gate = PermissionGate::any_of(permissions).require_all(all);
    let mode = if all { "all of" } else { "any of" };
    println!();
    println!("Result ({mode}): {}", label(gate.decision(resolver)));

    ctx.sign_out();
    Ok(())
}
