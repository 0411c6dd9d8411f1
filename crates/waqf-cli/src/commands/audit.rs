use anyhow::Result;
use std::path::Path;

use crate::context::AppContext;

pub async fn run(base_dir: &Path, limit: u32) -> Result<()> {
    let ctx = AppContext::open(base_dir).await?;
    let entries = ctx.store.list_audit(limit, 0).await?;

    if entries.is_empty() {
        println!("No audit entries.");
        return Ok(());
    }

    println!("{:<26} {:<14} {:<38} TARGET", "WHEN", "ACTION", "ACTOR");
    println!("{}", "-".repeat(110));

    for e in &entries {
        println!(
            "{:<26} {:<14} {:<38} {}",
            e.created_at,
            e.action,
            e.actor_id.as_deref().unwrap_or("local"),
            e.target.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}
