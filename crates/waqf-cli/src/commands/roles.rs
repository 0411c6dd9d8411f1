use anyhow::Result;

use waqf_auth::RoleCatalog;

pub fn run() -> Result<()> {
    let catalog = RoleCatalog::default();

    println!("{:<14} {:<16} {:<24} PERMISSIONS", "ROLE", "NAME", "DASHBOARD");
    println!("{}", "-".repeat(100));

    for def in catalog.definitions() {
        println!(
            "{:<14} {:<16} {:<24} {}",
            def.role.as_str(),
            def.display_name,
            def.role.dashboard(),
            def.permissions.join(", "),
        );
    }

    Ok(())
}
