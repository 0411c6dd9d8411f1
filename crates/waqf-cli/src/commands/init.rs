use anyhow::Result;
use std::path::Path;

use waqf_auth::{RoleStore, SqliteRoleStore};
use waqf_core::config::WaqfConfig;

pub async fn run(base_dir: &Path) -> Result<()> {
    println!("Initializing waqf in {}", base_dir.display());

    std::fs::create_dir_all(base_dir)?;

    let config_path = WaqfConfig::default_path(base_dir);
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
    } else {
        let config = WaqfConfig::default_config(base_dir);
        config.save(&config_path)?;
        println!("Created config: {}", config_path.display());
    }

    let config = WaqfConfig::load(&config_path)?;

    let store = SqliteRoleStore::open(&config.waqf.db_path)?;
    store.migrate().await?;
    println!("Initialized role database: {}", config.waqf.db_path);

    println!("\nNext steps:");
    println!("  1. Run `waqf user add <email>` to register a user");
    println!("  2. Run `waqf role assign <email> nazer` to grant full access");

    Ok(())
}
