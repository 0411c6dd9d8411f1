use anyhow::Result;
use std::path::Path;

use waqf_core::config::WaqfConfig;

use crate::context::AppContext;

pub fn run(base_dir: &Path) -> Result<()> {
    let config = AppContext::load_config(base_dir)?;

    println!("Config: {}", WaqfConfig::default_path(base_dir).display());
    println!();
    println!("  DB path:        {}", config.waqf.db_path);
    println!("  Stale after:    {}s", config.waqf.default_stale_secs);
    for (root, secs) in &config.stale_overrides {
        println!("    {root:<20} {secs}s");
    }
    println!();
    println!("  Export title:   {}", config.export.title);
    println!("  Direction:      {}", config.export.direction);
    println!("  Page:           {:?}", config.export.page);
    println!("  CSV BOM:        {}", config.export.csv_bom);
    match &config.export.font_path {
        Some(path) => println!("  PDF font:       {path}"),
        None => println!("  PDF font:       built-in (no Arabic glyphs)"),
    }

    Ok(())
}
