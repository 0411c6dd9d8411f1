use anyhow::{Context, Result, bail};
use std::path::Path;

use serde_json::Value;
use waqf_core::Entity;
use waqf_query::{FilterSet, QueryKeys, StalePolicy};

use crate::context::AppContext;

pub fn run(base_dir: &Path, root: &str, id: Option<&str>, filters: Option<&str>) -> Result<()> {
    let entity: Entity = root.parse()?;
    let mut key = QueryKeys::all(entity);
    if let Some(id) = id {
        key = key.with(id);
    }
    if let Some(raw) = filters {
        let value: Value = serde_json::from_str(raw).context("parsing --filters")?;
        let Value::Object(map) = value else {
            bail!("--filters must be a JSON object");
        };
        key = key.with_filters(FilterSet::from_map(&map));
    }

    let policy = match AppContext::load_config(base_dir) {
        Ok(config) => StalePolicy::from_config(&config),
        Err(e) => {
            tracing::debug!(error = %e, "no config, using default stale time");
            StalePolicy::default()
        }
    };

    println!("{key}");
    println!("stale after {}s", policy.stale_time_for(&key).as_secs());
    Ok(())
}
