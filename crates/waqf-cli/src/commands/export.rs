use anyhow::{Context, Result};
use std::path::Path;

use waqf_export::{ColumnDef, ExportFormat, ExportOptions, rows_from_json};

use crate::context::AppContext;

pub fn run(
    base_dir: &Path,
    rows_path: &Path,
    columns: &str,
    format: Option<&str>,
    out: &Path,
    title: Option<&str>,
) -> Result<()> {
    let format = match format {
        Some(f) => f.parse::<ExportFormat>()?,
        None => ExportFormat::from_path(out)
            .with_context(|| format!("cannot infer format from {}; pass --format", out.display()))?,
    };

    let settings = match AppContext::load_config(base_dir) {
        Ok(config) => config.export,
        Err(e) => {
            tracing::debug!(error = %e, "no config, using default export settings");
            Default::default()
        }
    };
    let mut options = ExportOptions::from_settings(&settings)?;
    if let Some(title) = title {
        options = options.with_title(title);
    }

    let raw = std::fs::read_to_string(rows_path)
        .with_context(|| format!("reading {}", rows_path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", rows_path.display()))?;
    let rows = rows_from_json(&value)?;
    let columns = ColumnDef::parse_list(columns)?;

    let bytes = waqf_export::export(&rows, &columns, format, &options)?;
    std::fs::write(out, &bytes)?;

    println!(
        "Wrote {} rows as {} to {} ({} bytes)",
        rows.len(),
        format,
        out.display(),
        bytes.len()
    );
    Ok(())
}
