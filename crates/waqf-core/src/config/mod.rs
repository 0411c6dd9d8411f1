use crate::error::{Result, WaqfError};
use crate::types::TextDirection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration stored as TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaqfConfig {
    pub waqf: WaqfSettings,
    /// Per query-root stale times in seconds, e.g. `accountant_kpis = 60`.
    #[serde(default)]
    pub stale_overrides: BTreeMap<String, u64>,
    #[serde(default)]
    pub export: ExportSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaqfSettings {
    /// Path to the SQLite database holding users and role assignments.
    pub db_path: String,
    /// How long a fetched result is served from cache before refetching.
    #[serde(default = "default_stale_secs")]
    pub default_stale_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Title printed at the top of PDF reports.
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub direction: TextDirection,
    /// TrueType font embedded in PDF reports. Required for Arabic glyphs.
    #[serde(default)]
    pub font_path: Option<String>,
    /// Prefix CSV output with a UTF-8 byte order mark.
    #[serde(default = "default_csv_bom")]
    pub csv_bom: bool,
    #[serde(default)]
    pub page: PageLayout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageLayout {
    A4Portrait,
    #[default]
    A4Landscape,
}

impl PageLayout {
    /// Page size in millimetres as (width, height).
    pub fn size_mm(&self) -> (f32, f32) {
        match self {
            PageLayout::A4Portrait => (210.0, 297.0),
            PageLayout::A4Landscape => (297.0, 210.0),
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            direction: TextDirection::default(),
            font_path: None,
            csv_bom: default_csv_bom(),
            page: PageLayout::default(),
        }
    }
}

fn default_stale_secs() -> u64 {
    30
}

fn default_title() -> String {
    "تقرير الوقف".to_string()
}

fn default_csv_bom() -> bool {
    true
}

impl WaqfSettings {
    pub fn default_stale_time(&self) -> Duration {
        Duration::from_secs(self.default_stale_secs)
    }
}

impl WaqfConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(WaqfError::ConfigNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        tracing::debug!("loading config from {}", path.display());
        toml::from_str(&content).map_err(|e| WaqfError::TomlDe(e.to_string()))
    }

    /// Save config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| WaqfError::TomlSer(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default config for `waqf init`.
    pub fn default_config(base_dir: &Path) -> Self {
        let mut stale_overrides = BTreeMap::new();
        stale_overrides.insert("accountant_kpis".to_string(), 60);
        stale_overrides.insert("nazer_kpis".to_string(), 60);
        stale_overrides.insert("notifications".to_string(), 10);
        Self {
            waqf: WaqfSettings {
                db_path: base_dir.join("waqf.db").display().to_string(),
                default_stale_secs: default_stale_secs(),
            },
            stale_overrides,
            export: ExportSettings::default(),
        }
    }

    /// Resolve the config file path: `<base_dir>/waqf.toml`
    pub fn default_path(base_dir: &Path) -> PathBuf {
        base_dir.join("waqf.toml")
    }

    /// Resolve the default home directory: `~/.waqf`
    pub fn default_base_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|h| h.join(".waqf"))
            .ok_or_else(|| WaqfError::Config("Cannot determine home directory".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn roundtrip_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("waqf.toml");
        let config = WaqfConfig::default_config(tmp.path());
        config.save(&path).unwrap();
        let loaded = WaqfConfig::load(&path).unwrap();
        assert_eq!(loaded.waqf.default_stale_secs, 30);
        assert_eq!(loaded.export.direction, TextDirection::Rtl);
        assert_eq!(loaded.stale_overrides.get("accountant_kpis"), Some(&60));
    }

    #[test]
    fn load_nonexistent_returns_error() {
        let result = WaqfConfig::load(Path::new("/nonexistent/waqf.toml"));
        assert!(matches!(result, Err(WaqfError::ConfigNotFound(_))));
    }

    #[test]
    fn minimal_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("waqf.toml");
        std::fs::write(&path, "[waqf]\ndb_path = \"/tmp/w.db\"\n").unwrap();
        let loaded = WaqfConfig::load(&path).unwrap();
        assert_eq!(loaded.waqf.default_stale_secs, 30);
        assert!(loaded.export.csv_bom);
        assert_eq!(loaded.export.page, PageLayout::A4Landscape);
        assert!(loaded.stale_overrides.is_empty());
    }

    #[test]
    fn page_direction_parses_from_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("waqf.toml");
        std::fs::write(
            &path,
            "[waqf]\ndb_path = \"w.db\"\n\n[export]\ndirection = \"ltr\"\npage = \"a4-portrait\"\n",
        )
        .unwrap();
        let loaded = WaqfConfig::load(&path).unwrap();
        assert_eq!(loaded.export.direction, TextDirection::Ltr);
        assert_eq!(loaded.export.page.size_mm(), (210.0, 297.0));
    }
}
