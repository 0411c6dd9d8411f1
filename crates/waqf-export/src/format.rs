use std::fmt;
use std::path::Path;

use waqf_core::TextDirection;
use waqf_core::config::{ExportSettings, PageLayout};

use crate::error::{ExportError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    /// Guess from a file name's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()?.to_str()?.parse().ok()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub title: String,
    pub direction: TextDirection,
    pub csv_bom: bool,
    /// TrueType/OpenType font embedded in PDFs. Arabic text needs one.
    pub font: Option<Vec<u8>>,
    pub page: PageLayout,
    pub sheet_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from(&ExportSettings::default())
    }
}

impl From<&ExportSettings> for ExportOptions {
    fn from(settings: &ExportSettings) -> Self {
        Self {
            title: settings.title.clone(),
            direction: settings.direction,
            csv_bom: settings.csv_bom,
            font: None,
            page: settings.page,
            sheet_name: "Sheet1".to_string(),
        }
    }
}

impl ExportOptions {
    /// Options from configuration, reading the configured font file.
    pub fn from_settings(settings: &ExportSettings) -> Result<Self> {
        let mut options = Self::from(settings);
        if let Some(path) = &settings.font_path {
            let bytes = std::fs::read(path)
                .map_err(|e| ExportError::Font(format!("{path}: {e}")))?;
            options.font = Some(bytes);
        }
        Ok(options)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_direction(mut self, direction: TextDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_font(mut self, font: Vec<u8>) -> Self {
        self.font = Some(font);
        self
    }

    pub fn is_rtl(&self) -> bool {
        self.direction == TextDirection::Rtl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!("excel".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert!("docx".parse::<ExportFormat>().is_err());
        assert_eq!(
            ExportFormat::from_path(Path::new("out/report.csv")),
            Some(ExportFormat::Csv)
        );
    }

    #[test]
    fn defaults_follow_settings() {
        let options = ExportOptions::default();
        assert!(options.is_rtl());
        assert!(options.csv_bom);
        assert!(options.font.is_none());
    }

    #[test]
    fn missing_font_file_is_reported() {
        let settings = ExportSettings {
            font_path: Some("/nonexistent/font.ttf".into()),
            ..Default::default()
        };
        assert!(matches!(
            ExportOptions::from_settings(&settings),
            Err(ExportError::Font(_))
        ));
    }
}
