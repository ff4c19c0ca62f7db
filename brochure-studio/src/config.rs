//! Studio configuration.
//!
//! Settings come from an optional JSON file and are then overridden by
//! command-line flags and environment variables:
//!
//! ```json
//! {
//!   "theme": "modern",
//!   "page": { "bleed": 9 },
//!   "output_dir": "out",
//!   "log_format": "json"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use brochure_core::DocumentSettings;
use brochure_themes::DEFAULT_THEME;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Page settings that replace the document defaults when present.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageOverrides {
    /// Trimmed page width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// Trimmed page height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    /// Bleed beyond the trim edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bleed: Option<f32>,
    /// Safety margin inside the trim edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_margin: Option<f32>,
}

impl PageOverrides {
    /// Layer `other` on top of `self`.
    pub fn merge(&mut self, other: PageOverrides) {
        self.width = other.width.or(self.width);
        self.height = other.height.or(self.height);
        self.bleed = other.bleed.or(self.bleed);
        self.safety_margin = other.safety_margin.or(self.safety_margin);
    }
}

/// Settings shared by every studio command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Theme for new documents.
    pub theme: String,
    /// Page settings overrides.
    pub page: PageOverrides,
    /// Where generated files are written.
    pub output_dir: PathBuf,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            page: PageOverrides::default(),
            output_dir: PathBuf::from("."),
            log_format: LogFormat::default(),
        }
    }
}

impl StudioConfig {
    /// Read a configuration file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read and `Config` if it is not
    /// valid JSON of this shape.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let json = fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Document settings with the page overrides applied.
    #[must_use]
    pub fn document_settings(&self) -> DocumentSettings {
        let defaults = DocumentSettings::default();
        DocumentSettings {
            page_width: self.page.width.unwrap_or(defaults.page_width),
            page_height: self.page.height.unwrap_or(defaults.page_height),
            bleed: self.page.bleed.unwrap_or(defaults.bleed),
            safety_margin: self.page.safety_margin.unwrap_or(defaults.safety_margin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StudioConfig::default();
        assert_eq!(config.theme, "classic");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.document_settings(), DocumentSettings::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("studio.json");
        fs::write(&path, r#"{ "page": { "bleed": 9 }, "log_format": "json" }"#).expect("write");

        let config = StudioConfig::load(&path).expect("valid config");
        assert_eq!(config.theme, "classic");
        assert_eq!(config.log_format, LogFormat::Json);
        let settings = config.document_settings();
        assert!((settings.bleed - 9.0).abs() < f32::EPSILON);
        assert!(
            (settings.page_width - DocumentSettings::default().page_width).abs() < f32::EPSILON
        );
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("studio.json");
        fs::write(&path, "{ theme: }").expect("write");
        assert!(StudioConfig::load(&path).is_err());
        assert!(StudioConfig::load(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_page_overrides_merge() {
        let mut base = PageOverrides {
            width: Some(500.0),
            bleed: Some(3.0),
            ..PageOverrides::default()
        };
        base.merge(PageOverrides {
            bleed: Some(6.0),
            ..PageOverrides::default()
        });
        assert_eq!(base.width, Some(500.0));
        assert_eq!(base.bleed, Some(6.0));
    }
}
