//! Editor settings: table folding threshold, indentation and color theme
//!
//! Settings are stored as JSON. Missing keys fall back to their defaults so
//! an old settings file keeps loading after new options are added.

use crate::serialize_xml::PrettyConfig;
use crate::tree::ViewConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_UNIQUE_COLUMNS: usize = 2;
pub const MIN_UNIQUE_COLUMNS: usize = 1;
pub const MAX_UNIQUE_COLUMNS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTheme {
    #[default]
    Light,
    Dark,
}

impl ColorTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorTheme::Light => "light",
            ColorTheme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Minimum number of names occurring only once among an element's
    /// children and grandchildren before the table folds them into the
    /// `Unique Subtags` / `Unique Attributes` columns
    pub unique_columns: usize,
    pub indent: PrettyConfig,
    pub color_theme: ColorTheme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            unique_columns: DEFAULT_UNIQUE_COLUMNS,
            indent: PrettyConfig::default(),
            color_theme: ColorTheme::default(),
        }
    }
}

impl Settings {
    /// Parses settings JSON and clamps out-of-range values
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json).context("Invalid settings JSON")?;
        Ok(settings.clamped())
    }

    /// Loads settings from a JSON file
    ///
    /// # Arguments
    /// * `path` - Path to the settings file
    ///
    /// # Returns
    /// * `Result<Settings>` - Defaults are used for keys the file leaves out
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("Failed to load settings from {}", path.display()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write settings file {}", path.display()))
    }

    pub fn clamped(mut self) -> Self {
        self.unique_columns = self.unique_columns.clamp(MIN_UNIQUE_COLUMNS, MAX_UNIQUE_COLUMNS);
        self.indent.max_attributes_per_line = self.indent.max_attributes_per_line.max(1);
        self
    }

    pub fn view_config(&self) -> ViewConfig {
        ViewConfig {
            color_theme: self.color_theme,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize_xml::AttributeLayout;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.unique_columns, 2);
        assert_eq!(settings.indent.indent_size, 4);
        assert!(settings.indent.use_spaces);
        assert_eq!(settings.color_theme, ColorTheme::Light);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json_str(r#"{"color_theme":"dark","indent":{"indent_size":2}}"#).unwrap();
        assert_eq!(settings.color_theme, ColorTheme::Dark);
        assert_eq!(settings.indent.indent_size, 2);
        assert_eq!(settings.indent.max_attributes_per_line, 6);
        assert_eq!(settings.indent.attribute_layout, AttributeLayout::Wrap);
        assert_eq!(settings.unique_columns, 2);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let low = Settings::from_json_str(r#"{"unique_columns":0,"indent":{"max_attributes_per_line":0}}"#).unwrap();
        assert_eq!(low.unique_columns, 1);
        assert_eq!(low.indent.max_attributes_per_line, 1);
        let high = Settings::from_json_str(r#"{"unique_columns":500}"#).unwrap();
        assert_eq!(high.unique_columns, 64);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(Settings::from_json_str("{unique_columns:").is_err());
        assert!(Settings::from_json_str(r#"{"color_theme":"sepia"}"#).is_err());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            unique_columns: 5,
            color_theme: ColorTheme::Dark,
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
        assert!(Settings::load(dir.path().join("missing.json")).is_err());
    }
}
