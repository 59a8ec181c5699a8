//! Configuration handling for the RingMap CLI
//!
//! Loads `ringmap.toml` (or the file given with `--config`); command-line options override it.

use std::path::{Path, PathBuf};

use ringmap_core::MapConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

pub const DEFAULT_CONFIG_FILE: &str = "ringmap.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub export: ExportSettings,

    /// Layout and drawing options handed to every map
    #[serde(default)]
    pub map: MapConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Leave the timestamp out of exported files
    #[serde(default)]
    pub deterministic: bool,

    /// Default number of threads to use
    #[serde(default = "default_threads")]
    pub threads: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Write `<name>.bounds.json` next to each SVG
    #[serde(default)]
    pub bounds_json: bool,

    /// Write `<name>.html` with a clickable image map next to each SVG
    #[serde(default)]
    pub html: bool,
}

fn default_threads() -> usize {
    num_cpus::get()
}

fn default_font_family() -> String {
    "Arial, sans-serif".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { deterministic: false, threads: default_threads() }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self { font_family: default_font_family(), bounds_json: false, html: false }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> CliResult<Self> {
        match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::file_not_found(path.to_path_buf()));
                }
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    log::info!("Loading configuration from: {}", DEFAULT_CONFIG_FILE);
                    Self::load_from_file(&default_path)
                } else {
                    log::debug!("Using default configuration");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from_file(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::io(format!("Failed to read configuration file {}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> CliResult<()> {
        std::fs::write(path, self.to_toml()?)
            .map_err(|e| CliError::io(format!("Failed to write configuration file {}: {}", path.display(), e)))?;
        log::info!("Wrote configuration to {}", path.display());
        Ok(())
    }

    pub fn to_toml(&self) -> CliResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Content of a default `ringmap.toml`
    pub fn example_toml() -> CliResult<String> {
        let header = "# RingMap configuration. Command-line options take precedence.\n\n";
        Ok(format!("{}{}", header, Self::default().to_toml()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringmap_core::{LegendPosition, Toggle};
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.map.width, 900);
        assert_eq!(config.export.font_family, "Arial, sans-serif");
        assert!(!config.general.deterministic);
        assert!(config.general.threads >= 1);
    }

    #[test]
    fn test_config_roundtrip() -> CliResult<()> {
        let mut config = Config::default();
        config.map.legend_position = LegendPosition::LowerRight;
        config.map.inner_labels = Some(Toggle::Show);
        config.export.bounds_json = true;
        config.export.html = true;

        let temp_file = NamedTempFile::new()?;
        config.save_to_file(temp_file.path())?;
        let loaded = Config::load_from_file(temp_file.path())?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() -> CliResult<()> {
        let config: Config = toml::from_str("[map]\nwidth = 1200\nlabel_quality = 3\n")?;
        assert_eq!(config.map.width, 1200);
        assert_eq!(config.map.label_quality, 3);
        assert_eq!(config.map.height, 900);
        assert_eq!(config.export, ExportSettings::default());
        Ok(())
    }

    #[test]
    fn test_example_toml_generation() -> CliResult<()> {
        let example = Config::example_toml()?;
        assert!(example.contains("[general]"));
        assert!(example.contains("[export]"));
        assert!(example.contains("[map]"));
        assert!(example.contains("legend_position = \"upper-right\""));
        let parsed: Config = toml::from_str(&example)?;
        assert_eq!(parsed.map, MapConfig::default());
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/ringmap.toml"))).unwrap_err();
        assert!(matches!(err, CliError::FileNotFound { .. }));
    }
}
