//! Configuration loading for the display layer.
//!
//! [`ConfigLoader::load`] reads `display.toml` from the NovaDE configuration
//! directory (`$XDG_CONFIG_HOME/novade/` on Linux). A missing file yields the
//! defaults. `NOVADE_DISPLAY_CONFIG` overrides the location.
//!
//! After parsing, [`ConfigLoader::validate`] normalizes the log level and
//! format and rejects sizes the backends cannot honour.

use super::types::DisplayConfig;
use crate::error::ConfigError;
use directories_next::BaseDirs;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "novade";
const CONFIG_FILE_NAME: &str = "display.toml";
const CONFIG_PATH_ENV: &str = "NOVADE_DISPLAY_CONFIG";

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const VALID_FORMATS: [&str; 2] = ["text", "json"];

/// Namespace for configuration loading.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads and validates the user's display configuration.
    pub fn load() -> Result<DisplayConfig, ConfigError> {
        let path = Self::config_path()?;
        Self::load_from_path(&path)
    }

    /// Resolved location of the configuration file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        BaseDirs::new()
            .map(|dirs| dirs.config_dir().join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| ConfigError::DirectoryUnavailable {
                dir_type: "Config Base".to_string(),
            })
    }

    /// Loads from an explicit path, falling back to defaults if it does not exist.
    pub fn load_from_path(path: &Path) -> Result<DisplayConfig, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => {
                tracing::debug!("Loading display configuration from {:?}", path);
                Self::from_toml_str(&content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No display configuration at {:?}, using defaults", path);
                Self::validate(DisplayConfig::default())
            }
            Err(e) => Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<DisplayConfig, ConfigError> {
        if content.trim().is_empty() {
            return Self::validate(DisplayConfig::default());
        }
        let config: DisplayConfig = toml::from_str(content)?;
        Self::validate(config)
    }

    pub fn validate(mut config: DisplayConfig) -> Result<DisplayConfig, ConfigError> {
        let level = config.logging.level.trim().to_lowercase();
        if !VALID_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log level: '{}'. Must be one of {:?}",
                config.logging.level, VALID_LEVELS
            )));
        }
        config.logging.level = level;

        let format = config.logging.format.trim().to_lowercase();
        if !VALID_FORMATS.contains(&format.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log format: '{}'. Must be one of {:?}",
                config.logging.format, VALID_FORMATS
            )));
        }
        config.logging.format = format;

        if config.window.width == 0 || config.window.height == 0 {
            return Err(ConfigError::ValidationError(format!(
                "Window size must be non-zero, got {}x{}",
                config.window.width, config.window.height
            )));
        }
        if config.wayland.cursor_size == 0 {
            return Err(ConfigError::ValidationError(
                "Cursor size must be non-zero".to_string(),
            ));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = ConfigLoader::load_from_path(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, DisplayConfig::default());
    }

    #[test]
    fn test_file_values_are_normalized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("display.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[logging]\nlevel = \"  DEBUG \"\nformat = \"Json\"").unwrap();
        writeln!(file, "[window]\nwidth = 1024\nheight = 768").unwrap();

        let config = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert_eq!((config.window.width, config.window.height), (1024, 768));
        assert_eq!(config.window.title, "window");
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let err = ConfigLoader::from_toml_str("[logging]\nlevel = \"loud\"").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_zero_window_size_is_rejected() {
        let err = ConfigLoader::from_toml_str("[window]\nwidth = 0").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(msg) if msg.contains("0x480")));
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let err = ConfigLoader::from_toml_str("[window\nwidth = 3").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
