//! Configuration data structures for the display layer.
//!
//! [`DisplayConfig`] is the root; it is deserialized from TOML, fills in
//! missing fields from [`super::defaults`] and rejects unknown fields.

use super::defaults;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration settings for the logging subsystem.
///
/// ```
/// use novade_display::config::LoggingConfig;
///
/// let log_config: LoggingConfig = toml::from_str(r#"level = "debug""#).unwrap();
/// assert_eq!(log_config.level, "debug");
/// assert_eq!(log_config.format, "text");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// "trace", "debug", "info", "warn" or "error" (case-insensitive).
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    /// Optional daily-rolled log file. `None` disables file logging.
    #[serde(default = "defaults::default_log_file_path")]
    pub file_path: Option<PathBuf>,
    /// "text" or "json".
    #[serde(default = "defaults::default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        defaults::default_logging_config()
    }
}

/// Values used when a window descriptor leaves a parameter out.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowDefaults {
    #[serde(default = "defaults::default_window_title")]
    pub title: String,
    #[serde(default = "defaults::default_window_width")]
    pub width: u32,
    #[serde(default = "defaults::default_window_height")]
    pub height: u32,
    #[serde(default = "defaults::default_true")]
    pub double_buffered: bool,
    #[serde(default = "defaults::default_sample_buffers")]
    pub sample_buffers: u32,
    #[serde(default = "defaults::default_samples")]
    pub samples: u32,
}

impl Default for WindowDefaults {
    fn default() -> Self {
        defaults::default_window_defaults()
    }
}

/// Wayland backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaylandConfig {
    /// Cursor theme name. Falls back to `XCURSOR_THEME`, then the default theme.
    #[serde(default)]
    pub cursor_theme: Option<String>,
    /// Cursor size in pixels. `XCURSOR_SIZE` wins when this is left at its default.
    #[serde(default = "defaults::default_cursor_size")]
    pub cursor_size: u32,
    /// Upper bound on the wait for the first configure after mapping.
    #[serde(default = "defaults::default_map_timeout_ms")]
    pub map_timeout_ms: u64,
}

impl WaylandConfig {
    pub fn map_timeout(&self) -> Duration {
        Duration::from_millis(self.map_timeout_ms)
    }

    /// Theme name and size to load, after consulting the environment.
    pub fn resolved_cursor(&self) -> (Option<String>, u32) {
        let theme = self
            .cursor_theme
            .clone()
            .or_else(|| std::env::var("XCURSOR_THEME").ok())
            .filter(|name| !name.is_empty());
        let size = if self.cursor_size == defaults::default_cursor_size() {
            std::env::var("XCURSOR_SIZE")
                .ok()
                .and_then(|s| s.parse::<u32>().ok())
                .filter(|s| *s > 0)
                .unwrap_or(self.cursor_size)
        } else {
            self.cursor_size
        };
        (theme, size)
    }
}

impl Default for WaylandConfig {
    fn default() -> Self {
        defaults::default_wayland_config()
    }
}

/// Root configuration for the display layer.
///
/// ```
/// use novade_display::config::DisplayConfig;
///
/// let config: DisplayConfig = toml::from_str(r#"
/// [window]
/// title = "viewer"
///
/// [wayland]
/// map_timeout_ms = 250
/// "#).unwrap();
/// assert_eq!(config.window.title, "viewer");
/// assert_eq!(config.window.width, 640);
/// assert_eq!(config.wayland.map_timeout_ms, 250);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    #[serde(default = "defaults::default_logging_config")]
    pub logging: LoggingConfig,
    #[serde(default = "defaults::default_window_defaults")]
    pub window: WindowDefaults,
    #[serde(default = "defaults::default_wayland_config")]
    pub wayland: WaylandConfig,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            window: WindowDefaults::default(),
            wayland: WaylandConfig::default(),
        }
    }
}
