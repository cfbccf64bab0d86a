//! Default configuration values for the display layer.
//!
//! These functions back the `serde` `default` attributes in [`super::types`]
//! and double as the window descriptor defaults.

use super::types::{LoggingConfig, WaylandConfig, WindowDefaults};
use std::path::PathBuf;

pub(super) fn default_logging_config() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        file_path: default_log_file_path(),
        format: default_log_format(),
    }
}

pub(super) fn default_log_level() -> String {
    "info".to_string()
}

pub(super) fn default_log_file_path() -> Option<PathBuf> {
    None
}

pub(super) fn default_log_format() -> String {
    "text".to_string()
}

pub(super) fn default_window_defaults() -> WindowDefaults {
    WindowDefaults {
        title: default_window_title(),
        width: default_window_width(),
        height: default_window_height(),
        double_buffered: default_true(),
        sample_buffers: default_sample_buffers(),
        samples: default_samples(),
    }
}

pub(super) fn default_window_title() -> String {
    "window".to_string()
}

pub(super) fn default_window_width() -> u32 {
    640
}

pub(super) fn default_window_height() -> u32 {
    480
}

pub(super) fn default_true() -> bool {
    true
}

pub(super) fn default_sample_buffers() -> u32 {
    1
}

pub(super) fn default_samples() -> u32 {
    1
}

pub(super) fn default_wayland_config() -> WaylandConfig {
    WaylandConfig {
        cursor_theme: None,
        cursor_size: default_cursor_size(),
        map_timeout_ms: default_map_timeout_ms(),
    }
}

pub(super) fn default_cursor_size() -> u32 {
    24
}

/// How long window creation waits for the compositor's first configure.
pub(super) fn default_map_timeout_ms() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logging_config_values() {
        let lc = default_logging_config();
        assert_eq!(lc.level, "info");
        assert_eq!(lc.file_path, None);
        assert_eq!(lc.format, "text");
    }

    #[test]
    fn test_default_window_matches_descriptor_defaults() {
        let wd = default_window_defaults();
        assert_eq!(wd.title, "window");
        assert_eq!((wd.width, wd.height), (640, 480));
        assert!(wd.double_buffered);
        assert_eq!((wd.sample_buffers, wd.samples), (1, 1));
    }

    #[test]
    fn test_default_wayland_config_values() {
        let wc = default_wayland_config();
        assert_eq!(wc.cursor_theme, None);
        assert_eq!(wc.cursor_size, 24);
        assert_eq!(wc.map_timeout_ms, 5000);
    }
}
