//! Configuration management for the display layer.
//!
//! - [`types`]: [`DisplayConfig`] and its sections.
//! - [`defaults`]: default values used by `serde` and by window descriptors.
//! - [`loader`]: [`ConfigLoader`], which locates, parses and validates the file.
//!
//! # Examples
//!
//! ```rust,ignore
//! use novade_display::config::ConfigLoader;
//!
//! let config = ConfigLoader::load().unwrap_or_default();
//! novade_display::logging::init_logging(&config.logging, false)?;
//! ```

pub mod defaults;
pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{DisplayConfig, LoggingConfig, WaylandConfig, WindowDefaults};
