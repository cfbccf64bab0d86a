//! # NovaDE Display Library (`novade-display`)
//!
//! `novade-display` is the windowing layer for NovaDE visualization tools. It
//! owns a minimal window + OpenGL context + input abstraction and nothing
//! more: no widgets and no application framework.
//!
//! ## Purpose
//!
//! - **Backends**: a Wayland backend (feature `wayland`) and an off-screen
//!   EGL pbuffer backend (feature `headless`, on by default), both behind
//!   [`WindowInterface`].
//! - **Factory registry**: [`FactoryRegistry`] opens a window from a
//!   descriptor such as `default:[window_title=Main,w=640,h=480]`, trying
//!   backends in precedence order and falling back when one is unavailable.
//! - **Input bridge**: [`input::InputBridge`] turns native pointer and
//!   keyboard events into toolkit buttons, key codes and modifiers.
//! - **Event sink**: every normalized event ends up in an [`EventSink`]
//!   supplied by the application. [`QueuedEvents`] is a ready-made one.
//! - **Configuration and logging**: TOML configuration through
//!   [`ConfigLoader`] and `tracing`-based logging through [`logging`].
//!
//! ## Threading
//!
//! Everything runs on the thread that opened the window. Native events are
//! dispatched synchronously inside [`WindowInterface::process_events`], and
//! calls from other threads fail with [`DisplayError::WrongThread`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use novade_display::{backend, ConfigLoader, QueuedEvents};
//!
//! let config = ConfigLoader::load()?;
//! novade_display::logging::init_logging(&config.logging, false)?;
//!
//! let events = QueuedEvents::shared();
//! let registry = backend::platform_registry(&config);
//! let mut window = registry.open_descriptor("default:[window_title=Main]", events.clone())?;
//!
//! while !events.borrow().quit_requested() {
//!     window.process_events()?;
//!     for event in events.borrow_mut().drain() {
//!         tracing::debug!(?event, "input");
//!     }
//!     window.swap_buffers()?;
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod input;
pub mod logging;
pub mod registry;
pub mod uri;
pub mod window;

pub use config::{ConfigLoader, DisplayConfig, WaylandConfig, WindowDefaults};
pub use error::{ConfigError, DisplayError, LoggingError, UriError};
pub use events::{
    EventSink, InputEvent, KeyCode, KeyModifiers, MouseButton, QueuedEvents, SharedSink, SpecialKey,
};
pub use registry::{FactoryRegistry, WindowFactory};
pub use uri::Uri;
pub use window::{WindowId, WindowInterface, WindowParams};
