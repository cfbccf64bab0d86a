//! Window abstraction shared by all backends.
//!
//! A backend window owns a native surface, a GPU surface/context pair and
//! whatever connection it needs to the display server. Callers only see
//! [`WindowInterface`]; which backend sits behind it is decided by the
//! [`crate::registry::FactoryRegistry`].

pub mod context;
pub mod lifecycle;
pub mod teardown;

pub use context::{ThreadAffinity, WindowId};
pub use lifecycle::{WindowGeometry, WindowPhase};
pub use teardown::{OrderedTeardown, Stage};

use crate::config::WindowDefaults;
use crate::error::DisplayError;
use crate::uri::Uri;

/// GL entry point as returned by the platform loader.
pub type ProcAddress = extern "system" fn();

/// Operations every backend window supports.
///
/// All methods that touch the GPU context or the display connection must be
/// called from the thread that opened the window; they return
/// [`DisplayError::WrongThread`] otherwise.
pub trait WindowInterface {
    fn id(&self) -> WindowId;

    /// Short backend name, e.g. `"wayland"`.
    fn backend_name(&self) -> &'static str;

    /// Enters or leaves fullscreen. The request is flushed before returning.
    fn toggle_fullscreen(&mut self) -> Result<(), DisplayError>;

    /// Moves the window, where the platform allows clients to do so.
    fn move_to(&mut self, x: i32, y: i32) -> Result<(), DisplayError>;

    /// Sets the windowed size and resizes the GPU surface.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), DisplayError>;

    fn make_current(&mut self) -> Result<(), DisplayError>;

    fn remove_current(&mut self) -> Result<(), DisplayError>;

    /// Presents the frame and makes the context current again.
    fn swap_buffers(&mut self) -> Result<(), DisplayError>;

    /// Dispatches pending native events into the window's event sink.
    fn process_events(&mut self) -> Result<(), DisplayError>;

    fn is_fullscreen(&self) -> bool;

    fn size(&self) -> (u32, u32);

    fn proc_address(&self, name: &str) -> Option<ProcAddress>;
}

/// Construction parameters read from a window descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowParams {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Display server to connect to. `None` uses the environment.
    pub display_name: Option<String>,
    pub double_buffered: bool,
    pub sample_buffers: u32,
    pub samples: u32,
}

impl Default for WindowParams {
    fn default() -> Self {
        Self::with_defaults(&WindowDefaults::default())
    }
}

impl WindowParams {
    pub fn with_defaults(defaults: &WindowDefaults) -> Self {
        Self {
            title: defaults.title.clone(),
            width: defaults.width,
            height: defaults.height,
            display_name: None,
            double_buffered: defaults.double_buffered,
            sample_buffers: defaults.sample_buffers,
            samples: defaults.samples,
        }
    }

    /// Reads `window_title`, `w`, `h`, `display_name`, `double_buffered`,
    /// `sample_buffers` and `samples`, falling back to `defaults`.
    pub fn from_uri(uri: &Uri, defaults: &WindowDefaults) -> Result<Self, DisplayError> {
        let base = Self::with_defaults(defaults);
        let display_name: String = uri.get("display_name", String::new())?;
        Ok(Self {
            title: uri.get("window_title", base.title)?,
            width: uri.get("w", base.width)?,
            height: uri.get("h", base.height)?,
            display_name: (!display_name.is_empty()).then_some(display_name),
            double_buffered: uri.get("double_buffered", base.double_buffered)?,
            sample_buffers: uri.get("sample_buffers", base.sample_buffers)?,
            samples: uri.get("samples", base.samples)?,
        })
    }
}
