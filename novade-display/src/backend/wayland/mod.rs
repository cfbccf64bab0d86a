//! Wayland backend.
//!
//! One [`WaylandState`] receives every event of the window's queue. The
//! `Dispatch` implementations are split by concern: globals and the
//! connection in [`connection`], seat devices in [`seat`], and the xdg
//! shell in [`shell`]. The window itself lives in [`window`].

pub mod connection;
pub mod seat;
pub mod shell;
pub mod window;

pub use connection::DisplayConnection;
pub use window::{WaylandFactory, WaylandWindow};

use crate::error::DisplayError;
use crate::events::SharedSink;
use crate::input::InputBridge;
use crate::window::WindowGeometry;
use wayland_client::backend::{ObjectId, WaylandError};
use wayland_client::DispatchError;

pub const SCHEME: &str = "wayland";

/// Scheme names and precedences the Wayland factory registers under.
pub const REGISTRATIONS: [(&str, u32); 3] = [("wayland", 10), ("linux", 9), ("default", 90)];

/// Dispatch target for a Wayland window's event queue.
pub struct WaylandState {
    pub(crate) display: DisplayConnection,
    pub(crate) input: InputBridge<ObjectId>,
    pub(crate) sink: SharedSink,
    pub(crate) geometry: WindowGeometry,
    /// Size from the last `xdg_toplevel.configure`, applied on the matching
    /// `xdg_surface.configure`.
    pub(crate) proposed_size: Option<(u32, u32)>,
    /// Size the EGL window still has to be resized to.
    pub(crate) pending_resize: Option<(u32, u32)>,
    pub(crate) configured: bool,
}

impl WaylandState {
    pub(crate) fn new(display: DisplayConnection, sink: SharedSink, width: u32, height: u32) -> Self {
        Self {
            display,
            input: InputBridge::new(),
            sink,
            geometry: WindowGeometry::new(width, height),
            proposed_size: None,
            pending_resize: None,
            configured: false,
        }
    }
}

pub(crate) fn wayland_error(err: WaylandError) -> DisplayError {
    match err {
        WaylandError::Io(e) => DisplayError::Io(e),
        WaylandError::Protocol(p) => DisplayError::Protocol(p.to_string()),
    }
}

pub(crate) fn dispatch_error(err: DispatchError) -> DisplayError {
    match err {
        DispatchError::Backend(e) => wayland_error(e),
        other => DisplayError::Protocol(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn hang_up() -> DispatchError {
        DispatchError::Backend(WaylandError::Io(io::Error::from(io::ErrorKind::BrokenPipe)))
    }

    #[test]
    fn hang_up_while_running_is_fatal() {
        let err = dispatch_error(hang_up());
        assert!(matches!(err, DisplayError::Io(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn hang_up_while_opening_allows_fallback() {
        let err = dispatch_error(hang_up()).during_construction();
        assert!(matches!(err, DisplayError::Unreachable(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn wayland_is_preferred_under_linux() {
        let linux: Vec<u32> = REGISTRATIONS
            .iter()
            .filter(|(scheme, _)| *scheme == "linux")
            .map(|(_, precedence)| *precedence)
            .collect();
        assert_eq!(linux, vec![9]);
    }
}
