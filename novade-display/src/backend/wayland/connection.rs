//! Connection to the Wayland compositor and the globals bound on it.

use super::{dispatch_error, WaylandState};
use crate::backend::egl::EglDisplay;
use crate::config::WaylandConfig;
use crate::error::DisplayError;
use khronos_egl as egl;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::rc::Rc;
use wayland_client::globals::{registry_queue_init, GlobalList, GlobalListContents};
use wayland_client::protocol::{
    wl_compositor::{self, WlCompositor},
    wl_keyboard::WlKeyboard,
    wl_pointer::WlPointer,
    wl_registry::{self, WlRegistry},
    wl_seat::WlSeat,
    wl_shm::{self, WlShm},
    wl_surface::{self, WlSurface},
};
use wayland_client::{Connection, Dispatch, EventQueue, Proxy, QueueHandle};
use wayland_cursor::CursorTheme;
use wayland_protocols::xdg::decoration::zv1::client::zxdg_decoration_manager_v1::ZxdgDecorationManagerV1;
use wayland_protocols::xdg::shell::client::xdg_wm_base::XdgWmBase;
use xkbcommon::xkb;

/// Connection handle, bound globals, input devices and the EGL display
/// created on top of the connection.
///
/// Dropping it releases the EGL display first, then every bound object,
/// then the connection.
pub struct DisplayConnection {
    pub(crate) egl: Option<Rc<EglDisplay>>,
    pub(crate) cursor_theme: Option<CursorTheme>,
    pub(crate) cursor_surface: Option<WlSurface>,
    pub(crate) keyboard: Option<WlKeyboard>,
    pub(crate) pointer: Option<WlPointer>,
    pub(crate) seat: Option<WlSeat>,
    pub(crate) decoration_manager: Option<ZxdgDecorationManagerV1>,
    pub(crate) wm_base: XdgWmBase,
    pub(crate) shm: Option<WlShm>,
    pub(crate) compositor: WlCompositor,
    pub(crate) xkb_context: xkb::Context,
    /// Holds the registry proxy that the bound globals were created from.
    _globals: GlobalList,
    pub(crate) conn: Connection,
}

impl DisplayConnection {
    /// Connects, enumerates globals with one roundtrip and binds the ones
    /// the toolkit uses. Returns the event queue every object is bound on.
    pub fn connect(
        display_name: Option<&str>,
        config: &WaylandConfig,
    ) -> Result<(Self, EventQueue<WaylandState>), DisplayError> {
        let conn = open_connection(display_name)?;
        let (globals, queue) = registry_queue_init::<WaylandState>(&conn)
            .map_err(|e| DisplayError::Unreachable(format!("registry enumeration failed: {e}")))?;
        let qh = queue.handle();

        let compositor: WlCompositor = globals
            .bind(&qh, 1..=4, ())
            .map_err(|e| DisplayError::Unsupported(format!("wl_compositor: {e}")))?;
        let wm_base: XdgWmBase = globals
            .bind(&qh, 1..=5, ())
            .map_err(|e| DisplayError::Unsupported(format!("xdg_wm_base: {e}")))?;
        let seat: Option<WlSeat> = globals
            .bind(&qh, 1..=7, ())
            .map_err(|e| tracing::warn!(error = %e, "No wl_seat, input disabled"))
            .ok();
        let shm: Option<WlShm> = globals
            .bind(&qh, 1..=1, ())
            .map_err(|e| tracing::warn!(error = %e, "No wl_shm, cursor theming disabled"))
            .ok();
        let decoration_manager: Option<ZxdgDecorationManagerV1> = globals
            .bind(&qh, 1..=1, ())
            .map_err(|e| tracing::debug!(error = %e, "No server-side decorations"))
            .ok();

        let cursor_theme = shm.as_ref().and_then(|shm| load_cursor_theme(&conn, shm, config));

        let native_display = conn.backend().display_ptr() as egl::NativeDisplayType;
        let egl = EglDisplay::open(native_display)?;

        tracing::info!(
            compositor_version = compositor.version(),
            seat = seat.is_some(),
            cursor = cursor_theme.is_some(),
            "Connected to Wayland compositor"
        );

        Ok((
            Self {
                egl: Some(egl),
                cursor_theme,
                cursor_surface: None,
                keyboard: None,
                pointer: None,
                seat,
                decoration_manager,
                wm_base,
                shm,
                compositor,
                xkb_context: xkb::Context::new(xkb::CONTEXT_NO_FLAGS),
                _globals: globals,
                conn,
            },
            queue,
        ))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn egl(&self) -> Result<Rc<EglDisplay>, DisplayError> {
        self.egl
            .clone()
            .ok_or_else(|| DisplayError::resource("EGL display", "connection is shutting down"))
    }

    pub fn create_surface(&self, qh: &QueueHandle<WaylandState>) -> WlSurface {
        self.compositor.create_surface(qh, ())
    }

    /// Points `pointer` at the themed default cursor.
    pub(crate) fn set_default_cursor(&mut self, pointer: &WlPointer, serial: u32) {
        let (Some(theme), Some(surface)) = (self.cursor_theme.as_mut(), self.cursor_surface.as_ref()) else {
            return;
        };
        let Some(cursor) = theme.get_cursor("left_ptr") else {
            tracing::debug!("Cursor theme has no left_ptr");
            return;
        };
        let image = &cursor[0];
        let (hotspot_x, hotspot_y) = image.hotspot();
        let (width, height) = image.dimensions();
        pointer.set_cursor(serial, Some(surface), hotspot_x as i32, hotspot_y as i32);
        surface.attach(Some(&**image), 0, 0);
        surface.damage(0, 0, width as i32, height as i32);
        surface.commit();
    }

    pub(crate) fn release_keyboard(&mut self) {
        if let Some(keyboard) = self.keyboard.take() {
            if keyboard.version() >= 3 {
                keyboard.release();
            }
        }
    }

    pub(crate) fn release_pointer(&mut self) {
        if let Some(surface) = self.cursor_surface.take() {
            surface.destroy();
        }
        if let Some(pointer) = self.pointer.take() {
            if pointer.version() >= 3 {
                pointer.release();
            }
        }
    }
}

impl Drop for DisplayConnection {
    fn drop(&mut self) {
        self.egl.take();
        self.cursor_theme.take();
        if let Some(manager) = self.decoration_manager.take() {
            manager.destroy();
        }
        self.wm_base.destroy();
        self.release_keyboard();
        self.release_pointer();
        if let Some(seat) = self.seat.take() {
            if seat.version() >= 5 {
                seat.release();
            }
        }
        if let Some(shm) = self.shm.take() {
            if shm.version() >= 2 {
                shm.release();
            }
        }
        if let Err(e) = self.conn.flush() {
            tracing::debug!(error = %e, "Final flush failed");
        }
        tracing::debug!("Wayland connection closed");
    }
}

fn open_connection(display_name: Option<&str>) -> Result<Connection, DisplayError> {
    let Some(name) = display_name else {
        return Connection::connect_to_env()
            .map_err(|e| DisplayError::Unreachable(format!("cannot connect to Wayland compositor: {e}")));
    };
    let path = socket_path(name, std::env::var_os("XDG_RUNTIME_DIR").map(PathBuf::from))?;
    let stream = UnixStream::connect(&path)
        .map_err(|e| DisplayError::Unreachable(format!("cannot connect to {}: {e}", path.display())))?;
    Connection::from_socket(stream)
        .map_err(|e| DisplayError::Unreachable(format!("cannot connect to {}: {e}", path.display())))
}

/// Socket for a named display: absolute names are used as they are, others
/// live in `XDG_RUNTIME_DIR`.
fn socket_path(name: &str, runtime_dir: Option<PathBuf>) -> Result<PathBuf, DisplayError> {
    let name = PathBuf::from(name);
    if name.is_absolute() {
        return Ok(name);
    }
    runtime_dir
        .map(|dir| dir.join(&name))
        .ok_or_else(|| DisplayError::Unreachable("XDG_RUNTIME_DIR is not set".into()))
}

fn load_cursor_theme(conn: &Connection, shm: &WlShm, config: &WaylandConfig) -> Option<CursorTheme> {
    let (theme, size) = config.resolved_cursor();
    let loaded = match theme.as_deref() {
        Some(name) => CursorTheme::load_from_name(conn, shm.clone(), name, size),
        None => CursorTheme::load(conn, shm.clone(), size),
    };
    loaded
        .map_err(|e| tracing::warn!(error = %e, theme = ?theme, size, "Failed to load cursor theme"))
        .ok()
}

/// Runs one roundtrip and maps failures to [`DisplayError`].
pub(crate) fn roundtrip(
    queue: &mut EventQueue<WaylandState>,
    state: &mut WaylandState,
) -> Result<usize, DisplayError> {
    queue.roundtrip(state).map_err(dispatch_error)
}

impl Dispatch<WlRegistry, GlobalListContents> for WaylandState {
    fn event(
        _state: &mut Self,
        _registry: &WlRegistry,
        event: wl_registry::Event,
        _data: &GlobalListContents,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            wl_registry::Event::Global { name, interface, version } => {
                tracing::trace!(name, %interface, version, "Global announced");
            }
            wl_registry::Event::GlobalRemove { name } => {
                tracing::trace!(name, "Global removed");
            }
            _ => {}
        }
    }
}

impl Dispatch<WlCompositor, ()> for WaylandState {
    fn event(_: &mut Self, _: &WlCompositor, _: wl_compositor::Event, _: &(), _: &Connection, _: &QueueHandle<Self>) {}
}

impl Dispatch<WlShm, ()> for WaylandState {
    fn event(_: &mut Self, _: &WlShm, _: wl_shm::Event, _: &(), _: &Connection, _: &QueueHandle<Self>) {}
}

impl Dispatch<WlSurface, ()> for WaylandState {
    fn event(_: &mut Self, _: &WlSurface, _: wl_surface::Event, _: &(), _: &Connection, _: &QueueHandle<Self>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_display_names_live_in_runtime_dir() {
        let path = socket_path("wayland-1", Some(PathBuf::from("/run/user/1000"))).unwrap();
        assert_eq!(path, PathBuf::from("/run/user/1000/wayland-1"));
    }

    #[test]
    fn absolute_display_names_are_kept() {
        let path = socket_path("/tmp/compositor.sock", None).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/compositor.sock"));
    }

    #[test]
    fn missing_runtime_dir_is_unreachable() {
        let err = socket_path("wayland-0", None).unwrap_err();
        assert!(err.is_recoverable());
    }
}
