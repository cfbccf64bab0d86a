//! Wayland top-level window with an EGL context.

use super::connection::{roundtrip, DisplayConnection};
use super::shell::Frame;
use super::{wayland_error, WaylandState, SCHEME};
use crate::backend::egl::{EglDisplay, SurfaceKind};
use crate::config::WaylandConfig;
use crate::error::DisplayError;
use crate::events::SharedSink;
use crate::registry::WindowFactory;
use crate::window::{
    context, OrderedTeardown, ProcAddress, ThreadAffinity, WindowId, WindowInterface, WindowParams,
};
use khronos_egl as egl;
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags};
use std::io::ErrorKind;
use std::rc::Rc;
use std::time::{Duration, Instant};
use wayland_client::backend::WaylandError;
use wayland_client::protocol::wl_surface::WlSurface;
use wayland_client::{EventQueue, Proxy};
use wayland_egl::WlEglSurface;

/// Handles owned by one window, acquired bottom-up and released top-down.
struct SurfaceResources {
    egl: Rc<EglDisplay>,
    frame: Option<Frame>,
    context: Option<egl::Context>,
    gpu_surface: Option<egl::Surface>,
    native_window: Option<WlEglSurface>,
    surface: Option<WlSurface>,
}

impl SurfaceResources {
    fn new(egl: Rc<EglDisplay>) -> Self {
        Self {
            egl,
            frame: None,
            context: None,
            gpu_surface: None,
            native_window: None,
            surface: None,
        }
    }
}

impl SurfaceResources {
    fn bind(&self, id: WindowId) -> Result<(), DisplayError> {
        let (surface, gl_context) = self.handles()?;
        self.egl.make_current(surface, gl_context)?;
        context::make_current(id);
        Ok(())
    }

    fn handles(&self) -> Result<(egl::Surface, egl::Context), DisplayError> {
        match (self.gpu_surface, self.context) {
            (Some(surface), Some(context)) => Ok((surface, context)),
            _ => Err(DisplayError::resource("EGL window surface", "window already released")),
        }
    }
}

impl OrderedTeardown for SurfaceResources {
    fn release_decoration(&mut self) -> bool {
        self.frame.take().is_some()
    }

    fn release_gpu_context(&mut self) -> bool {
        self.context.take().map(|c| self.egl.destroy_context(c)).is_some()
    }

    fn release_gpu_surface(&mut self) -> bool {
        self.gpu_surface.take().map(|s| self.egl.destroy_surface(s)).is_some()
    }

    fn release_native_window(&mut self) -> bool {
        self.native_window.take().is_some()
    }

    fn release_native_surface(&mut self) -> bool {
        self.surface.take().map(|s| s.destroy()).is_some()
    }
}

impl Drop for SurfaceResources {
    fn drop(&mut self) {
        self.tear_down();
    }
}

pub struct WaylandWindow {
    id: WindowId,
    affinity: ThreadAffinity,
    // Field order is drop order: window handles, then the queue, then the
    // connection they were created on.
    resources: SurfaceResources,
    queue: EventQueue<WaylandState>,
    state: WaylandState,
}

impl WaylandWindow {
    /// Opens a mapped top-level. Any failure before the window is ready
    /// leaves no window behind and, apart from protocol errors, lets the
    /// registry try the next backend.
    pub fn open(params: &WindowParams, config: &WaylandConfig, sink: SharedSink) -> Result<Self, DisplayError> {
        Self::construct(params, config, sink).map_err(DisplayError::during_construction)
    }

    fn construct(params: &WindowParams, config: &WaylandConfig, sink: SharedSink) -> Result<Self, DisplayError> {
        let (display, mut queue) = DisplayConnection::connect(params.display_name.as_deref(), config)?;
        let qh = queue.handle();
        let mut state = WaylandState::new(display, sink, params.width, params.height);
        // seat capabilities arrive after the bind
        roundtrip(&mut queue, &mut state)?;

        let mut resources = SurfaceResources::new(state.display.egl()?);
        let surface = state.display.create_surface(&qh);
        state.input.surfaces_mut().claim(surface.id());
        resources.surface = Some(surface.clone());

        let native_window = WlEglSurface::new(surface.id(), params.width as i32, params.height as i32)
            .map_err(|e| DisplayError::resource("EGL window", format!("{e:?}")))?;
        let native_ptr = native_window.ptr() as egl::NativeWindowType;
        resources.native_window = Some(native_window);

        let egl_config = resources.egl.choose_config(SurfaceKind::Window, params)?;
        resources.context = Some(resources.egl.create_context(egl_config)?);
        // SAFETY: the wl_egl_window is stored in `resources` and released after the surface.
        let gpu_surface =
            unsafe { resources.egl.create_window_surface(egl_config, native_ptr, params.double_buffered)? };
        resources.gpu_surface = Some(gpu_surface);

        resources.frame = Some(Frame::new(&state, &surface, &params.title, &qh));
        surface.commit();

        let mut window = Self {
            id: WindowId::next(),
            affinity: ThreadAffinity::new(),
            resources,
            queue,
            state,
        };
        window.wait_until_mapped(config.map_timeout())?;
        window.apply_dispatch_results()?;
        window.make_current()?;
        tracing::info!(id = %window.id, title = %params.title, size = ?window.state.geometry.size(), "Wayland window ready");
        Ok(window)
    }

    /// Dispatches until the first `xdg_surface.configure`, or fails with
    /// [`DisplayError::MapTimeout`] once `timeout` has passed.
    fn wait_until_mapped(&mut self, timeout: Duration) -> Result<(), DisplayError> {
        let deadline = Instant::now() + timeout;
        loop {
            self.queue.flush().map_err(wayland_error)?;
            self.queue
                .dispatch_pending(&mut self.state)
                .map_err(super::dispatch_error)?;
            if self.state.configured {
                return Ok(());
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::error!(timeout_ms = timeout.as_millis() as u64, "Compositor never configured the window");
                return Err(DisplayError::MapTimeout {
                    timeout_ms: timeout.as_millis() as u64,
                });
            }

            // Events are already queued when no read guard is handed out.
            let Some(guard) = self.queue.prepare_read() else {
                continue;
            };
            let wait_ms = remaining.as_millis().min(i32::MAX as u128) as i32;
            let ready = {
                let fd = guard.connection_fd();
                let mut fds = [PollFd::new(&fd, PollFlags::POLLIN)];
                poll(&mut fds, wait_ms)
            };
            match ready {
                Ok(0) | Err(Errno::EINTR) => drop(guard),
                Ok(_) => match guard.read() {
                    Ok(_) => {}
                    Err(WaylandError::Io(e)) if e.kind() == ErrorKind::WouldBlock => {}
                    Err(e) => return Err(wayland_error(e)),
                },
                Err(errno) => return Err(DisplayError::Io(errno.into())),
            }
        }
    }

    /// Applies what the dispatch handlers could only record: the EGL window
    /// resize and a close request.
    fn apply_dispatch_results(&mut self) -> Result<(), DisplayError> {
        if let Some((width, height)) = self.state.pending_resize.take() {
            if let Some(native_window) = self.resources.native_window.as_ref() {
                native_window.resize(width as i32, height as i32, 0, 0);
            }
        }
        let (resources, id) = (&self.resources, self.id);
        let state = &mut self.state;
        state
            .geometry
            .deliver_close(|| resources.bind(id), &mut state.sink)?;
        Ok(())
    }
}

impl WindowInterface for WaylandWindow {
    fn id(&self) -> WindowId {
        self.id
    }

    fn backend_name(&self) -> &'static str {
        SCHEME
    }

    fn toggle_fullscreen(&mut self) -> Result<(), DisplayError> {
        self.affinity.check("toggle_fullscreen")?;
        let fullscreen = self.state.geometry.toggle_fullscreen();
        if let Some(frame) = self.resources.frame.as_ref() {
            frame.set_fullscreen(fullscreen);
        }
        self.queue.flush().map_err(wayland_error)
    }

    /// Wayland clients cannot position their top-levels.
    fn move_to(&mut self, x: i32, y: i32) -> Result<(), DisplayError> {
        tracing::debug!(x, y, "Ignoring move request on Wayland");
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), DisplayError> {
        self.affinity.check("resize")?;
        let (width, height) = self.state.geometry.request_resize(width, height);
        if let Some(native_window) = self.resources.native_window.as_ref() {
            native_window.resize(width as i32, height as i32, 0, 0);
        }
        Ok(())
    }

    fn make_current(&mut self) -> Result<(), DisplayError> {
        self.affinity.check("make_current")?;
        self.resources.bind(self.id)
    }

    fn remove_current(&mut self) -> Result<(), DisplayError> {
        self.affinity.check("remove_current")?;
        self.resources.egl.release_current()?;
        context::release(self.id);
        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<(), DisplayError> {
        self.affinity.check("swap_buffers")?;
        let (surface, _) = self.resources.handles()?;
        self.resources.egl.swap_buffers(surface)?;
        self.make_current()
    }

    fn process_events(&mut self) -> Result<(), DisplayError> {
        self.affinity.check("process_events")?;
        roundtrip(&mut self.queue, &mut self.state)?;
        self.apply_dispatch_results()
    }

    fn is_fullscreen(&self) -> bool {
        self.state.geometry.is_fullscreen()
    }

    fn size(&self) -> (u32, u32) {
        self.state.geometry.size()
    }

    fn proc_address(&self, name: &str) -> Option<ProcAddress> {
        self.resources.egl.proc_address(name)
    }
}

impl Drop for WaylandWindow {
    fn drop(&mut self) {
        if context::release(self.id) {
            let _ = self.resources.egl.release_current();
        }
        if let Some(surface) = self.resources.surface.as_ref() {
            self.state.input.surfaces_mut().release(&surface.id());
        }
        self.state.geometry.mark_destroyed();
        tracing::debug!(id = %self.id, "Wayland window closed");
    }
}

pub struct WaylandFactory {
    config: WaylandConfig,
}

impl WaylandFactory {
    pub fn new(config: WaylandConfig) -> Self {
        Self { config }
    }
}

impl WindowFactory for WaylandFactory {
    fn name(&self) -> &'static str {
        SCHEME
    }

    fn open(&self, params: &WindowParams, sink: SharedSink) -> Result<Box<dyn WindowInterface>, DisplayError> {
        Ok(Box::new(WaylandWindow::open(params, &self.config, sink)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::QueuedEvents;
    use std::os::unix::net::UnixListener;
    use tempfile::tempdir;

    fn params_for(display_name: &std::path::Path) -> WindowParams {
        WindowParams {
            display_name: Some(display_name.display().to_string()),
            ..WindowParams::default()
        }
    }

    #[test]
    fn missing_socket_is_unreachable() {
        let dir = tempdir().unwrap();
        let params = params_for(&dir.path().join("wayland-absent"));
        let err = WaylandWindow::open(&params, &WaylandConfig::default(), QueuedEvents::shared())
            .err()
            .unwrap();
        assert!(matches!(err, DisplayError::Unreachable(_)), "{err}");
    }

    #[test]
    fn compositor_hanging_up_allows_fallback() {
        let dir = tempdir().unwrap();
        let socket = dir.path().join("wayland-hangup");
        let listener = UnixListener::bind(&socket).unwrap();
        let server = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            drop(stream);
        });

        let result = WaylandWindow::open(&params_for(&socket), &WaylandConfig::default(), QueuedEvents::shared());
        server.join().unwrap();
        let err = result.err().unwrap();
        assert!(err.is_recoverable(), "{err}");
    }
}
