//! Off-screen backend rendering into an EGL pbuffer.
//!
//! Useful on machines without a display server and as the last fallback
//! for tools that only need a GL context. There is no native event source,
//! so `process_events` only reports what the window itself changed.

use super::egl::{EglDisplay, SurfaceKind};
use crate::error::DisplayError;
use crate::events::SharedSink;
use crate::registry::WindowFactory;
use crate::window::{
    context, OrderedTeardown, ProcAddress, ThreadAffinity, WindowGeometry, WindowId, WindowInterface,
    WindowParams,
};
use khronos_egl as egl;
use std::rc::Rc;

pub const SCHEME: &str = "headless";
pub const PRECEDENCE: u32 = 10;

struct PbufferResources {
    egl: Rc<EglDisplay>,
    config: egl::Config,
    context: Option<egl::Context>,
    surface: Option<egl::Surface>,
}

impl OrderedTeardown for PbufferResources {
    fn release_decoration(&mut self) -> bool {
        false
    }

    fn release_gpu_context(&mut self) -> bool {
        self.context.take().map(|c| self.egl.destroy_context(c)).is_some()
    }

    fn release_gpu_surface(&mut self) -> bool {
        self.surface.take().map(|s| self.egl.destroy_surface(s)).is_some()
    }

    fn release_native_window(&mut self) -> bool {
        false
    }

    fn release_native_surface(&mut self) -> bool {
        false
    }
}

impl Drop for PbufferResources {
    fn drop(&mut self) {
        self.tear_down();
    }
}

pub struct HeadlessWindow {
    id: WindowId,
    affinity: ThreadAffinity,
    geometry: WindowGeometry,
    sink: SharedSink,
    pending_resize: bool,
    resources: PbufferResources,
}

impl HeadlessWindow {
    pub fn open(params: &WindowParams, sink: SharedSink) -> Result<Self, DisplayError> {
        Self::construct(params, sink).map_err(DisplayError::during_construction)
    }

    fn construct(params: &WindowParams, sink: SharedSink) -> Result<Self, DisplayError> {
        let egl = EglDisplay::open(egl::DEFAULT_DISPLAY)?;
        let config = egl.choose_config(SurfaceKind::Pbuffer, params)?;
        let mut resources = PbufferResources {
            egl,
            config,
            context: None,
            surface: None,
        };
        resources.context = Some(resources.egl.create_context(config)?);
        resources.surface = Some(resources.egl.create_pbuffer_surface(config, params.width, params.height)?);

        let mut window = Self {
            id: WindowId::next(),
            affinity: ThreadAffinity::new(),
            geometry: WindowGeometry::new(params.width, params.height),
            sink,
            pending_resize: true,
            resources,
        };
        window.geometry.configure(None);
        window.make_current()?;
        tracing::info!(id = %window.id, width = params.width, height = params.height, "Headless window ready");
        Ok(window)
    }

    fn handles(&self) -> Result<(egl::Surface, egl::Context), DisplayError> {
        match (self.resources.surface, self.resources.context) {
            (Some(surface), Some(context)) => Ok((surface, context)),
            _ => Err(DisplayError::resource("EGL pbuffer", "window already released")),
        }
    }
}

impl WindowInterface for HeadlessWindow {
    fn id(&self) -> WindowId {
        self.id
    }

    fn backend_name(&self) -> &'static str {
        SCHEME
    }

    fn toggle_fullscreen(&mut self) -> Result<(), DisplayError> {
        self.affinity.check("toggle_fullscreen")?;
        self.geometry.toggle_fullscreen();
        Ok(())
    }

    fn move_to(&mut self, _x: i32, _y: i32) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Pbuffers cannot grow, so the surface is recreated at the new size.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), DisplayError> {
        self.affinity.check("resize")?;
        if (width, height) == self.geometry.size() {
            return Ok(());
        }
        let surface = self
            .resources
            .egl
            .create_pbuffer_surface(self.resources.config, width, height)?;
        let was_current = context::is_current(self.id);
        if was_current {
            self.resources.egl.release_current()?;
        }
        if let Some(old) = self.resources.surface.replace(surface) {
            self.resources.egl.destroy_surface(old);
        }
        self.geometry.request_resize(width, height);
        self.pending_resize = true;
        if was_current {
            self.make_current()?;
        }
        Ok(())
    }

    fn make_current(&mut self) -> Result<(), DisplayError> {
        self.affinity.check("make_current")?;
        let (surface, gl_context) = self.handles()?;
        self.resources.egl.make_current(surface, gl_context)?;
        context::make_current(self.id);
        Ok(())
    }

    fn remove_current(&mut self) -> Result<(), DisplayError> {
        self.affinity.check("remove_current")?;
        self.resources.egl.release_current()?;
        context::release(self.id);
        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<(), DisplayError> {
        self.affinity.check("swap_buffers")?;
        let (surface, _) = self.handles()?;
        self.resources.egl.swap_buffers(surface)?;
        self.make_current()
    }

    fn process_events(&mut self) -> Result<(), DisplayError> {
        self.affinity.check("process_events")?;
        if std::mem::take(&mut self.pending_resize) {
            let (width, height) = self.geometry.size();
            self.sink.borrow_mut().resize(width, height);
        }
        Ok(())
    }

    fn is_fullscreen(&self) -> bool {
        self.geometry.is_fullscreen()
    }

    fn size(&self) -> (u32, u32) {
        self.geometry.size()
    }

    fn proc_address(&self, name: &str) -> Option<ProcAddress> {
        self.resources.egl.proc_address(name)
    }
}

impl Drop for HeadlessWindow {
    fn drop(&mut self) {
        if context::release(self.id) {
            let _ = self.resources.egl.release_current();
        }
        self.geometry.mark_destroyed();
        tracing::debug!(id = %self.id, "Headless window closed");
    }
}

pub struct HeadlessFactory;

impl WindowFactory for HeadlessFactory {
    fn name(&self) -> &'static str {
        SCHEME
    }

    fn open(&self, params: &WindowParams, sink: SharedSink) -> Result<Box<dyn WindowInterface>, DisplayError> {
        Ok(Box::new(HeadlessWindow::open(params, sink)?))
    }
}
