//! xdg-shell top-level ("decoration frame") handling.
//!
//! The compositor drives sizing: `xdg_toplevel.configure` proposes a size,
//! the following `xdg_surface.configure` commits it. A proposal of 0x0
//! leaves the size to the client, which falls back to the windowed size.

use super::WaylandState;
use crate::events::EventSink;
use wayland_client::protocol::wl_surface::WlSurface;
use wayland_client::{Connection, Dispatch, QueueHandle, WEnum};
use wayland_protocols::xdg::decoration::zv1::client::{
    zxdg_decoration_manager_v1::{self, ZxdgDecorationManagerV1},
    zxdg_toplevel_decoration_v1::{self, Mode, ZxdgToplevelDecorationV1},
};
use wayland_protocols::xdg::shell::client::{
    xdg_surface::{self, XdgSurface},
    xdg_toplevel::{self, XdgToplevel},
    xdg_wm_base::{self, XdgWmBase},
};

/// Role objects that turn a surface into a decorated top-level.
pub struct Frame {
    decoration: Option<ZxdgToplevelDecorationV1>,
    toplevel: XdgToplevel,
    xdg_surface: XdgSurface,
}

impl Frame {
    /// Assigns the top-level role to `surface`, sets title and app id and
    /// asks for server-side decorations when the compositor offers them.
    /// The caller commits the surface to map it.
    pub fn new(state: &WaylandState, surface: &WlSurface, title: &str, qh: &QueueHandle<WaylandState>) -> Self {
        let xdg_surface = state.display.wm_base.get_xdg_surface(surface, qh, ());
        let toplevel = xdg_surface.get_toplevel(qh, ());
        toplevel.set_app_id(title.to_owned());
        toplevel.set_title(title.to_owned());

        let decoration = state.display.decoration_manager.as_ref().map(|manager| {
            let decoration = manager.get_toplevel_decoration(&toplevel, qh, ());
            decoration.set_mode(Mode::ServerSide);
            decoration
        });

        Self {
            decoration,
            toplevel,
            xdg_surface,
        }
    }

    pub fn set_fullscreen(&self, fullscreen: bool) {
        if fullscreen {
            self.toplevel.set_fullscreen(None);
        } else {
            self.toplevel.unset_fullscreen();
        }
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        if let Some(decoration) = self.decoration.take() {
            decoration.destroy();
        }
        self.toplevel.destroy();
        self.xdg_surface.destroy();
    }
}

impl Dispatch<XdgWmBase, ()> for WaylandState {
    fn event(_: &mut Self, wm_base: &XdgWmBase, event: xdg_wm_base::Event, _: &(), _: &Connection, _: &QueueHandle<Self>) {
        if let xdg_wm_base::Event::Ping { serial } = event {
            wm_base.pong(serial);
        }
    }
}

impl Dispatch<XdgSurface, ()> for WaylandState {
    fn event(
        state: &mut Self,
        xdg_surface: &XdgSurface,
        event: xdg_surface::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let xdg_surface::Event::Configure { serial } = event {
            let (width, height) = state
                .geometry
                .on_configure(state.proposed_size.take(), &mut state.sink);
            state.pending_resize = Some((width, height));
            xdg_surface.ack_configure(serial);
            if !state.configured {
                tracing::debug!(width, height, "Top-level mapped");
            }
            state.configured = true;
        }
    }
}

impl Dispatch<XdgToplevel, ()> for WaylandState {
    fn event(state: &mut Self, _: &XdgToplevel, event: xdg_toplevel::Event, _: &(), _: &Connection, _: &QueueHandle<Self>) {
        match event {
            xdg_toplevel::Event::Configure { width, height, .. } => {
                state.proposed_size = Some((width.max(0) as u32, height.max(0) as u32));
            }
            xdg_toplevel::Event::Close => {
                if state.geometry.request_close() {
                    tracing::info!("Compositor requested close");
                }
            }
            _ => {}
        }
    }
}

impl Dispatch<ZxdgDecorationManagerV1, ()> for WaylandState {
    fn event(
        _: &mut Self,
        _: &ZxdgDecorationManagerV1,
        _: zxdg_decoration_manager_v1::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<ZxdgToplevelDecorationV1, ()> for WaylandState {
    fn event(
        _: &mut Self,
        _: &ZxdgToplevelDecorationV1,
        event: zxdg_toplevel_decoration_v1::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let zxdg_toplevel_decoration_v1::Event::Configure { mode } = event {
            match mode {
                WEnum::Value(Mode::ServerSide) => tracing::debug!("Server-side decorations active"),
                other => tracing::debug!(mode = ?other, "Compositor chose client-side decorations"),
            }
        }
    }
}
