//! Input device bridge.
//!
//! [`InputBridge`] turns native seat, pointer and keyboard events into calls
//! on an [`EventSink`]. It knows nothing about the native protocol: backends
//! decode their events and call the matching method here, synchronously,
//! from inside their dispatch.
//!
//! The surface type `S` is whatever the backend uses to identify a surface
//! (a Wayland object id, for example).

pub mod codes;
pub mod keymap;
pub mod state;
pub mod surfaces;

pub use keymap::{KeySymbolResolver, KeymapError, ModifierMasks};
pub use state::InputState;
pub use surfaces::OwnedSurfaces;

#[cfg(feature = "wayland")]
pub use keymap::XkbKeymap;

use crate::events::{EventSink, KeyCode};
use std::fmt::Debug;
use std::hash::Hash;

/// Input devices a seat currently offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeatDevices {
    pub keyboard: bool,
    pub pointer: bool,
}

/// What a backend must do after a capability change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceChange {
    AcquireKeyboard,
    ReleaseKeyboard,
    /// Acquire the pointer together with its cursor surface.
    AcquirePointer,
    ReleasePointer,
}

pub struct InputBridge<S> {
    state: InputState,
    surfaces: OwnedSurfaces<S>,
    devices: SeatDevices,
    keymap: Option<Box<dyn KeySymbolResolver>>,
}

impl<S> Default for InputBridge<S> {
    fn default() -> Self {
        Self {
            state: InputState::default(),
            surfaces: OwnedSurfaces::default(),
            devices: SeatDevices::default(),
            keymap: None,
        }
    }
}

impl<S: Eq + Hash + Debug> InputBridge<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn surfaces_mut(&mut self) -> &mut OwnedSurfaces<S> {
        &mut self.surfaces
    }

    pub fn owns(&self, surface: &S) -> bool {
        self.surfaces.owns(surface)
    }

    /// Diffs the offered capabilities against the devices held.
    ///
    /// Devices are only acquired when newly offered and only released when
    /// withdrawn, so repeated announcements do not leak device objects.
    pub fn seat_capabilities(&mut self, offered: SeatDevices) -> Vec<DeviceChange> {
        let mut changes = Vec::new();
        match (self.devices.keyboard, offered.keyboard) {
            (false, true) => changes.push(DeviceChange::AcquireKeyboard),
            (true, false) => changes.push(DeviceChange::ReleaseKeyboard),
            _ => {}
        }
        match (self.devices.pointer, offered.pointer) {
            (false, true) => changes.push(DeviceChange::AcquirePointer),
            (true, false) => {
                self.state.pressed = false;
                changes.push(DeviceChange::ReleasePointer);
            }
            _ => {}
        }
        if !changes.is_empty() {
            tracing::debug!(?offered, ?changes, "Seat capabilities changed");
        }
        self.devices = offered;
        changes
    }

    /// Returns whether the themed cursor should be set for `surface`.
    pub fn pointer_enter(&mut self, surface: &S) -> bool {
        self.surfaces.owns(surface)
    }

    pub fn pointer_leave(&mut self) {
        self.state.pressed = false;
    }

    pub fn pointer_motion(&mut self, x: f64, y: f64, sink: &mut dyn EventSink) {
        self.state.move_to(x, y);
        let (x, y) = self.state.position();
        if self.state.pressed {
            sink.mouse_motion(x, y);
        } else {
            sink.passive_mouse_motion(x, y);
        }
    }

    pub fn pointer_button(&mut self, code: u32, pressed: bool, sink: &mut dyn EventSink) {
        let Some(button) = codes::mouse_button(code) else {
            tracing::trace!(code, "Ignoring unmapped pointer button");
            return;
        };
        self.state.pressed = pressed;
        let (x, y) = self.state.position();
        sink.mouse(button, !pressed, x, y);
    }

    /// One scroll step becomes one wheel-button press.
    pub fn pointer_axis(&mut self, axis: u32, value: f64, sink: &mut dyn EventSink) {
        if let Some(button) = codes::scroll_button(axis, value) {
            let (x, y) = self.state.position();
            sink.mouse(button, false, x, y);
        }
    }

    /// Installs a freshly compiled keymap. The previous one is released only
    /// after the new one is in place.
    pub fn replace_keymap(&mut self, keymap: Box<dyn KeySymbolResolver>) {
        let previous = self.keymap.replace(keymap);
        drop(previous);
    }

    pub fn keyboard_modifiers(&mut self, masks: ModifierMasks) {
        if let Some(keymap) = self.keymap.as_mut() {
            keymap.update_modifiers(masks);
        }
    }

    pub fn keyboard_key(&mut self, code: u32, pressed: bool, sink: &mut dyn EventSink) {
        if let Some(modifier) = codes::modifier(code) {
            self.state.set_modifier(modifier, pressed);
            sink.modifiers_changed(self.state.modifiers);
            return;
        }

        let Some(key) = self.resolve_key(code) else {
            return;
        };
        let (x, y) = self.state.position();
        if pressed {
            sink.keyboard(key, x, y);
        } else {
            sink.keyboard_up(key, x, y);
        }
    }

    fn resolve_key(&self, code: u32) -> Option<KeyCode> {
        if let Some(special) = codes::special_key(code) {
            return Some(KeyCode::special(special));
        }
        let utf32 = self.keymap.as_ref()?.key_utf32(code);
        KeyCode::ascii(utf32)
    }
}
