//! Seat, pointer and keyboard events, decoded and handed to the input bridge.

use super::WaylandState;
use crate::input::{DeviceChange, KeymapError, ModifierMasks, SeatDevices, XkbKeymap};
use std::os::fd::OwnedFd;
use wayland_client::protocol::{
    wl_keyboard::{self, KeyState, KeymapFormat, WlKeyboard},
    wl_pointer::{self, ButtonState, WlPointer},
    wl_seat::{self, Capability, WlSeat},
};
use wayland_client::{Connection, Dispatch, Proxy, QueueHandle, WEnum};

impl Dispatch<WlSeat, ()> for WaylandState {
    fn event(state: &mut Self, seat: &WlSeat, event: wl_seat::Event, _: &(), _: &Connection, qh: &QueueHandle<Self>) {
        let wl_seat::Event::Capabilities { capabilities } = event else {
            return;
        };
        let caps = match capabilities {
            WEnum::Value(caps) => caps,
            WEnum::Unknown(raw) => Capability::from_bits_truncate(raw),
        };
        let offered = SeatDevices {
            keyboard: caps.contains(Capability::Keyboard),
            pointer: caps.contains(Capability::Pointer),
        };

        for change in state.input.seat_capabilities(offered) {
            match change {
                DeviceChange::AcquireKeyboard => {
                    state.display.keyboard = Some(seat.get_keyboard(qh, ()));
                }
                DeviceChange::ReleaseKeyboard => state.display.release_keyboard(),
                DeviceChange::AcquirePointer => {
                    state.display.pointer = Some(seat.get_pointer(qh, ()));
                    state.display.cursor_surface = Some(state.display.create_surface(qh));
                }
                DeviceChange::ReleasePointer => state.display.release_pointer(),
            }
        }
    }
}

impl Dispatch<WlPointer, ()> for WaylandState {
    fn event(state: &mut Self, pointer: &WlPointer, event: wl_pointer::Event, _: &(), _: &Connection, _: &QueueHandle<Self>) {
        let mut sink = state.sink.borrow_mut();
        match event {
            wl_pointer::Event::Enter {
                serial,
                surface,
                surface_x,
                surface_y,
            } => {
                if state.input.pointer_enter(&surface.id()) {
                    state.display.set_default_cursor(pointer, serial);
                    tracing::trace!(x = surface_x, y = surface_y, "Pointer entered window");
                }
            }
            wl_pointer::Event::Leave { .. } => state.input.pointer_leave(),
            wl_pointer::Event::Motion {
                surface_x, surface_y, ..
            } => state.input.pointer_motion(surface_x, surface_y, &mut *sink),
            wl_pointer::Event::Button { button, state: button_state, .. } => {
                let pressed = matches!(button_state, WEnum::Value(ButtonState::Pressed));
                state.input.pointer_button(button, pressed, &mut *sink);
            }
            wl_pointer::Event::Axis { axis, value, .. } => {
                let axis = match axis {
                    WEnum::Value(axis) => u32::from(axis),
                    WEnum::Unknown(raw) => raw,
                };
                state.input.pointer_axis(axis, value, &mut *sink);
            }
            // frame, axis_source, axis_stop, axis_discrete
            _ => {}
        }
    }
}

impl Dispatch<WlKeyboard, ()> for WaylandState {
    fn event(state: &mut Self, _: &WlKeyboard, event: wl_keyboard::Event, _: &(), _: &Connection, _: &QueueHandle<Self>) {
        match event {
            wl_keyboard::Event::Keymap { format, fd, size } => match load_keymap(state, format, fd, size) {
                Ok(keymap) => state.input.replace_keymap(Box::new(keymap)),
                Err(e) => tracing::warn!(error = %e, "Keeping previous keymap"),
            },
            wl_keyboard::Event::Key { key, state: key_state, .. } => {
                let pressed = matches!(key_state, WEnum::Value(KeyState::Pressed));
                let mut sink = state.sink.borrow_mut();
                state.input.keyboard_key(key, pressed, &mut *sink);
            }
            wl_keyboard::Event::Modifiers {
                mods_depressed,
                mods_latched,
                mods_locked,
                group,
                ..
            } => state.input.keyboard_modifiers(ModifierMasks {
                depressed: mods_depressed,
                latched: mods_latched,
                locked: mods_locked,
                group,
            }),
            // enter, leave, repeat_info
            _ => {}
        }
    }
}

fn load_keymap(
    state: &WaylandState,
    format: WEnum<KeymapFormat>,
    fd: OwnedFd,
    size: u32,
) -> Result<XkbKeymap, KeymapError> {
    match format {
        WEnum::Value(KeymapFormat::XkbV1) => XkbKeymap::from_fd(&state.display.xkb_context, fd, size),
        WEnum::Value(other) => Err(KeymapError::UnsupportedFormat(u32::from(other))),
        WEnum::Unknown(raw) => Err(KeymapError::UnsupportedFormat(raw)),
    }
}
