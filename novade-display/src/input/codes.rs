//! Linux evdev codes (`linux/input-event-codes.h`) and their toolkit meaning.
//!
//! Wayland delivers pointer buttons and keys as evdev codes. Codes with no
//! entry here are filtered out by the bridge.

use crate::events::{KeyModifiers, MouseButton, SpecialKey};

pub const BTN_LEFT: u32 = 0x110;
pub const BTN_RIGHT: u32 = 0x111;
pub const BTN_MIDDLE: u32 = 0x112;

pub const KEY_LEFTCTRL: u32 = 29;
pub const KEY_LEFTSHIFT: u32 = 42;
pub const KEY_RIGHTSHIFT: u32 = 54;
pub const KEY_LEFTALT: u32 = 56;
pub const KEY_F1: u32 = 59;
pub const KEY_F2: u32 = 60;
pub const KEY_F3: u32 = 61;
pub const KEY_F4: u32 = 62;
pub const KEY_F5: u32 = 63;
pub const KEY_F6: u32 = 64;
pub const KEY_F7: u32 = 65;
pub const KEY_F8: u32 = 66;
pub const KEY_F9: u32 = 67;
pub const KEY_F10: u32 = 68;
pub const KEY_F11: u32 = 87;
pub const KEY_F12: u32 = 88;
pub const KEY_RIGHTCTRL: u32 = 97;
pub const KEY_RIGHTALT: u32 = 100;
pub const KEY_HOME: u32 = 102;
pub const KEY_UP: u32 = 103;
pub const KEY_PAGEUP: u32 = 104;
pub const KEY_LEFT: u32 = 105;
pub const KEY_RIGHT: u32 = 106;
pub const KEY_END: u32 = 107;
pub const KEY_DOWN: u32 = 108;
pub const KEY_PAGEDOWN: u32 = 109;
pub const KEY_INSERT: u32 = 110;

/// `REL_X`/`REL_Y`; also the values of `wl_pointer.axis` (vertical, horizontal).
pub const REL_X: u32 = 0;
pub const REL_Y: u32 = 1;

/// xkb keycodes are evdev codes shifted by 8.
pub const XKB_KEYCODE_OFFSET: u32 = 8;

pub fn mouse_button(code: u32) -> Option<MouseButton> {
    match code {
        BTN_LEFT => Some(MouseButton::Left),
        BTN_MIDDLE => Some(MouseButton::Middle),
        BTN_RIGHT => Some(MouseButton::Right),
        _ => None,
    }
}

/// Wheel click for one scroll step. Positive and zero values count as positive.
pub fn scroll_button(axis: u32, value: f64) -> Option<MouseButton> {
    let negative = value < 0.0;
    match axis {
        REL_X if negative => Some(MouseButton::WheelUp),
        REL_X => Some(MouseButton::WheelDown),
        REL_Y if negative => Some(MouseButton::WheelLeft),
        REL_Y => Some(MouseButton::WheelRight),
        _ => None,
    }
}

pub fn modifier(code: u32) -> Option<KeyModifiers> {
    match code {
        KEY_LEFTSHIFT | KEY_RIGHTSHIFT => Some(KeyModifiers::SHIFT),
        KEY_LEFTCTRL | KEY_RIGHTCTRL => Some(KeyModifiers::CTRL),
        KEY_LEFTALT | KEY_RIGHTALT => Some(KeyModifiers::ALT),
        _ => None,
    }
}

pub fn special_key(code: u32) -> Option<SpecialKey> {
    let key = match code {
        KEY_F1 => SpecialKey::F1,
        KEY_F2 => SpecialKey::F2,
        KEY_F3 => SpecialKey::F3,
        KEY_F4 => SpecialKey::F4,
        KEY_F5 => SpecialKey::F5,
        KEY_F6 => SpecialKey::F6,
        KEY_F7 => SpecialKey::F7,
        KEY_F8 => SpecialKey::F8,
        KEY_F9 => SpecialKey::F9,
        KEY_F10 => SpecialKey::F10,
        KEY_F11 => SpecialKey::F11,
        KEY_F12 => SpecialKey::F12,
        KEY_LEFT => SpecialKey::Left,
        KEY_UP => SpecialKey::Up,
        KEY_RIGHT => SpecialKey::Right,
        KEY_DOWN => SpecialKey::Down,
        KEY_PAGEUP => SpecialKey::PageUp,
        KEY_PAGEDOWN => SpecialKey::PageDown,
        KEY_HOME => SpecialKey::Home,
        KEY_END => SpecialKey::End,
        KEY_INSERT => SpecialKey::Insert,
        _ => return None,
    };
    Some(key)
}
