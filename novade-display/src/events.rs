//! Normalized input vocabulary and the event sink that receives it.
//!
//! Backends translate native pointer, keyboard and window events into the
//! types in this module and push them into an [`EventSink`]. The sink is
//! the single target that hands events on to the view/handler tree.

use bitflags::bitflags;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Toolkit button ids. Wheel "buttons" are discrete scroll clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MouseButton {
    Left = 0,
    Middle = 1,
    Right = 2,
    WheelUp = 3,
    WheelDown = 4,
    WheelLeft = 5,
    WheelRight = 6,
}

impl MouseButton {
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn is_wheel(self) -> bool {
        self.id() >= MouseButton::WheelUp.id()
    }
}

/// Non-printing keys. The discriminant is the offset above [`KeyCode::SPECIAL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SpecialKey {
    F1 = 1,
    F2 = 2,
    F3 = 3,
    F4 = 4,
    F5 = 5,
    F6 = 6,
    F7 = 7,
    F8 = 8,
    F9 = 9,
    F10 = 10,
    F11 = 11,
    F12 = 12,
    Left = 100,
    Up = 101,
    Right = 102,
    Down = 103,
    PageUp = 104,
    PageDown = 105,
    Home = 106,
    End = 107,
    Insert = 108,
}

/// Key code delivered to the sink: printable ASCII `1..=127`, or
/// `SPECIAL + offset` for a [`SpecialKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u8);

impl KeyCode {
    pub const SPECIAL: u8 = 128;

    pub fn special(key: SpecialKey) -> Self {
        KeyCode(Self::SPECIAL + key as u8)
    }

    /// `None` outside the printable ASCII range.
    pub fn ascii(utf32: u32) -> Option<Self> {
        (1..=127).contains(&utf32).then(|| KeyCode(utf32 as u8))
    }

    pub fn is_special(self) -> bool {
        self.0 >= Self::SPECIAL
    }

    pub fn as_char(self) -> Option<char> {
        (!self.is_special()).then(|| self.0 as char)
    }
}

bitflags! {
    /// Held modifier keys. Left and right variants share a flag.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: u32 {
        const SHIFT = 1 << 16;
        const CTRL = 1 << 17;
        const ALT = 1 << 18;
        const CMD = 1 << 19;
        const FNC = 1 << 20;
    }
}

/// Receiver of normalized window and input events.
///
/// All calls happen on the thread that drives `process_events`.
pub trait EventSink {
    fn resize(&mut self, width: u32, height: u32);
    /// Pointer moved with a button held.
    fn mouse_motion(&mut self, x: i32, y: i32);
    /// Pointer moved with no button held.
    fn passive_mouse_motion(&mut self, x: i32, y: i32);
    fn mouse(&mut self, button: MouseButton, released: bool, x: i32, y: i32);
    fn keyboard(&mut self, key: KeyCode, x: i32, y: i32);
    fn keyboard_up(&mut self, key: KeyCode, x: i32, y: i32);
    fn modifiers_changed(&mut self, _modifiers: KeyModifiers) {}
    /// The user asked to close the window. The application loop decides what happens.
    fn quit(&mut self);
}

/// Sink shared between a window and the application that polls it.
pub type SharedSink = Rc<RefCell<dyn EventSink>>;

impl<S: EventSink + ?Sized> EventSink for Rc<RefCell<S>> {
    fn resize(&mut self, width: u32, height: u32) {
        self.borrow_mut().resize(width, height)
    }
    fn mouse_motion(&mut self, x: i32, y: i32) {
        self.borrow_mut().mouse_motion(x, y)
    }
    fn passive_mouse_motion(&mut self, x: i32, y: i32) {
        self.borrow_mut().passive_mouse_motion(x, y)
    }
    fn mouse(&mut self, button: MouseButton, released: bool, x: i32, y: i32) {
        self.borrow_mut().mouse(button, released, x, y)
    }
    fn keyboard(&mut self, key: KeyCode, x: i32, y: i32) {
        self.borrow_mut().keyboard(key, x, y)
    }
    fn keyboard_up(&mut self, key: KeyCode, x: i32, y: i32) {
        self.borrow_mut().keyboard_up(key, x, y)
    }
    fn modifiers_changed(&mut self, modifiers: KeyModifiers) {
        self.borrow_mut().modifiers_changed(modifiers)
    }
    fn quit(&mut self) {
        self.borrow_mut().quit()
    }
}

/// One sink call, as recorded by [`QueuedEvents`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Resize { width: u32, height: u32 },
    Motion { x: i32, y: i32 },
    PassiveMotion { x: i32, y: i32 },
    Mouse { button: MouseButton, released: bool, x: i32, y: i32 },
    KeyDown { key: KeyCode, x: i32, y: i32 },
    KeyUp { key: KeyCode, x: i32, y: i32 },
    Modifiers(KeyModifiers),
    Quit,
}

/// Buffering sink for applications that poll between frames.
#[derive(Debug, Default)]
pub struct QueuedEvents {
    events: VecDeque<InputEvent>,
    quit_requested: bool,
}

impl QueuedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a queue already wrapped for sharing with a window.
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn push(&mut self, event: InputEvent) {
        if event == InputEvent::Quit {
            self.quit_requested = true;
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }
}

impl EventSink for QueuedEvents {
    fn resize(&mut self, width: u32, height: u32) {
        self.push(InputEvent::Resize { width, height });
    }
    fn mouse_motion(&mut self, x: i32, y: i32) {
        self.push(InputEvent::Motion { x, y });
    }
    fn passive_mouse_motion(&mut self, x: i32, y: i32) {
        self.push(InputEvent::PassiveMotion { x, y });
    }
    fn mouse(&mut self, button: MouseButton, released: bool, x: i32, y: i32) {
        self.push(InputEvent::Mouse { button, released, x, y });
    }
    fn keyboard(&mut self, key: KeyCode, x: i32, y: i32) {
        self.push(InputEvent::KeyDown { key, x, y });
    }
    fn keyboard_up(&mut self, key: KeyCode, x: i32, y: i32) {
        self.push(InputEvent::KeyUp { key, x, y });
    }
    fn modifiers_changed(&mut self, modifiers: KeyModifiers) {
        self.push(InputEvent::Modifiers(modifiers));
    }
    fn quit(&mut self) {
        self.push(InputEvent::Quit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_keys_sit_above_ascii() {
        assert_eq!(KeyCode::special(SpecialKey::F1), KeyCode(129));
        assert_eq!(KeyCode::special(SpecialKey::Insert), KeyCode(236));
        assert!(KeyCode::special(SpecialKey::Left).is_special());
        assert_eq!(KeyCode::special(SpecialKey::Up).as_char(), None);
    }

    #[test]
    fn ascii_range_is_one_to_127() {
        assert_eq!(KeyCode::ascii(0), None);
        assert_eq!(KeyCode::ascii('a' as u32), Some(KeyCode(b'a')));
        assert_eq!(KeyCode::ascii(127), Some(KeyCode(127)));
        assert_eq!(KeyCode::ascii(128), None);
        assert_eq!(KeyCode::ascii('é' as u32), None);
    }

    #[test]
    fn wheel_buttons() {
        assert!(!MouseButton::Right.is_wheel());
        assert!(MouseButton::WheelUp.is_wheel());
        assert_eq!(MouseButton::WheelRight.id(), 6);
    }

    #[test]
    fn shared_queue_records_through_the_rc() {
        let queue = QueuedEvents::shared();
        let mut sink: SharedSink = queue.clone();
        sink.mouse(MouseButton::Left, false, 4, 5);
        sink.quit();

        let mut queue = queue.borrow_mut();
        assert!(queue.quit_requested());
        let events: Vec<_> = queue.drain().collect();
        assert_eq!(
            events,
            vec![
                InputEvent::Mouse { button: MouseButton::Left, released: false, x: 4, y: 5 },
                InputEvent::Quit,
            ]
        );
        assert!(queue.is_empty());
    }
}
