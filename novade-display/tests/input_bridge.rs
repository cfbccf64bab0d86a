use novade_display::input::codes::{BTN_LEFT, BTN_MIDDLE, BTN_RIGHT, REL_X, REL_Y};
use novade_display::input::{InputBridge, KeySymbolResolver, ModifierMasks};
use novade_display::{InputEvent, KeyCode, MouseButton, QueuedEvents};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::cell::Cell;
use std::rc::Rc;

/// Maps every key to one character and counts how often it is dropped.
struct ConstantKeymap {
    produces: char,
    drops: Rc<Cell<u32>>,
}

impl KeySymbolResolver for ConstantKeymap {
    fn key_utf32(&self, _code: u32) -> u32 {
        self.produces as u32
    }
    fn update_modifiers(&mut self, _masks: ModifierMasks) {}
}

impl Drop for ConstantKeymap {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

#[rstest]
#[case(BTN_LEFT, MouseButton::Left)]
#[case(BTN_MIDDLE, MouseButton::Middle)]
#[case(BTN_RIGHT, MouseButton::Right)]
fn press_then_release_toggles_latch_once(#[case] code: u32, #[case] button: MouseButton) {
    let mut bridge = InputBridge::<u32>::new();
    let mut sink = QueuedEvents::new();

    bridge.pointer_button(code, true, &mut sink);
    assert!(bridge.state().pressed);
    bridge.pointer_button(code, false, &mut sink);
    assert!(!bridge.state().pressed);

    let events: Vec<_> = sink.drain().collect();
    assert_eq!(
        events,
        vec![
            InputEvent::Mouse { button, released: false, x: 0, y: 0 },
            InputEvent::Mouse { button, released: true, x: 0, y: 0 },
        ]
    );
}

#[rstest]
#[case(BTN_LEFT)]
#[case(BTN_RIGHT)]
fn leave_clears_latch_before_release(#[case] code: u32) {
    let mut bridge = InputBridge::<u32>::new();
    let mut sink = QueuedEvents::new();

    bridge.pointer_button(code, true, &mut sink);
    bridge.pointer_leave();
    assert!(!bridge.state().pressed);
    bridge.pointer_motion(5.0, 5.0, &mut sink);
    bridge.pointer_button(code, false, &mut sink);
    assert!(!bridge.state().pressed);

    let events: Vec<_> = sink.drain().collect();
    assert_eq!(events[1], InputEvent::PassiveMotion { x: 5, y: 5 });
}

#[rstest]
#[case(0.0, 0.0)]
#[case(-12.75, 300.5)]
#[case(1919.99, 1079.01)]
fn motion_is_classified_by_latch(#[case] x: f64, #[case] y: f64) {
    let mut bridge = InputBridge::<u32>::new();
    let mut sink = QueuedEvents::new();
    let (ix, iy) = (x as i32, y as i32);

    bridge.pointer_motion(x, y, &mut sink);
    bridge.pointer_button(BTN_LEFT, true, &mut sink);
    bridge.pointer_motion(x, y, &mut sink);

    let events: Vec<_> = sink.drain().collect();
    assert_eq!(events[0], InputEvent::PassiveMotion { x: ix, y: iy });
    assert_eq!(events[2], InputEvent::Motion { x: ix, y: iy });
}

#[rstest]
#[case(REL_X, -1.0, Some(3))]
#[case(REL_X, 1.0, Some(4))]
#[case(REL_Y, -1.0, Some(5))]
#[case(REL_Y, 1.0, Some(6))]
#[case(2, 1.0, None)]
#[case(42, -1.0, None)]
fn scroll_maps_to_wheel_ids(#[case] axis: u32, #[case] value: f64, #[case] expected: Option<u8>) {
    let mut bridge = InputBridge::<u32>::new();
    let mut sink = QueuedEvents::new();
    bridge.pointer_axis(axis, value, &mut sink);

    let ids: Vec<u8> = sink
        .drain()
        .map(|event| match event {
            InputEvent::Mouse { button, released, .. } => {
                assert!(!released);
                button.id()
            }
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(ids, expected.into_iter().collect::<Vec<_>>());
}

#[test]
fn keymap_replacement_is_atomic() {
    let drops = Rc::new(Cell::new(0));
    let mut bridge = InputBridge::<u32>::new();
    let mut sink = QueuedEvents::new();
    let keymap = |produces| {
        Box::new(ConstantKeymap {
            produces,
            drops: drops.clone(),
        })
    };

    let mut installed = Vec::new();
    for (round, produces) in ['a', 'b', 'c', 'd'].into_iter().enumerate() {
        bridge.replace_keymap(keymap(produces));
        assert_eq!(drops.get(), round as u32);
        installed.push(produces);
        bridge.keyboard_key(30, true, &mut sink);
        bridge.keyboard_key(30, false, &mut sink);
    }

    let resolved: Vec<char> = sink
        .drain()
        .filter_map(|event| match event {
            InputEvent::KeyDown { key, .. } => key.as_char(),
            _ => None,
        })
        .collect();
    assert_eq!(resolved, installed);

    drop(bridge);
    assert_eq!(drops.get(), 4);
}

#[test]
fn press_then_drag_scenario() {
    let mut bridge = InputBridge::<u32>::new();
    let mut sink = QueuedEvents::new();

    bridge.pointer_motion(100.0, 100.0, &mut sink);
    sink.drain().for_each(drop);

    bridge.pointer_button(BTN_LEFT, true, &mut sink);
    bridge.pointer_motion(110.0, 100.0, &mut sink);

    let events: Vec<_> = sink.drain().collect();
    assert_eq!(
        events,
        vec![
            InputEvent::Mouse { button: MouseButton::Left, released: false, x: 100, y: 100 },
            InputEvent::Motion { x: 110, y: 100 },
        ]
    );
}

#[test]
fn key_codes_fit_the_sink_vocabulary() {
    let mut bridge = InputBridge::<u32>::new();
    let drops = Rc::new(Cell::new(0));
    bridge.replace_keymap(Box::new(ConstantKeymap { produces: 'Z', drops }));
    let mut sink = QueuedEvents::new();
    bridge.keyboard_key(44, true, &mut sink);
    let events: Vec<_> = sink.drain().collect();
    assert_eq!(events, vec![InputEvent::KeyDown { key: KeyCode(b'Z'), x: 0, y: 0 }]);
}
