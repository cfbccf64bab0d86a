#![cfg(feature = "headless")]

use novade_display::backend::headless::HeadlessWindow;
use novade_display::{InputEvent, QueuedEvents, WindowInterface, WindowParams};
use std::cell::RefCell;
use std::rc::Rc;
use pretty_assertions::assert_eq;

/// Opens a pbuffer window, or `None` when this machine has no usable EGL.
fn open(width: u32, height: u32, events: &Rc<RefCell<QueuedEvents>>) -> Option<HeadlessWindow> {
    let params = WindowParams {
        width,
        height,
        ..WindowParams::default()
    };
    match HeadlessWindow::open(&params, events.clone()) {
        Ok(window) => Some(window),
        Err(err) if err.is_recoverable() => {
            eprintln!("skipping, no EGL pbuffer support: {err}");
            None
        }
        Err(err) => panic!("unexpected error: {err}"),
    }
}

#[test]
fn closing_one_window_keeps_the_other_usable() {
    let events = QueuedEvents::shared();
    let Some(first) = open(64, 64, &events) else {
        return;
    };
    let Some(mut second) = open(32, 32, &events) else {
        return;
    };

    drop(first);

    second.make_current().unwrap();
    second.swap_buffers().unwrap();
    second.resize(48, 48).unwrap();
    assert_eq!(second.size(), (48, 48));
}

#[test]
fn first_process_events_reports_the_size() {
    let events = QueuedEvents::shared();
    let Some(mut window) = open(320, 200, &events) else {
        return;
    };

    window.process_events().unwrap();
    window.process_events().unwrap();
    window.resize(640, 400).unwrap();
    window.process_events().unwrap();

    let received: Vec<_> = events.borrow_mut().drain().collect();
    assert_eq!(
        received,
        vec![
            InputEvent::Resize { width: 320, height: 200 },
            InputEvent::Resize { width: 640, height: 400 },
        ]
    );
}
