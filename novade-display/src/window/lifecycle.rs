//! Window state machine and size bookkeeping.
//!
//! `Created -> Mapped -> (resize | fullscreen)* -> Closing -> Destroyed`.
//! Backends feed native configure/close notifications in and apply the
//! sizes that come out.

use crate::events::EventSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPhase {
    Created,
    Mapped,
    Closing,
    Destroyed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowGeometry {
    /// Last size requested by the application, used when the compositor
    /// leaves the choice to us.
    windowed_size: (u32, u32),
    current_size: (u32, u32),
    fullscreen: bool,
    phase: WindowPhase,
    /// Close requested by the display server and not yet reported.
    close_pending: bool,
}

impl WindowGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            windowed_size: (width, height),
            current_size: (width, height),
            fullscreen: false,
            phase: WindowPhase::Created,
            close_pending: false,
        }
    }

    pub fn phase(&self) -> WindowPhase {
        self.phase
    }

    pub fn is_mapped(&self) -> bool {
        self.phase != WindowPhase::Created
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn size(&self) -> (u32, u32) {
        self.current_size
    }

    pub fn windowed_size(&self) -> (u32, u32) {
        self.windowed_size
    }

    /// Applies a configure from the display server and returns the size to
    /// render at. A missing or zero proposal means "pick your own size".
    pub fn configure(&mut self, proposed: Option<(u32, u32)>) -> (u32, u32) {
        let size = match proposed {
            Some((w, h)) if w > 0 && h > 0 => (w, h),
            _ => self.windowed_size,
        };
        if self.phase == WindowPhase::Created {
            self.phase = WindowPhase::Mapped;
        }
        self.current_size = size;
        size
    }

    /// Handles a configure notification: settles the size, reports it to
    /// `sink` and returns it for the GPU surface.
    pub fn on_configure(&mut self, proposed: Option<(u32, u32)>, sink: &mut dyn EventSink) -> (u32, u32) {
        let (width, height) = self.configure(proposed);
        sink.resize(width, height);
        (width, height)
    }

    /// Application resize request.
    pub fn request_resize(&mut self, width: u32, height: u32) -> (u32, u32) {
        self.windowed_size = (width, height);
        self.current_size = (width, height);
        self.current_size
    }

    /// Flips the fullscreen flag and returns the new value.
    pub fn toggle_fullscreen(&mut self) -> bool {
        self.fullscreen = !self.fullscreen;
        self.fullscreen
    }

    /// Returns false when the window was already closing or gone.
    pub fn request_close(&mut self) -> bool {
        match self.phase {
            WindowPhase::Created | WindowPhase::Mapped => {
                self.phase = WindowPhase::Closing;
                self.close_pending = true;
                true
            }
            WindowPhase::Closing | WindowPhase::Destroyed => false,
        }
    }

    /// Reports a pending close: `make_current` binds the window's context,
    /// then `sink` receives quit. The window stays alive for the owning
    /// loop to drop. Returns whether quit was sent.
    pub fn deliver_close<E>(
        &mut self,
        make_current: impl FnOnce() -> Result<(), E>,
        sink: &mut dyn EventSink,
    ) -> Result<bool, E> {
        if !self.close_pending {
            return Ok(false);
        }
        make_current()?;
        self.close_pending = false;
        sink.quit();
        Ok(true)
    }

    pub fn mark_destroyed(&mut self) {
        self.phase = WindowPhase::Destroyed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{InputEvent, QueuedEvents};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some((0, 0)))]
    #[case(Some((800, 0)))]
    fn unproposed_size_falls_back_to_windowed(#[case] proposed: Option<(u32, u32)>) {
        let mut geometry = WindowGeometry::new(640, 480);
        assert_eq!(geometry.configure(proposed), (640, 480));
        assert_eq!(geometry.phase(), WindowPhase::Mapped);
    }

    #[test]
    fn fallback_tracks_last_explicit_resize() {
        let mut geometry = WindowGeometry::new(640, 480);
        geometry.configure(Some((1920, 1080)));
        assert_eq!(geometry.size(), (1920, 1080));
        assert_eq!(geometry.windowed_size(), (640, 480));

        geometry.request_resize(800, 600);
        geometry.request_resize(800, 600);
        assert_eq!(geometry.configure(None), (800, 600));
    }

    #[test]
    fn close_is_requested_once() {
        let mut geometry = WindowGeometry::new(1, 1);
        assert!(geometry.request_close());
        assert!(!geometry.request_close());
        geometry.mark_destroyed();
        assert_eq!(geometry.phase(), WindowPhase::Destroyed);
        assert!(!geometry.request_close());
    }

    #[test]
    fn fullscreen_toggles() {
        let mut geometry = WindowGeometry::new(1, 1);
        assert!(geometry.toggle_fullscreen());
        assert!(!geometry.toggle_fullscreen());
    }

    #[rstest]
    #[case(None, (640, 480))]
    #[case(Some((0, 0)), (640, 480))]
    #[case(Some((1280, 720)), (1280, 720))]
    fn configure_reports_size_to_sink(#[case] proposed: Option<(u32, u32)>, #[case] expected: (u32, u32)) {
        let mut geometry = WindowGeometry::new(640, 480);
        let mut sink = QueuedEvents::new();

        assert_eq!(geometry.on_configure(proposed, &mut sink), expected);

        let events: Vec<_> = sink.drain().collect();
        assert_eq!(
            events,
            vec![InputEvent::Resize {
                width: expected.0,
                height: expected.1
            }]
        );
    }

    #[test]
    fn configure_after_resize_reports_requested_size() {
        let mut geometry = WindowGeometry::new(640, 480);
        let mut sink = QueuedEvents::new();
        geometry.on_configure(Some((1920, 1080)), &mut sink);
        geometry.request_resize(800, 600);
        sink.drain().for_each(drop);

        geometry.on_configure(None, &mut sink);
        let events: Vec<_> = sink.drain().collect();
        assert_eq!(events, vec![InputEvent::Resize { width: 800, height: 600 }]);
    }

    #[test]
    fn close_binds_context_then_quits_once() {
        let mut geometry = WindowGeometry::new(640, 480);
        let mut sink = QueuedEvents::new();
        let bound = std::cell::Cell::new(0);
        let bind = || -> Result<(), ()> {
            bound.set(bound.get() + 1);
            Ok(())
        };

        assert_eq!(geometry.deliver_close(bind, &mut sink), Ok(false));
        assert_eq!(bound.get(), 0);

        geometry.request_close();
        geometry.request_close();
        assert_eq!(geometry.deliver_close(bind, &mut sink), Ok(true));
        assert_eq!(geometry.deliver_close(bind, &mut sink), Ok(false));

        assert_eq!(bound.get(), 1);
        let events: Vec<_> = sink.drain().collect();
        assert_eq!(events, vec![InputEvent::Quit]);
        assert!(sink.quit_requested());
        assert_eq!(geometry.phase(), WindowPhase::Closing);
    }

    #[test]
    fn failed_context_bind_keeps_close_pending() {
        let mut geometry = WindowGeometry::new(640, 480);
        let mut sink = QueuedEvents::new();
        geometry.request_close();

        assert_eq!(geometry.deliver_close(|| Err("EGL_BAD_ACCESS"), &mut sink), Err("EGL_BAD_ACCESS"));
        assert!(sink.is_empty());
        assert_eq!(geometry.deliver_close(|| Ok::<_, &str>(()), &mut sink), Ok(true));
        assert_eq!(sink.drain().collect::<Vec<_>>(), vec![InputEvent::Quit]);
    }
}
