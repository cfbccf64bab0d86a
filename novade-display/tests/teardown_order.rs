use novade_display::window::{OrderedTeardown, Stage};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::cell::RefCell;
use std::rc::Rc;

type ReleaseLog = Rc<RefCell<Vec<Stage>>>;

/// A native handle that must be released exactly once.
struct Handle {
    stage: Stage,
    log: ReleaseLog,
}

impl Handle {
    fn release(self) {
        self.log.borrow_mut().push(self.stage);
    }
}

/// Window handles as a backend holds them, any subset possibly missing.
#[derive(Default)]
struct PartialWindow {
    decoration: Option<Handle>,
    gpu_context: Option<Handle>,
    gpu_surface: Option<Handle>,
    native_window: Option<Handle>,
    native_surface: Option<Handle>,
}

/// Creation order: native surface, native window, context, GPU surface, decoration.
const ACQUISITION: [Stage; 5] = [
    Stage::NativeSurface,
    Stage::NativeWindow,
    Stage::GpuContext,
    Stage::GpuSurface,
    Stage::Decoration,
];

impl PartialWindow {
    /// Builds the window, failing right before acquisition step `fail_at`.
    fn construct(fail_at: usize, log: &ReleaseLog) -> Self {
        let mut window = PartialWindow::default();
        for stage in ACQUISITION.into_iter().take(fail_at) {
            let handle = Some(Handle {
                stage,
                log: log.clone(),
            });
            match stage {
                Stage::NativeSurface => window.native_surface = handle,
                Stage::NativeWindow => window.native_window = handle,
                Stage::GpuContext => window.gpu_context = handle,
                Stage::GpuSurface => window.gpu_surface = handle,
                Stage::Decoration => window.decoration = handle,
            }
        }
        window
    }
}

fn release(slot: &mut Option<Handle>) -> bool {
    slot.take().map(Handle::release).is_some()
}

impl OrderedTeardown for PartialWindow {
    fn release_decoration(&mut self) -> bool {
        release(&mut self.decoration)
    }
    fn release_gpu_context(&mut self) -> bool {
        release(&mut self.gpu_context)
    }
    fn release_gpu_surface(&mut self) -> bool {
        release(&mut self.gpu_surface)
    }
    fn release_native_window(&mut self) -> bool {
        release(&mut self.native_window)
    }
    fn release_native_surface(&mut self) -> bool {
        release(&mut self.native_surface)
    }
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(4)]
#[case(5)]
fn teardown_after_partial_construction(#[case] fail_at: usize) {
    let log = ReleaseLog::default();
    let mut window = PartialWindow::construct(fail_at, &log);

    let released = window.tear_down();

    let mut acquired: Vec<Stage> = ACQUISITION[..fail_at].to_vec();
    acquired.sort();
    assert_eq!(released, acquired);
    assert_eq!(*log.borrow(), acquired);
    assert!(window.tear_down().is_empty());
    assert_eq!(log.borrow().len(), fail_at);
}

#[test]
fn full_teardown_follows_fixed_order() {
    let log = ReleaseLog::default();
    let mut window = PartialWindow::construct(ACQUISITION.len(), &log);
    window.tear_down();
    assert_eq!(
        *log.borrow(),
        vec![
            Stage::Decoration,
            Stage::GpuContext,
            Stage::GpuSurface,
            Stage::NativeWindow,
            Stage::NativeSurface,
        ]
    );
}
