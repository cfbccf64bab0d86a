//! Ordered release of a window's native and GPU handles.
//!
//! Handles are acquired native surface first and decoration last, and must
//! be released in exactly the reverse order. Any prefix of them may exist
//! when construction fails part way, so every step has to tolerate a handle
//! that was never created.

/// One release step, in the order [`OrderedTeardown::tear_down`] runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Decoration,
    GpuContext,
    GpuSurface,
    NativeWindow,
    NativeSurface,
}

impl Stage {
    pub const ORDER: [Stage; 5] = [
        Stage::Decoration,
        Stage::GpuContext,
        Stage::GpuSurface,
        Stage::NativeWindow,
        Stage::NativeSurface,
    ];
}

/// Implemented by whatever holds a window's handles.
///
/// Each `release_*` returns whether a handle was actually released; it must
/// do nothing when the handle is absent.
pub trait OrderedTeardown {
    fn release_decoration(&mut self) -> bool;
    fn release_gpu_context(&mut self) -> bool;
    fn release_gpu_surface(&mut self) -> bool;
    /// The GPU-compatible native sub-surface (`wl_egl_window` on Wayland).
    fn release_native_window(&mut self) -> bool;
    fn release_native_surface(&mut self) -> bool;

    /// Runs every step in order and returns the stages that released something.
    /// Calling it again releases nothing.
    fn tear_down(&mut self) -> Vec<Stage> {
        let mut released = Vec::with_capacity(Stage::ORDER.len());
        for stage in Stage::ORDER {
            let did_release = match stage {
                Stage::Decoration => self.release_decoration(),
                Stage::GpuContext => self.release_gpu_context(),
                Stage::GpuSurface => self.release_gpu_surface(),
                Stage::NativeWindow => self.release_native_window(),
                Stage::NativeSurface => self.release_native_surface(),
            };
            if did_release {
                released.push(stage);
            }
        }
        if !released.is_empty() {
            tracing::debug!(?released, "Window resources released");
        }
        released
    }
}
