//! EGL display, config, context and surface handling shared by backends.
//!
//! libEGL is loaded at runtime. A missing library or one older than EGL 1.4
//! is reported as [`DisplayError::Unsupported`] so the registry can fall
//! back to another backend instead of the process failing to start.

use crate::error::DisplayError;
use crate::window::{ProcAddress, WindowParams};
use khronos_egl as egl;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

type Egl = egl::DynamicInstance<egl::EGL1_4>;

const MIN_VERSION: (egl::Int, egl::Int) = (1, 4);

// EGL_KHR_create_context
const CONTEXT_MAJOR_VERSION_KHR: egl::Int = 0x3098;
const CONTEXT_MINOR_VERSION_KHR: egl::Int = 0x30FB;
const CONTEXT_OPENGL_PROFILE_MASK_KHR: egl::Int = 0x30FD;
const CONTEXT_OPENGL_CORE_PROFILE_BIT_KHR: egl::Int = 0x1;

/// Kind of surface a config has to support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Window,
    Pbuffer,
}

impl SurfaceKind {
    fn bit(self) -> egl::Int {
        match self {
            SurfaceKind::Window => egl::WINDOW_BIT,
            SurfaceKind::Pbuffer => egl::PBUFFER_BIT,
        }
    }
}

/// Framebuffer attributes every window is created with: 8-bit RGB,
/// 24-bit depth, 8-bit stencil, desktop OpenGL.
pub fn config_attributes(kind: SurfaceKind, params: &WindowParams, multisample: bool) -> Vec<egl::Int> {
    let mut attribs = vec![
        egl::SURFACE_TYPE,
        kind.bit(),
        egl::RENDERABLE_TYPE,
        egl::OPENGL_BIT,
        egl::RED_SIZE,
        8,
        egl::GREEN_SIZE,
        8,
        egl::BLUE_SIZE,
        8,
        egl::DEPTH_SIZE,
        24,
        egl::STENCIL_SIZE,
        8,
    ];
    if multisample && params.sample_buffers > 0 && params.samples > 1 {
        attribs.extend([
            egl::SAMPLE_BUFFERS,
            params.sample_buffers as egl::Int,
            egl::SAMPLES,
            params.samples as egl::Int,
        ]);
    }
    attribs.push(egl::NONE);
    attribs
}

/// Live values keyed by native display handle.
///
/// `eglGetDisplay` returns the same `EGLDisplay` for the same native
/// display, and `eglTerminate` on it invalidates every context created from
/// it. Sharing one value per handle keeps termination for the last user.
#[derive(Debug)]
pub(crate) struct DisplayCache<T> {
    entries: HashMap<usize, Weak<T>>,
}

impl<T> Default for DisplayCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> DisplayCache<T> {
    /// Returns the live value for `key`, or stores the one `create` builds.
    pub(crate) fn get_or_try_insert<E>(
        &mut self,
        key: usize,
        create: impl FnOnce() -> Result<T, E>,
    ) -> Result<Rc<T>, E> {
        self.entries.retain(|_, weak| weak.strong_count() > 0);
        if let Some(live) = self.entries.get(&key).and_then(Weak::upgrade) {
            return Ok(live);
        }
        let value = Rc::new(create()?);
        self.entries.insert(key, Rc::downgrade(&value));
        Ok(value)
    }
}

thread_local! {
    static OPEN_DISPLAYS: RefCell<DisplayCache<EglDisplay>> = RefCell::new(DisplayCache::default());
}

/// An initialized EGL display. Terminated on drop, after every context and
/// surface created from it has been released.
pub struct EglDisplay {
    instance: Egl,
    display: egl::Display,
    version: (egl::Int, egl::Int),
}

impl std::fmt::Debug for EglDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EglDisplay")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl EglDisplay {
    /// Opens the EGL display for a native display handle. Pass
    /// [`egl::DEFAULT_DISPLAY`] for the platform default.
    ///
    /// Windows on the same native display share one initialized display,
    /// terminated when the last of them is dropped.
    pub fn open(native_display: egl::NativeDisplayType) -> Result<Rc<Self>, DisplayError> {
        OPEN_DISPLAYS.with(|displays| {
            displays
                .borrow_mut()
                .get_or_try_insert(native_display as usize, || Self::initialize(native_display))
        })
    }

    fn initialize(native_display: egl::NativeDisplayType) -> Result<Self, DisplayError> {
        // SAFETY: loading libEGL runs its initializers; nothing else is loaded concurrently here.
        let instance = unsafe { Egl::load_required() }
            .map_err(|e| DisplayError::Unsupported(format!("libEGL with EGL 1.4 not available: {e}")))?;

        // SAFETY: `native_display` is either the default display or a live connection
        // that outlives this EGL display.
        let display = unsafe { instance.get_display(native_display) }
            .ok_or_else(|| DisplayError::Unreachable("eglGetDisplay returned no display".into()))?;

        let version = instance
            .initialize(display)
            .map_err(|e| DisplayError::Unsupported(format!("eglInitialize failed: {e}")))?;
        if version < MIN_VERSION {
            let _ = instance.terminate(display);
            return Err(DisplayError::Unsupported(format!(
                "EGL {}.{} is older than {}.{}",
                version.0, version.1, MIN_VERSION.0, MIN_VERSION.1
            )));
        }

        // Rendering will fail later if this does not hold, but the display itself is usable.
        if let Err(e) = instance.bind_api(egl::OPENGL_API) {
            tracing::warn!(error = %e, "eglBindAPI(EGL_OPENGL_API) failed");
        }

        tracing::info!(major = version.0, minor = version.1, "EGL display initialized");
        Ok(Self {
            instance,
            display,
            version,
        })
    }

    pub fn version(&self) -> (egl::Int, egl::Int) {
        self.version
    }

    /// First config matching the fixed attribute set. Multisampling is
    /// requested when `params` asks for it and dropped if nothing matches.
    pub fn choose_config(&self, kind: SurfaceKind, params: &WindowParams) -> Result<egl::Config, DisplayError> {
        for multisample in [true, false] {
            let attribs = config_attributes(kind, params, multisample);
            match self.instance.choose_first_config(self.display, &attribs) {
                Ok(Some(config)) => return Ok(config),
                Ok(None) => {
                    tracing::debug!(multisample, ?kind, "No EGL config matched");
                }
                Err(e) => return Err(DisplayError::resource("EGL config", e)),
            }
        }
        Err(DisplayError::resource("EGL config", "no config with RGB8/D24/S8 and OpenGL"))
    }

    /// OpenGL 3.2 core profile context, or whatever the driver gives by
    /// default when it cannot do core profile.
    pub fn create_context(&self, config: egl::Config) -> Result<egl::Context, DisplayError> {
        let core = [
            CONTEXT_MAJOR_VERSION_KHR,
            3,
            CONTEXT_MINOR_VERSION_KHR,
            2,
            CONTEXT_OPENGL_PROFILE_MASK_KHR,
            CONTEXT_OPENGL_CORE_PROFILE_BIT_KHR,
            egl::NONE,
        ];
        match self.instance.create_context(self.display, config, None, &core) {
            Ok(context) => Ok(context),
            Err(e) => {
                tracing::debug!(error = %e, "Core profile context unavailable, using default attributes");
                self.instance
                    .create_context(self.display, config, None, &[egl::NONE])
                    .map_err(|e| DisplayError::resource("EGL context", e))
            }
        }
    }

    /// # Safety
    ///
    /// `native_window` must be a live native window (a `wl_egl_window` on
    /// Wayland) that outlives the returned surface.
    pub unsafe fn create_window_surface(
        &self,
        config: egl::Config,
        native_window: egl::NativeWindowType,
        double_buffered: bool,
    ) -> Result<egl::Surface, DisplayError> {
        let render_buffer = if double_buffered {
            egl::BACK_BUFFER
        } else {
            egl::SINGLE_BUFFER
        };
        let attribs = [egl::RENDER_BUFFER, render_buffer, egl::NONE];
        self.instance
            .create_window_surface(self.display, config, native_window, Some(&attribs))
            .map_err(|e| DisplayError::resource("EGL window surface", e))
    }

    pub fn create_pbuffer_surface(
        &self,
        config: egl::Config,
        width: u32,
        height: u32,
    ) -> Result<egl::Surface, DisplayError> {
        let attribs = [
            egl::WIDTH,
            width as egl::Int,
            egl::HEIGHT,
            height as egl::Int,
            egl::NONE,
        ];
        self.instance
            .create_pbuffer_surface(self.display, config, &attribs)
            .map_err(|e| DisplayError::resource("EGL pbuffer surface", e))
    }

    pub fn make_current(&self, surface: egl::Surface, context: egl::Context) -> Result<(), DisplayError> {
        self.instance
            .make_current(self.display, Some(surface), Some(surface), Some(context))
            .map_err(|e| DisplayError::gpu("eglMakeCurrent", e))
    }

    pub fn release_current(&self) -> Result<(), DisplayError> {
        self.instance
            .make_current(self.display, None, None, None)
            .map_err(|e| DisplayError::gpu("eglMakeCurrent(NONE)", e))
    }

    pub fn swap_buffers(&self, surface: egl::Surface) -> Result<(), DisplayError> {
        self.instance
            .swap_buffers(self.display, surface)
            .map_err(|e| DisplayError::gpu("eglSwapBuffers", e))
    }

    pub fn destroy_surface(&self, surface: egl::Surface) {
        if let Err(e) = self.instance.destroy_surface(self.display, surface) {
            tracing::warn!(error = %e, "eglDestroySurface failed");
        }
    }

    pub fn destroy_context(&self, context: egl::Context) {
        if let Err(e) = self.instance.destroy_context(self.display, context) {
            tracing::warn!(error = %e, "eglDestroyContext failed");
        }
    }

    pub fn proc_address(&self, name: &str) -> Option<ProcAddress> {
        self.instance.get_proc_address(name)
    }
}

impl Drop for EglDisplay {
    fn drop(&mut self) {
        if let Err(e) = self.instance.terminate(self.display) {
            tracing::warn!(error = %e, "eglTerminate failed");
        }
        tracing::debug!("EGL display terminated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_of(attribs: &[egl::Int], key: egl::Int) -> Option<egl::Int> {
        attribs
            .chunks(2)
            .find(|pair| pair[0] == key)
            .and_then(|pair| pair.get(1).copied())
    }

    #[test]
    fn fixed_attribute_set() {
        let attribs = config_attributes(SurfaceKind::Window, &WindowParams::default(), true);
        assert_eq!(attribs.last(), Some(&egl::NONE));
        assert_eq!(value_of(&attribs, egl::SURFACE_TYPE), Some(egl::WINDOW_BIT));
        assert_eq!(value_of(&attribs, egl::RENDERABLE_TYPE), Some(egl::OPENGL_BIT));
        assert_eq!(value_of(&attribs, egl::DEPTH_SIZE), Some(24));
        assert_eq!(value_of(&attribs, egl::STENCIL_SIZE), Some(8));
        // one sample means no multisampling
        assert_eq!(value_of(&attribs, egl::SAMPLES), None);
    }

    #[test]
    fn multisampling_only_when_requested() {
        let params = WindowParams {
            sample_buffers: 1,
            samples: 4,
            ..WindowParams::default()
        };
        let with = config_attributes(SurfaceKind::Pbuffer, &params, true);
        assert_eq!(value_of(&with, egl::SAMPLES), Some(4));
        assert_eq!(value_of(&with, egl::SURFACE_TYPE), Some(egl::PBUFFER_BIT));
        let without = config_attributes(SurfaceKind::Pbuffer, &params, false);
        assert_eq!(value_of(&without, egl::SAMPLES), None);
    }

    /// Counts terminations the way `EglDisplay::drop` would perform them.
    struct Terminating(Rc<std::cell::Cell<u32>>);

    impl Drop for Terminating {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn windows_on_one_display_share_it_until_the_last_drops() {
        let terminated = Rc::new(std::cell::Cell::new(0));
        let mut cache = DisplayCache::default();
        let mut created = 0;
        let mut open = |cache: &mut DisplayCache<Terminating>| {
            cache.get_or_try_insert(0, || {
                created += 1;
                Ok::<_, DisplayError>(Terminating(terminated.clone()))
            })
        };

        let first = open(&mut cache).unwrap();
        let second = open(&mut cache).unwrap();
        assert!(Rc::ptr_eq(&first, &second));

        drop(first);
        assert_eq!(terminated.get(), 0);
        drop(second);
        assert_eq!(terminated.get(), 1);

        let _third = open(&mut cache).unwrap();
        assert_eq!(created, 2);
    }

    #[test]
    fn distinct_native_displays_are_kept_apart() {
        let terminated = Rc::new(std::cell::Cell::new(0));
        let mut cache = DisplayCache::default();
        let a = cache
            .get_or_try_insert(1, || Ok::<_, ()>(Terminating(terminated.clone())))
            .unwrap();
        let b = cache
            .get_or_try_insert(2, || Ok::<_, ()>(Terminating(terminated.clone())))
            .unwrap();
        assert!(!Rc::ptr_eq(&a, &b));
        drop(a);
        assert_eq!(terminated.get(), 1);
        assert!(cache.get_or_try_insert(2, || Err(())).is_ok());
    }

    #[test]
    fn failed_initialization_is_not_cached() {
        let mut cache: DisplayCache<u32> = DisplayCache::default();
        let err = cache
            .get_or_try_insert(0, || Err(DisplayError::Unsupported("EGL 1.2".into())))
            .unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(*cache.get_or_try_insert(0, || Ok::<_, DisplayError>(7)).unwrap(), 7);
    }
}
