//! Platform backends and their registration.

#[cfg(feature = "egl")]
pub mod egl;
#[cfg(feature = "headless")]
pub mod headless;
#[cfg(feature = "wayland")]
pub mod wayland;

use crate::config::DisplayConfig;
use crate::registry::FactoryRegistry;

/// Precedence of the headless backend under `"default"`: after every
/// on-screen backend.
#[cfg(feature = "headless")]
pub const HEADLESS_DEFAULT_PRECEDENCE: u32 = 100;

/// Registers every backend compiled into this build.
#[cfg_attr(not(feature = "wayland"), allow(unused_variables))]
pub fn register_platform_backends(registry: &mut FactoryRegistry, config: &DisplayConfig) {
    #[cfg(feature = "wayland")]
    {
        let factory = std::rc::Rc::new(wayland::WaylandFactory::new(config.wayland.clone()));
        for (scheme, precedence) in wayland::REGISTRATIONS {
            registry.register(scheme, precedence, factory.clone());
        }
    }

    #[cfg(feature = "headless")]
    {
        let factory = std::rc::Rc::new(headless::HeadlessFactory);
        registry.register(headless::SCHEME, headless::PRECEDENCE, factory.clone());
        registry.register("default", HEADLESS_DEFAULT_PRECEDENCE, factory);
    }

    tracing::debug!(schemes = ?registry.schemes(), "Platform backends registered");
}

/// A registry with window defaults from `config` and every compiled backend.
pub fn platform_registry(config: &DisplayConfig) -> FactoryRegistry {
    let mut registry = FactoryRegistry::new(config.window.clone());
    register_platform_backends(&mut registry, config);
    registry
}

#[cfg(all(test, feature = "headless"))]
mod tests {
    use super::*;

    #[test]
    fn headless_is_the_last_default() {
        let registry = platform_registry(&DisplayConfig::default());
        assert_eq!(registry.candidates("headless"), vec!["headless"]);
        assert_eq!(registry.candidates("default").last(), Some(&"headless"));
    }

    #[cfg(feature = "wayland")]
    #[test]
    fn wayland_precedes_headless_by_default() {
        let registry = platform_registry(&DisplayConfig::default());
        assert_eq!(registry.candidates("default"), vec!["wayland", "headless"]);
        assert_eq!(registry.candidates("linux"), vec!["wayland"]);
    }
}
