//! Window factory registry.
//!
//! Backends register a [`WindowFactory`] under one or more scheme names,
//! each with a precedence. Opening a descriptor tries every factory
//! registered for its scheme, lowest precedence value first, and returns the
//! first window produced. Recoverable failures (no display server, GPU
//! library too old, resource creation) move on to the next factory; any
//! other error ends the attempt.

use crate::config::WindowDefaults;
use crate::error::DisplayError;
use crate::events::SharedSink;
use crate::uri::Uri;
use crate::window::{WindowInterface, WindowParams};
use std::rc::Rc;

pub trait WindowFactory {
    /// Backend name used in logs.
    fn name(&self) -> &'static str;

    fn open(
        &self,
        params: &WindowParams,
        sink: SharedSink,
    ) -> Result<Box<dyn WindowInterface>, DisplayError>;
}

struct Registration {
    scheme: String,
    precedence: u32,
    factory: Rc<dyn WindowFactory>,
}

#[derive(Default)]
pub struct FactoryRegistry {
    registrations: Vec<Registration>,
    defaults: WindowDefaults,
}

impl FactoryRegistry {
    pub fn new(defaults: WindowDefaults) -> Self {
        Self {
            registrations: Vec::new(),
            defaults,
        }
    }

    pub fn defaults(&self) -> &WindowDefaults {
        &self.defaults
    }

    /// Registers `factory` for `scheme`. The same factory may be registered
    /// under several schemes. Equal precedences keep registration order.
    pub fn register(&mut self, scheme: &str, precedence: u32, factory: Rc<dyn WindowFactory>) {
        tracing::debug!(scheme, precedence, backend = factory.name(), "Registered window factory");
        self.registrations.push(Registration {
            scheme: scheme.to_string(),
            precedence,
            factory,
        });
    }

    /// Backend names for `scheme`, in the order they would be tried.
    pub fn candidates(&self, scheme: &str) -> Vec<&'static str> {
        self.ordered(scheme).iter().map(|r| r.factory.name()).collect()
    }

    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.registrations.iter().map(|r| r.scheme.as_str()).collect();
        schemes.sort_unstable();
        schemes.dedup();
        schemes
    }

    pub fn open(&self, uri: &Uri, sink: SharedSink) -> Result<Box<dyn WindowInterface>, DisplayError> {
        let params = WindowParams::from_uri(uri, &self.defaults)?;
        let candidates = self.ordered(&uri.scheme);
        let mut attempts = 0;

        for registration in candidates {
            attempts += 1;
            let backend = registration.factory.name();
            match registration.factory.open(&params, sink.clone()) {
                Ok(window) => {
                    tracing::info!(
                        scheme = %uri.scheme,
                        backend,
                        width = params.width,
                        height = params.height,
                        "Opened window"
                    );
                    return Ok(window);
                }
                Err(err) if err.is_recoverable() => {
                    tracing::warn!(scheme = %uri.scheme, backend, error = %err, "Backend unavailable, trying next");
                }
                Err(err) => {
                    tracing::error!(scheme = %uri.scheme, backend, error = %err, "Backend failed");
                    return Err(err);
                }
            }
        }

        Err(DisplayError::NoBackend {
            scheme: uri.scheme.clone(),
            attempts,
        })
    }

    /// Parses `descriptor` and opens it.
    pub fn open_descriptor(
        &self,
        descriptor: &str,
        sink: SharedSink,
    ) -> Result<Box<dyn WindowInterface>, DisplayError> {
        let uri: Uri = descriptor.parse()?;
        self.open(&uri, sink)
    }

    fn ordered(&self, scheme: &str) -> Vec<&Registration> {
        let mut matching: Vec<&Registration> =
            self.registrations.iter().filter(|r| r.scheme == scheme).collect();
        matching.sort_by_key(|r| r.precedence);
        matching
    }
}
