//! Error handling for the NovaDE display layer.
//!
//! The main error type is [`DisplayError`]. It distinguishes failures the
//! window registry can recover from by trying the next backend
//! ([`DisplayError::is_recoverable`]) from failures that end the session,
//! such as a protocol error reported by the display server.
//!
//! Configuration and logging have their own enums, [`ConfigError`] and
//! [`LoggingError`], which are wrapped by [`DisplayError`] when they cross
//! into window construction.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for window construction and the per-frame window calls.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// No connection to a display server could be established.
    #[error("Display server unreachable: {0}")]
    Unreachable(String),

    /// The GPU binding library is missing or older than required.
    #[error("Unsupported GPU binding: {0}")]
    Unsupported(String),

    /// A native or GPU resource could not be created.
    #[error("Failed to create {resource}: {reason}")]
    ResourceCreation {
        resource: &'static str,
        reason: String,
    },

    /// A GPU call on an already constructed window failed.
    #[error("GPU call '{operation}' failed: {reason}")]
    Gpu {
        operation: &'static str,
        reason: String,
    },

    /// The display server or decoration protocol reported an error.
    /// There is no way to continue the session after this.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The compositor never configured the new top-level.
    #[error("Window was not mapped within {timeout_ms} ms")]
    MapTimeout { timeout_ms: u64 },

    /// A window call was made from a thread other than the one that created it.
    #[error("'{operation}' called off the window's owning thread")]
    WrongThread { operation: &'static str },

    /// A descriptor parameter could not be interpreted.
    #[error("Invalid window parameter: {0}")]
    InvalidParameter(#[from] UriError),

    /// No registered factory produced a window for the scheme.
    #[error("No backend could open a window for scheme '{scheme}' ({attempts} attempted)")]
    NoBackend { scheme: String, attempts: usize },

    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),
}

impl DisplayError {
    /// Whether the registry may fall back to the next backend after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DisplayError::Unreachable(_)
                | DisplayError::Unsupported(_)
                | DisplayError::ResourceCreation { .. }
                | DisplayError::MapTimeout { .. }
        )
    }

    /// Reclassifies an error raised while a window is still being built.
    ///
    /// Until construction succeeds no window exists, so a dropped connection
    /// or a failed first make-current only means this backend is unusable.
    /// Protocol errors stay fatal.
    pub fn during_construction(self) -> Self {
        match self {
            DisplayError::Io(e) => DisplayError::Unreachable(format!("connection lost while opening window: {e}")),
            DisplayError::Gpu { operation, reason } => DisplayError::ResourceCreation {
                resource: operation,
                reason,
            },
            other => other,
        }
    }

    pub(crate) fn gpu(operation: &'static str, reason: impl ToString) -> Self {
        DisplayError::Gpu {
            operation,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn resource(resource: &'static str, reason: impl ToString) -> Self {
        DisplayError::ResourceCreation {
            resource,
            reason: reason.to_string(),
        }
    }
}

/// Errors raised while parsing a window descriptor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UriError {
    #[error("Empty descriptor")]
    Empty,

    #[error("Unterminated parameter block in '{0}'")]
    Unterminated(String),

    #[error("Parameter '{key}' has value '{value}' that cannot be read as {expected}")]
    BadValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// Error type for configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file from {path:?}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`crate::config::DisplayConfig`].
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Parsed values are out of range.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// The user configuration directory could not be determined.
    #[error("Could not determine the {dir_type} directory")]
    DirectoryUnavailable { dir_type: String },
}

/// Errors raised while installing the global tracing subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log level '{0}'")]
    InvalidLevel(String),

    #[error("Failed to create log directory {path:?}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Logging initialization failed: {0}")]
    InitializationFailure(String),
}
