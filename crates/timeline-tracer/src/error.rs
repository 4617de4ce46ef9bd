//! Tracing error types

use core::fmt;
use std::path::PathBuf;

/// Tracing errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    /// A session is already active
    #[error("Tracing is already enabled; disable the active session first")]
    AlreadyEnabled,

    /// No session is active
    #[error("Tracing is not enabled")]
    NotEnabled,

    /// Invalid configuration
    #[error("Invalid tracing configuration: {0}")]
    InvalidConfiguration(String),

    /// The trace destination could not be opened or written
    #[error("Trace output error at {}: {source}", path.display())]
    Io {
        /// Destination that failed
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// An event could not be encoded
    #[error("Trace serialization failed: {0}")]
    Serialization(String),
}

impl TracingError {
    /// Check if this error is a caller bug rather than a runtime condition
    ///
    /// Misuse errors never change tracer state and never trigger an export.
    pub fn is_misuse(&self) -> bool {
        matches!(self, TracingError::AlreadyEnabled | TracingError::NotEnabled)
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            TracingError::AlreadyEnabled => false,
            TracingError::NotEnabled => false,
            TracingError::InvalidConfiguration(_) => false,
            TracingError::Io { .. } => true,
            TracingError::Serialization(_) => true,
        }
    }

    /// Create an I/O error bound to the destination path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TracingError::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error with context
    pub fn invalid_config(context: impl fmt::Display) -> Self {
        TracingError::InvalidConfiguration(context.to_string())
    }
}

impl From<serde_json::Error> for TracingError {
    fn from(err: serde_json::Error) -> Self {
        TracingError::Serialization(err.to_string())
    }
}
