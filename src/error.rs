//! Custom error types for query-perf.
//!
//! The taxonomy is narrow on purpose: this is an advisory tool with no
//! persistent or networked state, so almost everything here is fatal setup
//! trouble rather than recoverable runtime failure.

use std::path::PathBuf;
use thiserror::Error;

/// A type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during query-perf operation.
#[derive(Debug, Error)]
pub enum Error {
    /// A host primitive was absent at setup - nothing to instrument.
    #[error("host library operation '{name}' is missing; cannot instrument")]
    MissingOperation {
        /// Name of the missing primitive (`find`, `bind`, or `unbind`).
        name: &'static str,
    },

    /// Failed to load or parse configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Failed to read or parse a recorded call trace.
    #[error("Failed to read trace {path}: {message}")]
    Trace {
        /// Path to the trace file.
        path: PathBuf,
        /// Description of the problem.
        message: String,
    },

    /// Failed to read or access a file.
    #[error("IO error for {path}: {source}")]
    Io {
        /// Path to the file that caused the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error without path context.
    #[error("IO error: {0}")]
    IoGeneric(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a trace error for a specific file.
    pub fn trace(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Trace {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an IO error for a specific file.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
