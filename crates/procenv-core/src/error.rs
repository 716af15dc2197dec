//! Error types for the procenv-core library.
//!
//! Errors fall into two groups. Scan-level failures (an unreadable process
//! root, a sink that can no longer accept items) abort the whole pass.
//! Per-process failures are folded into diagnostic result items by the
//! [`Probe`](crate::Probe) and never unwind a scan.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for procenv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all procenv operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The process root could not be listed
    #[error("can't read process root '{path}': {source}")]
    ProcRootRead {
        /// Path of the process root
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A process environment stream could not be opened
    #[error("can't open '{path}': {source}")]
    EnvironOpen {
        /// Path of the environment stream
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A process environment stream failed while being read
    #[error("can't read '{path}': {source}")]
    EnvironRead {
        /// Path of the environment stream
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Pid pattern value outside the OS process id space
    #[error("pid value {value} is out of range")]
    PidOutOfRange {
        /// The rejected value
        value: i64,
    },

    /// Operation not defined for the entity datatype
    #[error("operation '{operation}' is not supported for {datatype} entities")]
    UnsupportedOperation {
        /// Textual name of the operation
        operation: String,
        /// Datatype of the entity (`int` or `string`)
        datatype: &'static str,
    },

    /// Operation name could not be parsed
    #[error("unknown operation: '{0}'")]
    UnknownOperation(String),

    /// Regular expression of a pattern match entity failed to compile
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The result sink failed to accept an item
    #[error("failed to write result item: {0}")]
    SinkWrite(#[source] std::io::Error),
}

impl Error {
    /// Creates a new process root read error
    pub fn proc_root_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ProcRootRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new environment open error
    pub fn environ_open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::EnvironOpen {
            path: path.into(),
            source,
        }
    }

    /// Creates a new environment read error
    pub fn environ_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::EnvironRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new unsupported operation error
    pub fn unsupported_operation(operation: impl ToString, datatype: &'static str) -> Self {
        Self::UnsupportedOperation {
            operation: operation.to_string(),
            datatype,
        }
    }

    /// Returns true if this error aborts the whole scan
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ProcRootRead { .. } | Self::SinkWrite(_))
    }

    /// Returns true if this is a per-process error that the scan skips past
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::EnvironOpen { .. } | Self::EnvironRead { .. })
    }
}
