//! # procenv-core
//!
//! A library for collecting environment variables of running processes.
//!
//! This crate provides the core functionality for:
//! - Enumerating process ids under a procfs-style process root
//! - Incrementally splitting NUL-separated `environ` streams into records
//! - Filtering processes and variables with caller-supplied pattern entities
//! - Emitting matches, and per-process diagnostics, as result items
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`splitter`]: Streaming record extraction from environment streams
//! - [`procfs`]: Process enumeration and stream access
//! - [`pattern`]: Pid and name pattern entities
//! - [`item`]: Result items and sinks
//! - [`probe`]: Scan orchestration
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use procenv_core::{NamePattern, PidPattern, Probe, ProbeConfig, ResultItem};
//!
//! let probe = Probe::new(ProbeConfig::new());
//! let mut items: Vec<ResultItem> = Vec::new();
//!
//! // Pid 0 stands for the scanning process itself
//! probe.scan(PidPattern::self_pid(), &NamePattern::equals("HOME"), &mut items)?;
//!
//! for item in items {
//!     println!("{:?}", item);
//! }
//! # Ok::<(), procenv_core::Error>(())
//! ```
//!
//! ## Extensibility
//!
//! The library provides several traits for customization:
//!
//! - [`PidMatcher`] / [`NameMatcher`]: Plug in other comparison semantics
//! - [`ProcessSource`]: Scan something other than a procfs mount
//! - [`ItemSink`]: Route result items elsewhere
//!

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod error;
pub mod item;
pub mod pattern;
pub mod probe;
pub mod procfs;
pub mod splitter;

// Re-export primary types for convenience
pub use error::{Error, Result};
pub use item::{ItemSink, ItemStatus, ResultItem};
pub use pattern::{NameMatcher, NamePattern, Operation, PidMatcher, PidPattern};
pub use probe::{Probe, ProbeConfig, ScanSummary};
pub use procfs::{ProcFs, ProcessSource};
pub use splitter::{EnvironRecord, RecordSplitter, SplitStats};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// OS-assigned process id
pub type Pid = u32;
