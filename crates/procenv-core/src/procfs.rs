//! Process enumeration and environment stream access.
//!
//! [`ProcessSource`] is the seam between the probe and the OS. [`ProcFs`]
//! implements it over a procfs-style hierarchy: one directory per live
//! process, named by its decimal pid, each holding an `environ` file.

use crate::error::{Error, Result};
use crate::Pid;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::trace;

/// Default process root
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Name of the per-process environment file
const ENVIRON_FILE: &str = "environ";

/// Source of process ids and their environment streams
pub trait ProcessSource {
    /// Readable environment stream of one process
    type Stream: Read;

    /// Lists the currently visible process ids.
    ///
    /// Failure to list at all is fatal to the scan.
    fn list_pids(&self) -> Result<Vec<Pid>>;

    /// Location of the environment stream of `pid`, used in diagnostics
    fn environ_path(&self, pid: Pid) -> PathBuf;

    /// Opens the environment stream of `pid` read-only
    fn open_environ(&self, pid: Pid) -> io::Result<Self::Stream>;
}

/// Process source backed by a procfs mount
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new(DEFAULT_PROC_ROOT)
    }
}

impl ProcFs {
    /// Creates a source rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The process root
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ProcessSource for ProcFs {
    type Stream = File;

    fn list_pids(&self) -> Result<Vec<Pid>> {
        let entries =
            fs::read_dir(&self.root).map_err(|e| Error::proc_root_read(&self.root, e))?;

        let mut pids: Vec<Pid> = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    trace!("Skipping unreadable entry in {}: {}", self.root.display(), e);
                    None
                }
            })
            .filter_map(|entry| entry.file_name().to_str().and_then(parse_pid))
            .collect();

        pids.sort_unstable();
        pids.dedup();
        Ok(pids)
    }

    fn environ_path(&self, pid: Pid) -> PathBuf {
        self.root.join(pid.to_string()).join(ENVIRON_FILE)
    }

    fn open_environ(&self, pid: Pid) -> io::Result<File> {
        File::open(self.environ_path(pid))
    }
}

/// Parse a process directory name; only all-digit names are pids
pub fn parse_pid(name: &str) -> Option<Pid> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_pid() {
        assert_eq!(parse_pid("1218"), Some(1218));
        assert_eq!(parse_pid("0"), Some(0));
        assert_eq!(parse_pid("self"), None);
        assert_eq!(parse_pid("12a"), None);
        assert_eq!(parse_pid("+12"), None);
        assert_eq!(parse_pid(""), None);
        assert_eq!(parse_pid("99999999999"), None);
    }

    #[test]
    fn test_list_pids_filters_and_sorts() {
        let root = TempDir::new().unwrap();
        for name in ["300", "12", "self", "sys", "1"] {
            fs::create_dir(root.path().join(name)).unwrap();
        }
        fs::write(root.path().join("uptime"), "1.0 2.0\n").unwrap();

        let source = ProcFs::new(root.path());
        assert_eq!(source.list_pids().unwrap(), vec![1, 12, 300]);
    }

    #[test]
    fn test_list_pids_missing_root() {
        let root = TempDir::new().unwrap();
        let source = ProcFs::new(root.path().join("missing"));
        let err = source.list_pids().unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, Error::ProcRootRead { .. }));
    }

    #[test]
    fn test_open_environ() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("42")).unwrap();
        fs::write(root.path().join("42").join("environ"), b"A=1\0").unwrap();

        let source = ProcFs::new(root.path());
        assert_eq!(source.environ_path(42), root.path().join("42/environ"));

        let mut data = Vec::new();
        source.open_environ(42).unwrap().read_to_end(&mut data).unwrap();
        assert_eq!(data, b"A=1\0");

        assert!(source.open_environ(43).is_err());
    }
}
