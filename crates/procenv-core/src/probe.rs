//! Scan orchestration.
//!
//! A [`Probe`] runs one scan pass: list pids, filter them with the pid
//! entity, split each survivor's environment stream into records, filter
//! those with the name entity and hand matches to the sink. Processes are
//! handled strictly one after another; each stream and its buffer are
//! dropped before the next pid is opened.

use crate::error::{Error, Result};
use crate::item::{ItemSink, ResultItem};
use crate::pattern::{NameMatcher, PidMatcher};
use crate::procfs::{ProcFs, ProcessSource, DEFAULT_PROC_ROOT};
use crate::splitter::{RecordSplitter, DEFAULT_READ_INCREMENT};
use crate::Pid;
use std::path::PathBuf;
use tracing::{debug, trace, warn};

/// Configuration for the probe
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Root of the process hierarchy
    pub proc_root: PathBuf,
    /// Growth step of the per-process read buffer
    pub read_increment: usize,
    /// Maximum number of pid-matched processes to open (0 = unlimited)
    pub max_processes: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
            read_increment: DEFAULT_READ_INCREMENT,
            max_processes: 0,
        }
    }
}

impl ProbeConfig {
    /// Creates a new probe config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the process root
    pub fn proc_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.proc_root = root.into();
        self
    }

    /// Sets the read buffer growth step (clamped to at least 1)
    pub fn read_increment(mut self, increment: usize) -> Self {
        self.read_increment = increment.max(1);
        self
    }

    /// Sets the maximum number of processes to open
    pub fn max_processes(mut self, max: usize) -> Self {
        self.max_processes = max;
        self
    }
}

/// Counters for one scan pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Process ids listed under the process root
    pub processes_listed: usize,
    /// Process ids accepted by the pid entity and opened
    pub processes_matched: usize,
    /// Collected items emitted
    pub items_collected: usize,
    /// Not-collected diagnostic items emitted
    pub diagnostics: usize,
    /// Malformed records dropped across all streams
    pub malformed_records: usize,
}

/// Environment variable probe over a process source
#[derive(Debug, Clone)]
pub struct Probe<S = ProcFs> {
    config: ProbeConfig,
    source: S,
    self_pid: Pid,
}

impl Probe<ProcFs> {
    /// Creates a probe reading the configured procfs root
    pub fn new(config: ProbeConfig) -> Self {
        let source = ProcFs::new(config.proc_root.clone());
        Self::with_source(config, source)
    }
}

impl<S: ProcessSource> Probe<S> {
    /// Creates a probe over a custom process source
    pub fn with_source(config: ProbeConfig, source: S) -> Self {
        Self {
            config,
            source,
            self_pid: std::process::id(),
        }
    }

    /// Overrides the id substituted for the self-pid sentinel
    pub fn with_self_pid(mut self, pid: Pid) -> Self {
        self.self_pid = pid;
        self
    }

    /// The probe configuration
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Runs one scan pass.
    ///
    /// Only an unreadable process root or a failing sink abort the pass.
    /// A process whose stream can't be opened or read yields one
    /// not-collected item and the scan moves on.
    pub fn scan<P, N, K>(
        &self,
        mut pid_matcher: P,
        name_matcher: &N,
        sink: &mut K,
    ) -> Result<ScanSummary>
    where
        P: PidMatcher,
        N: NameMatcher + ?Sized,
        K: ItemSink + ?Sized,
    {
        if pid_matcher.rewrite_sentinel(self.self_pid) {
            debug!("Pid sentinel rewritten to own pid {}", self.self_pid);
        }

        let pids = self.source.list_pids()?;
        let mut summary = ScanSummary {
            processes_listed: pids.len(),
            ..ScanSummary::default()
        };

        debug!("Starting scan of {} processes", pids.len());

        for pid in pids {
            if !pid_matcher.matches_pid(pid) {
                continue;
            }

            let limit = self.config.max_processes;
            if limit > 0 && summary.processes_matched >= limit {
                debug!("Process limit of {} reached", limit);
                break;
            }
            summary.processes_matched += 1;

            self.scan_process(pid, name_matcher, sink, &mut summary)?;
        }

        debug!(
            "Scan complete: {} matched, {} collected, {} diagnostics",
            summary.processes_matched, summary.items_collected, summary.diagnostics
        );
        Ok(summary)
    }

    /// Drain one process's environment stream into the sink
    fn scan_process<N, K>(
        &self,
        pid: Pid,
        name_matcher: &N,
        sink: &mut K,
        summary: &mut ScanSummary,
    ) -> Result<()>
    where
        N: NameMatcher + ?Sized,
        K: ItemSink + ?Sized,
    {
        let stream = match self.source.open_environ(pid) {
            Ok(stream) => stream,
            Err(e) => {
                let err = Error::environ_open(self.source.environ_path(pid), e);
                warn!("{}", err);
                sink.collect(ResultItem::not_collected(pid, err.to_string()))?;
                summary.diagnostics += 1;
                return Ok(());
            }
        };

        let mut splitter = RecordSplitter::with_increment(stream, self.config.read_increment);
        let mut outcome = Ok(());

        for record in splitter.by_ref() {
            match record {
                Ok(record) => {
                    if !name_matcher.matches_name(&record.name) {
                        continue;
                    }
                    trace!("pid {}: matched {}", pid, record.name);
                    outcome = sink.collect(ResultItem::collected(pid, record));
                    if outcome.is_err() {
                        break;
                    }
                    summary.items_collected += 1;
                }
                Err(e) => {
                    let err = Error::environ_read(self.source.environ_path(pid), e);
                    warn!("{}", err);
                    outcome = sink.collect(ResultItem::not_collected(pid, err.to_string()));
                    if outcome.is_ok() {
                        summary.diagnostics += 1;
                    }
                    break;
                }
            }
        }

        summary.malformed_records += splitter.stats().malformed;
        outcome
    }
}
