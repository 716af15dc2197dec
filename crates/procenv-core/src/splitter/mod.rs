//! Incremental splitting of environment streams into records.
//!
//! An environment stream is a sequence of `name=value` records, each
//! terminated by a NUL byte, with no guaranteed terminator after the last
//! one. [`RecordSplitter`] reads such a stream in fixed increments without
//! ever holding more than the current partial record plus one read.
//!
//! ## Algorithm Overview
//!
//! 1. Refill: while the buffer holds no terminator and the source is not
//!    exhausted, grow the buffer by one increment if full and read into its tail
//! 2. Consume: split the segment before the first terminator into a record,
//!    dropping it if it has no separator
//! 3. Compact: before the next refill, move the partial record left over
//!    to the front of the buffer
//! 4. On a zero-byte read, discard any unterminated tail and release the buffer
//!
//! ## Example
//!
//! ```
//! use procenv_core::splitter::RecordSplitter;
//!
//! let stream: &[u8] = b"PATH=/bin\0GARBAGE\0HOME=/root\0";
//! let names: Vec<String> = RecordSplitter::new(stream)
//!     .map(|record| record.map(|r| r.name))
//!     .collect::<std::io::Result<_>>()?;
//!
//! assert_eq!(names, ["PATH", "HOME"]);
//! # Ok::<(), std::io::Error>(())
//! ```

mod record;

use std::io::{self, Read};
use tracing::trace;

pub use record::{parse_segment, EnvironRecord, SEPARATOR, TERMINATOR};

/// Default growth step of the splitter buffer, in bytes
pub const DEFAULT_READ_INCREMENT: usize = 256;

/// Counters describing one stream's split
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitStats {
    /// Well-formed records yielded
    pub records: usize,
    /// Terminated segments dropped for lacking a separator or a name
    pub malformed: usize,
    /// Unterminated bytes discarded at end of stream
    pub discarded_tail: usize,
    /// Bytes moved to the buffer front by compaction
    pub compacted: usize,
}

/// Streaming splitter over a readable environment source.
///
/// Yields `io::Result<EnvironRecord>`. A read error is yielded once and ends
/// the iteration.
#[derive(Debug)]
pub struct RecordSplitter<R> {
    source: R,
    buffer: Vec<u8>,
    /// Offset of the first unconsumed byte
    start: usize,
    /// End of the valid bytes in `buffer`
    filled: usize,
    /// Bytes in `start..scanned` are known to hold no terminator
    scanned: usize,
    increment: usize,
    exhausted: bool,
    stats: SplitStats,
}

impl<R: Read> RecordSplitter<R> {
    /// Creates a splitter growing by [`DEFAULT_READ_INCREMENT`]
    pub fn new(source: R) -> Self {
        Self::with_increment(source, DEFAULT_READ_INCREMENT)
    }

    /// Creates a splitter with a custom growth increment (clamped to at least 1)
    pub fn with_increment(source: R, increment: usize) -> Self {
        Self {
            source,
            buffer: Vec::new(),
            start: 0,
            filled: 0,
            scanned: 0,
            increment: increment.max(1),
            exhausted: false,
            stats: SplitStats::default(),
        }
    }

    /// Returns the counters accumulated so far
    pub fn stats(&self) -> SplitStats {
        self.stats
    }

    /// Current buffer allocation in bytes; zero once the stream is drained
    pub fn buffer_capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Consumes the splitter, returning the underlying source
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Returns the next well-formed record, or `None` at end of stream
    pub fn next_record(&mut self) -> io::Result<Option<EnvironRecord>> {
        loop {
            if let Some(terminator) = self.find_terminator() {
                let segment = self.start..terminator;
                let record = parse_segment(&self.buffer[segment.clone()]);
                self.start = terminator + 1;
                self.scanned = self.start;

                match record {
                    Some(record) => {
                        self.stats.records += 1;
                        return Ok(Some(record));
                    }
                    None => {
                        trace!("Dropping malformed record of {} bytes", segment.len());
                        self.stats.malformed += 1;
                        continue;
                    }
                }
            }

            if self.exhausted {
                self.finish();
                return Ok(None);
            }

            if let Err(e) = self.fill() {
                self.exhausted = true;
                self.finish();
                return Err(e);
            }
        }
    }

    /// Search for a terminator, resuming after bytes already scanned
    fn find_terminator(&mut self) -> Option<usize> {
        let found = self.buffer[self.scanned..self.filled]
            .iter()
            .position(|&b| b == TERMINATOR)
            .map(|offset| self.scanned + offset);

        if found.is_none() {
            self.scanned = self.filled;
        }
        found
    }

    /// Issue one read into the buffer tail, compacting first and growing if full
    fn fill(&mut self) -> io::Result<()> {
        self.compact();

        if self.filled == self.buffer.len() {
            self.buffer.resize(self.buffer.len() + self.increment, 0);
        }

        loop {
            match self.source.read(&mut self.buffer[self.filled..]) {
                Ok(0) => {
                    self.exhausted = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.filled += n;
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Move the unconsumed partial record to the front of the buffer.
    ///
    /// Only called when no terminator is buffered, so the bytes moved belong
    /// to a single record and each record is moved at most once.
    fn compact(&mut self) {
        if self.start == 0 {
            return;
        }
        let remaining = self.filled - self.start;
        self.buffer.copy_within(self.start..self.filled, 0);
        self.stats.compacted += remaining;
        self.scanned -= self.start;
        self.filled = remaining;
        self.start = 0;
    }

    /// Discard any partial record and release the buffer
    fn finish(&mut self) {
        let tail = self.filled - self.start;
        if tail > 0 {
            trace!("Discarding {} unterminated trailing bytes", tail);
            self.stats.discarded_tail += tail;
        }
        self.start = 0;
        self.filled = 0;
        self.scanned = 0;
        self.buffer = Vec::new();
    }
}

impl<R: Read> Iterator for RecordSplitter<R> {
    type Item = io::Result<EnvironRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted && self.filled == self.start {
            return None;
        }
        self.next_record().transpose()
    }
}
