//! Result items and the sink they are delivered to.

use crate::error::Result;
use crate::splitter::EnvironRecord;
use crate::Pid;
use serde::Serialize;
use std::fmt;

/// Collection status of a result item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ItemStatus {
    /// The variable was read
    #[serde(rename = "collected")]
    Collected,
    /// The process environment could not be read
    #[serde(rename = "not collected")]
    NotCollected,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStatus::Collected => f.write_str("collected"),
            ItemStatus::NotCollected => f.write_str("not collected"),
        }
    }
}

/// One collected variable, or one per-process diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultItem {
    /// Process the item belongs to
    pub pid: Pid,
    /// Variable name; always set when collected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Variable value; always set when collected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Collection status
    pub status: ItemStatus,
    /// Diagnostic message; set when not collected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResultItem {
    /// Creates a collected item from a matched record
    pub fn collected(pid: Pid, record: EnvironRecord) -> Self {
        Self {
            pid,
            name: Some(record.name),
            value: Some(record.value),
            status: ItemStatus::Collected,
            message: None,
        }
    }

    /// Creates a not-collected diagnostic item
    pub fn not_collected(pid: Pid, message: impl Into<String>) -> Self {
        Self {
            pid,
            name: None,
            value: None,
            status: ItemStatus::NotCollected,
            message: Some(message.into()),
        }
    }

    /// Returns true if the item carries a collected variable
    pub fn is_collected(&self) -> bool {
        self.status == ItemStatus::Collected
    }
}

/// Append-only destination for result items.
///
/// A sink error aborts the scan.
pub trait ItemSink {
    /// Accept one item
    fn collect(&mut self, item: ResultItem) -> Result<()>;
}

impl ItemSink for Vec<ResultItem> {
    fn collect(&mut self, item: ResultItem) -> Result<()> {
        self.push(item);
        Ok(())
    }
}

impl<S: ItemSink + ?Sized> ItemSink for &mut S {
    fn collect(&mut self, item: ResultItem) -> Result<()> {
        (**self).collect(item)
    }
}
