//! Single environment record decoding.
//!
//! A record is the byte segment between two NUL terminators. Its layout is
//! `name=value`, split at the first `=`; the value may itself contain `=`.

use serde::Serialize;

/// Record terminator inside an environment stream
pub const TERMINATOR: u8 = 0x00;

/// Separator between name and value inside a record
pub const SEPARATOR: u8 = b'=';

/// One `name=value` pair decoded from an environment stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironRecord {
    /// Variable name, never empty
    pub name: String,
    /// Variable value, possibly empty
    pub value: String,
}

impl EnvironRecord {
    /// Creates a new record
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Decode a record from a segment that excludes its terminator.
///
/// Returns `None` for malformed segments: no separator, or an empty name.
pub fn parse_segment(segment: &[u8]) -> Option<EnvironRecord> {
    let split = segment.iter().position(|&b| b == SEPARATOR)?;
    if split == 0 {
        return None;
    }

    Some(EnvironRecord {
        name: String::from_utf8_lossy(&segment[..split]).into_owned(),
        value: String::from_utf8_lossy(&segment[split + 1..]).into_owned(),
    })
}
