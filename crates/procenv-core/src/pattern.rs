//! Pattern entities used to select processes and variables.
//!
//! The probe only depends on the [`PidMatcher`] and [`NameMatcher`] traits.
//! [`PidPattern`] and [`NamePattern`] are the stock implementations, covering
//! the usual comparison operations for integer and string entities.

use crate::error::{Error, Result};
use crate::Pid;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Predicate deciding which process ids are scanned
pub trait PidMatcher {
    /// Returns true if `pid` satisfies the entity
    fn matches_pid(&self, pid: Pid) -> bool;

    /// Rewrites the self-pid sentinel `0` to `self_pid`.
    ///
    /// Returns true if the entity was rewritten. The default never rewrites.
    fn rewrite_sentinel(&mut self, self_pid: Pid) -> bool {
        let _ = self_pid;
        false
    }
}

/// Predicate deciding which variable names are collected
pub trait NameMatcher {
    /// Returns true if `name` satisfies the entity
    fn matches_name(&self, name: &str) -> bool;
}

impl<F> NameMatcher for F
where
    F: Fn(&str) -> bool,
{
    fn matches_name(&self, name: &str) -> bool {
        self(name)
    }
}

/// Comparison operation of a pattern entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    /// Exact equality
    #[default]
    Equals,
    /// Inequality
    NotEqual,
    /// Equality ignoring case
    CaseInsensitiveEquals,
    /// Inequality ignoring case
    CaseInsensitiveNotEqual,
    /// Candidate greater than the entity value
    GreaterThan,
    /// Candidate less than the entity value
    LessThan,
    /// Candidate greater than or equal to the entity value
    GreaterThanOrEqual,
    /// Candidate less than or equal to the entity value
    LessThanOrEqual,
    /// Regular expression search
    PatternMatch,
}

impl Operation {
    /// All operations, in declaration order
    pub const ALL: [Operation; 9] = [
        Operation::Equals,
        Operation::NotEqual,
        Operation::CaseInsensitiveEquals,
        Operation::CaseInsensitiveNotEqual,
        Operation::GreaterThan,
        Operation::LessThan,
        Operation::GreaterThanOrEqual,
        Operation::LessThanOrEqual,
        Operation::PatternMatch,
    ];

    /// Textual name of the operation
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Equals => "equals",
            Operation::NotEqual => "not equal",
            Operation::CaseInsensitiveEquals => "case insensitive equals",
            Operation::CaseInsensitiveNotEqual => "case insensitive not equal",
            Operation::GreaterThan => "greater than",
            Operation::LessThan => "less than",
            Operation::GreaterThanOrEqual => "greater than or equal",
            Operation::LessThanOrEqual => "less than or equal",
            Operation::PatternMatch => "pattern match",
        }
    }

    /// Does `ordering` (candidate compared to entity value) satisfy this operation
    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Operation::Equals | Operation::CaseInsensitiveEquals => ordering.is_eq(),
            Operation::NotEqual | Operation::CaseInsensitiveNotEqual => ordering.is_ne(),
            Operation::GreaterThan => ordering.is_gt(),
            Operation::LessThan => ordering.is_lt(),
            Operation::GreaterThanOrEqual => ordering.is_ge(),
            Operation::LessThanOrEqual => ordering.is_le(),
            Operation::PatternMatch => false,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == normalized)
            .ok_or_else(|| Error::UnknownOperation(s.to_string()))
    }
}

/// Integer pattern entity compared against process ids.
///
/// A value of `0` is the self-pid sentinel whatever the operation:
/// [`PidMatcher::rewrite_sentinel`] replaces it with the scanning process's
/// own id, so `greater than 0` means "greater than this process". Use
/// `greater than or equal 1` to select every process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PidPattern {
    operation: Operation,
    value: Pid,
}

impl PidPattern {
    /// Creates a pid pattern, validating the operation and value range
    pub fn new(operation: Operation, value: i64) -> Result<Self> {
        match operation {
            Operation::CaseInsensitiveEquals
            | Operation::CaseInsensitiveNotEqual
            | Operation::PatternMatch => return Err(Error::unsupported_operation(operation, "int")),
            _ => {}
        }

        let value = Pid::try_from(value).map_err(|_| Error::PidOutOfRange { value })?;
        Ok(Self { operation, value })
    }

    /// Pattern matching exactly one pid
    pub fn equals(value: Pid) -> Self {
        Self {
            operation: Operation::Equals,
            value,
        }
    }

    /// Pattern naming the scanning process itself, via the sentinel
    pub fn self_pid() -> Self {
        Self::equals(0)
    }

    /// The entity operation
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The entity value
    pub fn value(&self) -> Pid {
        self.value
    }
}

impl PidMatcher for PidPattern {
    fn matches_pid(&self, pid: Pid) -> bool {
        self.operation.accepts(pid.cmp(&self.value))
    }

    fn rewrite_sentinel(&mut self, self_pid: Pid) -> bool {
        if self.value != 0 {
            return false;
        }
        self.value = self_pid;
        true
    }
}

/// String pattern entity compared against variable names
#[derive(Debug, Clone)]
pub struct NamePattern {
    operation: Operation,
    value: String,
    regex: Option<Regex>,
}

impl NamePattern {
    /// Creates a name pattern, compiling the regex of a pattern match entity
    pub fn new(operation: Operation, value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let regex = match operation {
            Operation::PatternMatch => Some(Regex::new(&value)?),
            Operation::Equals
            | Operation::NotEqual
            | Operation::CaseInsensitiveEquals
            | Operation::CaseInsensitiveNotEqual => None,
            _ => return Err(Error::unsupported_operation(operation, "string")),
        };

        Ok(Self {
            operation,
            value,
            regex,
        })
    }

    /// Pattern matching exactly one name
    pub fn equals(value: impl Into<String>) -> Self {
        Self {
            operation: Operation::Equals,
            value: value.into(),
            regex: None,
        }
    }

    /// The entity operation
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The entity value
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl NameMatcher for NamePattern {
    fn matches_name(&self, name: &str) -> bool {
        match self.operation {
            Operation::CaseInsensitiveEquals => name.eq_ignore_ascii_case(&self.value),
            Operation::CaseInsensitiveNotEqual => !name.eq_ignore_ascii_case(&self.value),
            Operation::PatternMatch => self
                .regex
                .as_ref()
                .map(|re| re.is_match(name))
                .unwrap_or(false),
            op => op.accepts(name.cmp(self.value.as_str())),
        }
    }
}
