//! Identifier newtypes with smart constructors.

use std::fmt;

// ===== TaskId =====

/// Identity of one dispatched page request.
///
/// Ids are handed out by [`TaskSequence`] and only compared for equality;
/// ordering is monotonic within one sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic task id source. The first id handed out is 1.
#[derive(Debug, Clone, Default)]
pub struct TaskSequence {
    last: u64,
}

impl TaskSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id.
    pub fn next_id(&mut self) -> TaskId {
        self.last += 1;
        TaskId(self.last)
    }

    /// The most recently allocated id, if any.
    pub fn last(&self) -> Option<TaskId> {
        (self.last > 0).then_some(TaskId(self.last))
    }
}

// ===== DisplayName =====

/// Display name of a saved quick search. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayName(String);

impl DisplayName {
    /// Smart constructor: rejects empty and whitespace-only names.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidDisplayName> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            Err(InvalidDisplayName::Empty)
        } else {
            Ok(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidDisplayName {
    #[error("Display name cannot be empty")]
    Empty,
}

// ===== Tests =====
