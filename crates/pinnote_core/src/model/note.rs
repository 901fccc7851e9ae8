//! Note domain model.
//!
//! # Responsibility
//! - Define the note record persisted in the `notes` table.
//! - Validate user-authored fields before persistence.
//!
//! # Invariants
//! - `id` is `None` only before the first insert.
//! - A note never has both a blank title and a blank content.
//! - `timestamp` is epoch milliseconds and never negative.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Store-assigned note identifier.
pub type NoteId = i64;

/// Validation failures for note writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Title and content are both empty or whitespace-only.
    EmptyNote,
    /// Timestamp is before the unix epoch.
    NegativeTimestamp(i64),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyNote => write!(f, "note title and content cannot both be blank"),
            Self::NegativeTimestamp(value) => {
                write!(f, "note timestamp must be >= 0, got {value}")
            }
        }
    }
}

impl Error for NoteValidationError {}

/// A user-authored text note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Absent until the store assigns one on first insert.
    pub id: Option<NoteId>,
    pub title: String,
    pub content: String,
    /// Creation/modification time in epoch milliseconds.
    pub timestamp: i64,
    /// Requires PIN verification before the note may be opened.
    pub is_protected: bool,
}

impl Note {
    /// Creates an unsaved, unprotected note stamped with the current time.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
            timestamp: now_epoch_ms(),
            is_protected: false,
        }
    }

    /// Builder-style setter for the protected flag.
    pub fn protected(mut self, is_protected: bool) -> Self {
        self.is_protected = is_protected;
        self
    }

    /// Checks user-authored fields before a write.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.title.trim().is_empty() && self.content.trim().is_empty() {
            return Err(NoteValidationError::EmptyNote);
        }
        if self.timestamp < 0 {
            return Err(NoteValidationError::NegativeTimestamp(self.timestamp));
        }
        Ok(())
    }
}

/// Current wall-clock time in epoch milliseconds.
///
/// Clocks set before 1970 collapse to `0` rather than failing.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
