//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep sessions and FFI callers decoupled from storage details.

use crate::model::note::{NoteId, NoteValidationError};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod note_service;
pub mod pin_service;

/// Service error for note and PIN use-cases.
///
/// User-input problems that the screens report as messages (wrong PIN,
/// blank fields) are outcomes, not errors; this type covers the rest.
#[derive(Debug)]
pub enum ServiceError {
    /// Note rejected by model validation.
    InvalidNote(NoteValidationError),
    /// Protected note saved while no PIN is configured.
    ProtectedWithoutPin,
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Write succeeded but read-back disagrees.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNote(err) => write!(f, "invalid note: {err}"),
            Self::ProtectedWithoutPin => {
                write!(f, "a PIN must be configured before saving a protected note")
            }
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent note state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidNote(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NoteNotFound(id),
            RepoError::Validation(err) => Self::InvalidNote(err),
            other => Self::Repo(other),
        }
    }
}
