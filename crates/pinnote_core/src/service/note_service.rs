//! Note use-case service.
//!
//! # Responsibility
//! - Save (insert or update), read, delete and restore notes.
//! - Run bulk deletes and the list query pipeline.
//!
//! # Invariants
//! - Saving always refreshes the note timestamp.
//! - A protected note is only saved while a PIN is configured.
//! - Bulk delete attempts every id and reports per-id failures instead of
//!   stopping at the first one.

use crate::model::note::{now_epoch_ms, Note, NoteId};
use crate::model::order::NoteOrder;
use crate::repo::feed::Subscription;
use crate::repo::note_repo::NoteRepository;
use crate::search::query::query_notes;
use crate::service::ServiceError;
use log::{info, warn};

/// Outcome of a bulk delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkDeleteReport {
    pub deleted: Vec<NoteId>,
    /// Ids that could not be deleted, with the error text.
    pub failed: Vec<(NoteId, String)>,
}

/// Note service facade over a repository implementation.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Subscribes to the raw note list.
    pub fn observe_notes(&self) -> Result<Subscription<Vec<Note>>, ServiceError> {
        Ok(self.repo.observe_all()?)
    }

    /// Inserts `draft` when it has no id, otherwise replaces the stored note.
    ///
    /// Returns the note as read back from the store.
    pub fn save_note(&self, draft: Note, pin_configured: bool) -> Result<Note, ServiceError> {
        if draft.is_protected && !pin_configured {
            return Err(ServiceError::ProtectedWithoutPin);
        }
        let note = Note {
            timestamp: now_epoch_ms(),
            ..draft
        };
        note.validate().map_err(ServiceError::InvalidNote)?;

        let id = match note.id {
            Some(id) => {
                self.repo.update_note(&note)?;
                id
            }
            None => self.repo.insert_note(&note)?,
        };

        self.repo
            .get_note(id)?
            .ok_or(ServiceError::InconsistentState("saved note not found in read-back"))
    }

    pub fn get_note(&self, id: NoteId) -> Result<Option<Note>, ServiceError> {
        Ok(self.repo.get_note(id)?)
    }

    /// Deletes one note and returns what was removed.
    pub fn delete_note(&self, id: NoteId) -> Result<Note, ServiceError> {
        let note = self.repo.get_note(id)?.ok_or(ServiceError::NoteNotFound(id))?;
        self.repo.delete_note(id)?;
        Ok(note)
    }

    /// Re-inserts a previously deleted note.
    ///
    /// The original id is reused unless another note took it meanwhile.
    pub fn restore_note(&self, note: &Note) -> Result<NoteId, ServiceError> {
        let id_taken = match note.id {
            Some(id) => self.repo.get_note(id)?.is_some(),
            None => false,
        };
        let id = if id_taken {
            self.repo.insert_note(&Note {
                id: None,
                ..note.clone()
            })?
        } else {
            self.repo.insert_note(note)?
        };
        info!("event=note_restore module=service status=ok note_id={id} reused_id={}", !id_taken);
        Ok(id)
    }

    /// Deletes every id, continuing past failures.
    pub fn delete_many(&self, ids: impl IntoIterator<Item = NoteId>) -> BulkDeleteReport {
        let mut report = BulkDeleteReport::default();
        for id in ids {
            match self.repo.delete_note(id) {
                Ok(()) => report.deleted.push(id),
                Err(err) => {
                    warn!("event=note_bulk_delete module=service status=error note_id={id} error={err}");
                    report.failed.push((id, err.to_string()));
                }
            }
        }
        info!(
            "event=note_bulk_delete module=service status=ok deleted={} failed={}",
            report.deleted.len(),
            report.failed.len()
        );
        report
    }

    /// Reads the store once and runs the query pipeline.
    pub fn query(
        &self,
        order: NoteOrder,
        search_text: &str,
        include_protected: bool,
    ) -> Result<Vec<Note>, ServiceError> {
        let notes = self.repo.list_all()?;
        Ok(query_notes(&notes, order, search_text, include_protected))
    }
}
