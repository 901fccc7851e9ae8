//! Note list screen state holder.
//!
//! # Responsibility
//! - Keep the displayed list in sync with the note store through one live
//!   subscription, re-running the query pipeline on every emission.
//! - Drive the PIN prompt for protected notes, single delete with one-slot
//!   undo, and multi-select bulk delete.
//!
//! # Invariants
//! - Changing order, search text or the protected filter drops the current
//!   subscription before a new one is opened.
//! - The undo slot holds at most the last deleted note and is emptied by
//!   any later deletion, single or bulk.
//! - The selection only ever holds ids present in the latest snapshot.

use crate::model::credentials::Credentials;
use crate::model::note::{Note, NoteId};
use crate::model::order::NoteOrder;
use crate::repo::feed::Subscription;
use crate::repo::note_repo::NoteRepository;
use crate::repo::preference_repo::PreferenceRepository;
use crate::search::query::query_notes;
use crate::security::pin_gate::{GateState, OpenDecision, PinGate, PinOutcome, PinPrompt};
use crate::service::note_service::{BulkDeleteReport, NoteService};
use crate::service::pin_service::PinService;
use crate::service::ServiceError;
use crate::session::event::{EventQueue, SessionEvent};
use crate::session::selection::SelectionSet;
use log::{debug, info, warn};
use std::time::Duration;

const MSG_NOTE_DELETED: &str = "Note deleted";
const MSG_UNDO: &str = "Undo";
const MSG_NOTE_RESTORED: &str = "Note restored";
const MSG_SET_PIN_FIRST: &str = "Set a master PIN before opening a protected note!";
const MSG_NOTHING_SELECTED: &str = "No notes selected for deletion.";

/// Render snapshot of the note list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesState {
    /// Pipeline output shown to the user.
    pub notes: Vec<Note>,
    pub order: NoteOrder,
    pub search_text: String,
    pub include_protected: bool,
    pub has_pin: bool,
    /// True until the first store emission arrives.
    pub is_loading: bool,
}

impl Default for NotesState {
    fn default() -> Self {
        Self {
            notes: Vec::new(),
            order: NoteOrder::default(),
            search_text: String::new(),
            include_protected: false,
            has_pin: false,
            is_loading: true,
        }
    }
}

pub struct NoteListSession<N: NoteRepository, P: PreferenceRepository> {
    notes: NoteService<N>,
    pins: PinService<P>,
    settle_delay: Duration,
    state: NotesState,
    credentials: Credentials,
    raw_notes: Vec<Note>,
    gate: PinGate,
    selection: SelectionSet,
    recently_deleted: Option<Note>,
    notes_sub: Option<Subscription<Vec<Note>>>,
    prefs_sub: Subscription<Credentials>,
    events: EventQueue,
}

impl<N: NoteRepository, P: PreferenceRepository> NoteListSession<N, P> {
    /// Subscribes to both stores and loads the first snapshot.
    ///
    /// `settle_delay` is attached to the navigation emitted after a PIN
    /// match so the prompt can close first.
    pub fn new(
        notes: NoteService<N>,
        pins: PinService<P>,
        settle_delay: Duration,
    ) -> Result<Self, ServiceError> {
        let prefs_sub = pins.observe()?;
        let mut session = Self {
            notes,
            pins,
            settle_delay,
            state: NotesState::default(),
            credentials: Credentials::default(),
            raw_notes: Vec::new(),
            gate: PinGate::new(),
            selection: SelectionSet::new(),
            recently_deleted: None,
            notes_sub: None,
            prefs_sub,
            events: EventQueue::default(),
        };
        session.resubscribe()?;
        Ok(session)
    }

    pub fn state(&self) -> &NotesState {
        &self.state
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn pin_prompt(&self) -> Option<&PinPrompt> {
        self.gate.prompt()
    }

    pub fn gate_state(&self) -> GateState {
        GateState::derive(&self.credentials, self.gate.unlocked(), false, false)
    }

    pub fn recently_deleted(&self) -> Option<&Note> {
        self.recently_deleted.as_ref()
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain()
    }

    /// Applies pending store emissions; returns whether anything changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        if let Some(credentials) = self.prefs_sub.latest() {
            self.state.has_pin = credentials.has_pin();
            self.credentials = credentials;
            changed = true;
        }
        if let Some(raw) = self.notes_sub.as_ref().and_then(Subscription::latest) {
            self.raw_notes = raw;
            self.selection
                .retain_known(self.raw_notes.iter().filter_map(|note| note.id));
            self.recompute();
            self.state.is_loading = false;
            changed = true;
        }
        changed
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) -> Result<(), ServiceError> {
        self.state.search_text = text.into();
        self.resubscribe()
    }

    pub fn set_include_protected(&mut self, include: bool) -> Result<(), ServiceError> {
        self.state.include_protected = include;
        self.resubscribe()
    }

    /// Switches the sort order; the active order is a no-op.
    pub fn set_order(&mut self, order: NoteOrder) -> Result<(), ServiceError> {
        if self.state.order == order {
            return Ok(());
        }
        self.state.order = order;
        self.resubscribe()?;
        self.events.push(SessionEvent::ScrollToTop);
        Ok(())
    }

    /// Deletes one note and keeps it in the undo slot.
    pub fn delete_note(&mut self, id: NoteId) -> Result<(), ServiceError> {
        let deleted = self.notes.delete_note(id)?;
        self.recently_deleted = Some(deleted);
        self.events
            .push(SessionEvent::message_with_action(MSG_NOTE_DELETED, MSG_UNDO));
        self.poll();
        Ok(())
    }

    /// Re-inserts the note held in the undo slot, if any.
    pub fn restore_note(&mut self) -> Result<(), ServiceError> {
        if let Some(note) = self.recently_deleted.take() {
            self.notes.restore_note(&note)?;
            self.events.push(SessionEvent::message(MSG_NOTE_RESTORED));
        }
        self.resubscribe()
    }

    /// Handles a tap on a note.
    ///
    /// In selection mode the tap toggles membership. Otherwise unprotected
    /// notes open directly and protected ones go through the PIN gate.
    pub fn open_note(&mut self, id: NoteId) -> Result<(), ServiceError> {
        if self.selection.is_active() {
            self.selection.toggle(id);
            return Ok(());
        }

        self.poll();
        let Some(note) = self.notes.get_note(id)? else {
            warn!("event=note_open module=session status=error note_id={id} error_code=not_found");
            return Ok(());
        };

        match self
            .gate
            .request_open(id, note.is_protected, self.credentials.has_pin())
        {
            OpenDecision::Open(note_id) => self.events.push(SessionEvent::NavigateToNote {
                note_id,
                after: Duration::ZERO,
            }),
            OpenDecision::PromptPin(note_id) => {
                debug!("event=pin_prompt module=session status=open note_id={note_id}");
            }
            OpenDecision::RequireSetup(note_id) => {
                info!("event=note_open module=session status=rejected note_id={note_id} reason=no_pin");
                self.events.push(SessionEvent::NavigateToPinSettings);
                self.events.push(SessionEvent::message(MSG_SET_PIN_FIRST));
            }
        }
        Ok(())
    }

    pub fn set_pin_input(&mut self, input: impl Into<String>) {
        self.gate.set_input(input);
    }

    /// Checks the prompt against the stored PIN read fresh from the store.
    pub fn submit_pin(&mut self) -> Result<PinOutcome, ServiceError> {
        let credentials = self.pins.credentials()?;
        let outcome = self.gate.submit(&credentials);
        match outcome {
            PinOutcome::Unlocked(note_id) => {
                info!("event=pin_check module=session status=ok note_id={note_id}");
                self.events.push(SessionEvent::NavigateToNote {
                    note_id,
                    after: self.settle_delay,
                });
            }
            PinOutcome::Rejected => {
                warn!("event=pin_check module=session status=rejected");
            }
            PinOutcome::NoPrompt => {}
        }
        Ok(outcome)
    }

    pub fn dismiss_pin_prompt(&mut self) {
        self.gate.dismiss();
    }

    /// Called when the user navigates away from an unlocked note.
    pub fn leave_note(&mut self) {
        self.gate.leave_note();
    }

    pub fn enter_selection(&mut self, id: NoteId) {
        self.selection.enter(id);
    }

    pub fn toggle_selection(&mut self, id: NoteId) {
        self.selection.toggle(id);
    }

    /// Selects every displayed note, or clears the selection if all are
    /// already selected.
    pub fn toggle_select_all(&mut self) {
        let visible = self.state.notes.iter().filter_map(|note| note.id);
        self.selection.select_all(visible);
    }

    pub fn exit_selection(&mut self) {
        self.selection.exit();
    }

    /// Opens the bulk-delete confirmation, or reports an empty selection.
    pub fn delete_selected(&mut self) {
        if !self.selection.request_bulk_delete() {
            self.events.push(SessionEvent::message(MSG_NOTHING_SELECTED));
        }
    }

    pub fn dismiss_bulk_delete(&mut self) {
        self.selection.dismiss_bulk_delete();
    }

    /// Deletes every selected note, leaves selection mode and refreshes.
    pub fn confirm_bulk_delete(&mut self) -> Result<BulkDeleteReport, ServiceError> {
        if self.selection.is_empty() {
            return Ok(BulkDeleteReport::default());
        }

        let ids = self.selection.ids().iter().copied().collect::<Vec<_>>();
        let report = self.notes.delete_many(ids);
        if !report.deleted.is_empty() {
            self.recently_deleted = None;
        }
        self.events.push(SessionEvent::message(format!(
            "{} note(s) permanently deleted.",
            report.deleted.len()
        )));
        if !report.failed.is_empty() {
            self.events.push(SessionEvent::message(format!(
                "{} note(s) could not be deleted.",
                report.failed.len()
            )));
        }

        self.selection.exit();
        self.resubscribe()?;
        Ok(report)
    }

    /// Drops the live subscription, opens a new one and applies its first
    /// snapshot.
    fn resubscribe(&mut self) -> Result<(), ServiceError> {
        self.notes_sub = None;
        self.notes_sub = Some(self.notes.observe_notes()?);
        self.poll();
        Ok(())
    }

    fn recompute(&mut self) {
        self.state.notes = query_notes(
            &self.raw_notes,
            self.state.order,
            &self.state.search_text,
            self.state.include_protected,
        );
    }
}
