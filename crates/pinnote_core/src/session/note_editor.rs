//! Add/edit note screen state holder.

use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::NoteRepository;
use crate::repo::preference_repo::PreferenceRepository;
use crate::service::note_service::NoteService;
use crate::service::pin_service::PinService;
use crate::service::ServiceError;
use crate::session::event::{EventQueue, SessionEvent};
use log::info;

const MSG_EMPTY_NOTE: &str = "Title or content cannot be empty!";
const MSG_PROTECTED_NEEDS_PIN: &str = "Set a master PIN before adding a protected note!";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    /// `None` while composing a new note.
    pub note_id: Option<NoteId>,
    pub title: String,
    pub content: String,
    pub is_protected: bool,
    pub has_pin: bool,
    pub is_saving: bool,
}

pub struct NoteEditorSession<N: NoteRepository, P: PreferenceRepository> {
    notes: NoteService<N>,
    pins: PinService<P>,
    state: EditorState,
    events: EventQueue,
}

impl<N: NoteRepository, P: PreferenceRepository> NoteEditorSession<N, P> {
    pub fn new(notes: NoteService<N>, pins: PinService<P>) -> Result<Self, ServiceError> {
        let has_pin = pins.credentials()?.has_pin();
        Ok(Self {
            notes,
            pins,
            state: EditorState {
                has_pin,
                ..EditorState::default()
            },
            events: EventQueue::default(),
        })
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain()
    }

    /// Loads an existing note for editing, or resets to a blank draft.
    ///
    /// An id that no longer exists keeps the id and leaves fields empty.
    pub fn load(&mut self, note_id: Option<NoteId>) -> Result<(), ServiceError> {
        let has_pin = self.refresh_has_pin()?;
        self.state = EditorState {
            note_id,
            has_pin,
            ..EditorState::default()
        };
        if let Some(note) = note_id.map(|id| self.notes.get_note(id)).transpose()?.flatten() {
            self.state.title = note.title;
            self.state.content = note.content;
            self.state.is_protected = note.is_protected;
        }
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.state.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.state.content = content.into();
    }

    /// Toggles protection; turning it on without a PIN redirects to setup.
    pub fn set_protected(&mut self, is_protected: bool) -> Result<(), ServiceError> {
        self.state.is_protected = is_protected;
        if is_protected && !self.state.has_pin && !self.refresh_has_pin()? {
            self.events.push(SessionEvent::message(MSG_PROTECTED_NEEDS_PIN));
            self.events.push(SessionEvent::NavigateToPinSettings);
        }
        Ok(())
    }

    /// Saves the draft; returns the stored note or `None` when rejected.
    pub fn save(&mut self) -> Result<Option<Note>, ServiceError> {
        if self.state.title.trim().is_empty() && self.state.content.trim().is_empty() {
            self.events.push(SessionEvent::message(MSG_EMPTY_NOTE));
            return Ok(None);
        }
        let has_pin = self.refresh_has_pin()?;
        if self.state.is_protected && !has_pin {
            self.events.push(SessionEvent::message(MSG_PROTECTED_NEEDS_PIN));
            return Ok(None);
        }

        self.state.is_saving = true;
        let draft = Note {
            id: self.state.note_id,
            ..Note::new(self.state.title.clone(), self.state.content.clone())
                .protected(self.state.is_protected)
        };
        let saved = self.notes.save_note(draft, has_pin);
        self.state.is_saving = false;
        let saved = saved?;

        info!(
            "event=note_save module=session status=ok note_id={} created={}",
            saved.id.unwrap_or_default(),
            self.state.note_id.is_none()
        );
        self.events.push(SessionEvent::NoteSaved);
        Ok(Some(saved))
    }

    /// Clears the draft after the UI has handled `NoteSaved`.
    pub fn save_complete(&mut self) {
        self.state = EditorState {
            has_pin: self.state.has_pin,
            ..EditorState::default()
        };
    }

    fn refresh_has_pin(&mut self) -> Result<bool, ServiceError> {
        self.state.has_pin = self.pins.credentials()?.has_pin();
        Ok(self.state.has_pin)
    }
}
