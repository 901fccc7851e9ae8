//! One-shot UI events emitted by sessions.

use crate::model::note::NoteId;
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Transient user-facing message, optionally with an action button.
    ShowMessage {
        message: String,
        action_label: Option<String>,
    },
    /// Open the note detail screen once `after` has elapsed.
    NavigateToNote { note_id: NoteId, after: Duration },
    NavigateToPinSettings,
    NoteSaved,
    /// PIN settings finished; leave the screen.
    SettingsSaved,
    ScrollToTop,
}

impl SessionEvent {
    pub fn message(message: impl Into<String>) -> Self {
        Self::ShowMessage {
            message: message.into(),
            action_label: None,
        }
    }

    pub fn message_with_action(message: impl Into<String>, action_label: impl Into<String>) -> Self {
        Self::ShowMessage {
            message: message.into(),
            action_label: Some(action_label.into()),
        }
    }
}

/// FIFO of events not yet consumed by the UI.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<SessionEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: SessionEvent) {
        self.pending.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<SessionEvent> {
        self.pending.drain(..).collect()
    }
}
