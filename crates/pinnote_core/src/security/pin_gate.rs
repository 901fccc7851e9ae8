//! PIN gate state machine for opening protected notes.

use crate::model::credentials::Credentials;
use crate::model::note::NoteId;

/// Observable access state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No PIN configured.
    NoPin,
    /// PIN configured, access not verified for this attempt.
    Locked,
    /// PIN verified for this note; returns to `Locked` on leaving the note.
    Unlocked(NoteId),
    /// PIN cleared by a reset; security answer must be re-verified before a
    /// new PIN may be set.
    ResetPending,
    /// Reset dialog open, waiting for the security answer.
    AwaitingResetAnswer,
}

impl GateState {
    /// Derives the state from a credentials snapshot plus session flags.
    ///
    /// Precedence: open reset dialog, then a live unlock, then the forced
    /// re-setup gate, then plain PIN presence.
    pub fn derive(
        credentials: &Credentials,
        unlocked: Option<NoteId>,
        reset_dialog_open: bool,
        setup_answer_verified: bool,
    ) -> Self {
        if reset_dialog_open {
            return Self::AwaitingResetAnswer;
        }
        if let Some(note_id) = unlocked {
            return Self::Unlocked(note_id);
        }
        if credentials.awaiting_resetup() && !setup_answer_verified {
            return Self::ResetPending;
        }
        if credentials.has_pin() {
            Self::Locked
        } else {
            Self::NoPin
        }
    }
}

/// PIN entry prompt bound to one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinPrompt {
    pub note_id: NoteId,
    pub input: String,
    /// Last submit did not match; cleared on the next edit.
    pub error: bool,
}

/// Result of asking to open a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenDecision {
    /// Unprotected note: navigate straight away.
    Open(NoteId),
    /// Protected note with a PIN configured: prompt shown.
    PromptPin(NoteId),
    /// Protected note without a PIN: send the user to PIN setup.
    RequireSetup(NoteId),
}

/// Result of submitting the PIN prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOutcome {
    Unlocked(NoteId),
    Rejected,
    /// Submit without an open prompt.
    NoPrompt,
}

#[derive(Debug, Clone, Default)]
pub struct PinGate {
    prompt: Option<PinPrompt>,
    unlocked: Option<NoteId>,
    pending_setup_for: Option<NoteId>,
}

impl PinGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_open(&mut self, note_id: NoteId, is_protected: bool, has_pin: bool) -> OpenDecision {
        if !is_protected {
            return OpenDecision::Open(note_id);
        }
        if has_pin {
            self.prompt = Some(PinPrompt {
                note_id,
                input: String::new(),
                error: false,
            });
            return OpenDecision::PromptPin(note_id);
        }
        self.pending_setup_for = Some(note_id);
        OpenDecision::RequireSetup(note_id)
    }

    pub fn prompt(&self) -> Option<&PinPrompt> {
        self.prompt.as_ref()
    }

    /// Updates the prompt text and clears its error flag.
    pub fn set_input(&mut self, input: impl Into<String>) {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.input = input.into();
            prompt.error = false;
        }
    }

    /// Compares the prompt text to the stored PIN by exact equality.
    ///
    /// A mismatch keeps the prompt open with its text intact.
    pub fn submit(&mut self, credentials: &Credentials) -> PinOutcome {
        let Some(prompt) = self.prompt.as_mut() else {
            return PinOutcome::NoPrompt;
        };
        if credentials.pin_matches(&prompt.input) {
            let note_id = prompt.note_id;
            self.prompt = None;
            self.unlocked = Some(note_id);
            PinOutcome::Unlocked(note_id)
        } else {
            prompt.error = true;
            PinOutcome::Rejected
        }
    }

    pub fn dismiss(&mut self) {
        self.prompt = None;
    }

    /// Ends the one-shot unlock.
    pub fn leave_note(&mut self) {
        self.unlocked = None;
    }

    pub fn unlocked(&self) -> Option<NoteId> {
        self.unlocked
    }

    /// Note the user tried to open before being sent to PIN setup.
    pub fn pending_setup_for(&self) -> Option<NoteId> {
        self.pending_setup_for
    }
}
