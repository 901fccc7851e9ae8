//! PIN settings screen state holder.
//!
//! # Responsibility
//! - Drive PIN set/change, PIN reset through the security question, and
//!   the answer re-verification required after a reset.
//! - Block leaving the screen while a reset PIN has not been replaced.
//!
//! # Invariants
//! - Field error flags are cleared by editing the field they belong to.
//! - `SettingsSaved` is emitted at most once per session.

use crate::model::credentials::Credentials;
use crate::repo::feed::Subscription;
use crate::repo::preference_repo::PreferenceRepository;
use crate::security::pin_form::{PinFieldErrors, PinSetupForm};
use crate::security::pin_gate::GateState;
use crate::service::pin_service::{PinResetOutcome, PinService, PinSetupOutcome};
use crate::service::ServiceError;
use crate::session::event::{EventQueue, SessionEvent};

const MSG_ANSWER_VERIFIED: &str =
    "Security question verified. You can now set your new PIN.";
const MSG_ANSWER_REJECTED: &str = "Wrong security answer or no security question set!";
const MSG_VERIFY_BEFORE_SETUP: &str =
    "Verify your security question before setting a new PIN.";
const MSG_OLD_PIN_INVALID: &str = "Old PIN is wrong or empty!";
const MSG_FILL_ALL_FIELDS: &str = "Please fill in all fields and make sure the PINs match.";
const MSG_PIN_SAVED: &str = "PIN and security question updated successfully!";
const MSG_RESET_NEEDS_QUESTION: &str = "Set a security question before resetting the PIN!";
const MSG_PIN_RESET: &str =
    "PIN reset. Verify your security question to set a new PIN.";
const MSG_RESET_REJECTED: &str = "Wrong answer or no security question set!";
const MSG_LEAVE_BLOCKED: &str = "Set a new PIN before leaving this screen.";

/// Reset dialog contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetDialog {
    pub question: String,
    pub answer: String,
    pub error: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinSettingsState {
    pub has_pin: bool,
    pub has_security_question: bool,
    pub is_force_setup: bool,
    pub form: PinSetupForm,
    pub errors: PinFieldErrors,
    pub reset_dialog: Option<ResetDialog>,
    /// Question shown while a reset PIN awaits answer re-verification.
    pub setup_question: Option<String>,
    pub setup_answer: String,
    pub setup_answer_error: bool,
    pub security_question_verified: bool,
}

pub struct PinSettingsSession<P: PreferenceRepository> {
    pins: PinService<P>,
    prefs_sub: Subscription<Credentials>,
    credentials: Credentials,
    state: PinSettingsState,
    navigating: bool,
    events: EventQueue,
}

impl<P: PreferenceRepository> PinSettingsSession<P> {
    pub fn new(pins: PinService<P>) -> Result<Self, ServiceError> {
        let prefs_sub = pins.observe()?;
        let mut session = Self {
            pins,
            prefs_sub,
            credentials: Credentials::default(),
            state: PinSettingsState::default(),
            navigating: false,
            events: EventQueue::default(),
        };
        session.poll();
        Ok(session)
    }

    pub fn state(&self) -> &PinSettingsState {
        &self.state
    }

    pub fn gate_state(&self) -> GateState {
        GateState::derive(
            &self.credentials,
            None,
            self.state.reset_dialog.is_some(),
            self.state.security_question_verified,
        )
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain()
    }

    /// Applies the newest credentials snapshot, if one is pending.
    pub fn poll(&mut self) -> bool {
        let Some(credentials) = self.prefs_sub.latest() else {
            return false;
        };
        self.state.has_pin = credentials.has_pin();
        self.state.has_security_question = credentials.has_security_question();
        self.state.is_force_setup = credentials.force_setup_after_reset;
        self.state.setup_question = if self.needs_answer_for(&credentials) {
            Some(credentials.security_question.clone().unwrap_or_default())
        } else {
            None
        };
        self.credentials = credentials;
        true
    }

    pub fn set_old_pin(&mut self, input: impl Into<String>) {
        self.state.form.old_pin = input.into();
        self.state.errors.old_pin = false;
    }

    pub fn set_new_pin(&mut self, input: impl Into<String>) {
        self.state.form.new_pin = input.into();
        self.state.errors.new_pin = false;
        self.state.errors.confirm_pin = false;
    }

    pub fn set_confirm_pin(&mut self, input: impl Into<String>) {
        self.state.form.confirm_pin = input.into();
        self.state.errors.confirm_pin = false;
    }

    pub fn set_question(&mut self, input: impl Into<String>) {
        self.state.form.question = input.into();
        self.state.errors.question = false;
    }

    pub fn set_answer(&mut self, input: impl Into<String>) {
        self.state.form.answer = input.into();
        self.state.errors.answer = false;
    }

    pub fn set_setup_answer(&mut self, input: impl Into<String>) {
        self.state.setup_answer = input.into();
        self.state.setup_answer_error = false;
    }

    /// Re-verifies the security answer after a reset.
    pub fn verify_setup_answer(&mut self) -> Result<bool, ServiceError> {
        if self.pins.verify_security_answer(&self.state.setup_answer)? {
            self.state.security_question_verified = true;
            self.state.setup_question = None;
            self.state.setup_answer.clear();
            self.events.push(SessionEvent::message(MSG_ANSWER_VERIFIED));
            Ok(true)
        } else {
            self.state.setup_answer_error = true;
            self.events.push(SessionEvent::message(MSG_ANSWER_REJECTED));
            Ok(false)
        }
    }

    /// Validates the form and saves the new PIN; returns whether it saved.
    pub fn submit(&mut self) -> Result<bool, ServiceError> {
        let outcome = self
            .pins
            .setup_pin(&self.state.form, self.state.security_question_verified)?;
        match outcome {
            PinSetupOutcome::AnswerNotVerified => {
                self.events.push(SessionEvent::message(MSG_VERIFY_BEFORE_SETUP));
                Ok(false)
            }
            PinSetupOutcome::Invalid(errors) => {
                self.state.errors = errors;
                if errors.old_pin {
                    self.events.push(SessionEvent::message(MSG_OLD_PIN_INVALID));
                }
                if errors.any_input() {
                    self.events.push(SessionEvent::message(MSG_FILL_ALL_FIELDS));
                }
                Ok(false)
            }
            PinSetupOutcome::Saved => {
                self.state.form = PinSetupForm::default();
                self.state.errors = PinFieldErrors::default();
                self.state.security_question_verified = false;
                self.poll();
                self.events.push(SessionEvent::message(MSG_PIN_SAVED));
                self.leave();
                Ok(true)
            }
        }
    }

    /// Opens the reset dialog when a security question exists.
    pub fn open_reset_dialog(&mut self) -> Result<(), ServiceError> {
        let credentials = self.pins.credentials()?;
        if !credentials.has_security_question() {
            self.events.push(SessionEvent::message(MSG_RESET_NEEDS_QUESTION));
            return Ok(());
        }
        self.state.reset_dialog = Some(ResetDialog {
            question: credentials.security_question.unwrap_or_default(),
            ..ResetDialog::default()
        });
        Ok(())
    }

    pub fn set_reset_answer(&mut self, input: impl Into<String>) {
        if let Some(dialog) = self.state.reset_dialog.as_mut() {
            dialog.answer = input.into();
            dialog.error = false;
        }
    }

    /// Clears the PIN when the dialog answer matches.
    pub fn confirm_reset(&mut self) -> Result<bool, ServiceError> {
        let answer = self
            .state
            .reset_dialog
            .as_ref()
            .map(|dialog| dialog.answer.clone())
            .unwrap_or_default();

        match self.pins.reset_pin(&answer)? {
            PinResetOutcome::Cleared => {
                self.state.reset_dialog = None;
                self.state.form = PinSetupForm::default();
                self.state.errors = PinFieldErrors::default();
                self.state.security_question_verified = false;
                self.poll();
                self.events.push(SessionEvent::message(MSG_PIN_RESET));
                Ok(true)
            }
            PinResetOutcome::NoSecurityQuestion | PinResetOutcome::WrongAnswer => {
                if let Some(dialog) = self.state.reset_dialog.as_mut() {
                    dialog.error = true;
                }
                self.events.push(SessionEvent::message(MSG_RESET_REJECTED));
                Ok(false)
            }
        }
    }

    pub fn dismiss_reset_dialog(&mut self) {
        self.state.reset_dialog = None;
    }

    /// Leaves the screen unless a reset PIN still awaits replacement.
    pub fn request_navigate_back(&mut self) -> bool {
        self.poll();
        if self.needs_answer_for(&self.credentials) {
            self.events.push(SessionEvent::message(MSG_LEAVE_BLOCKED));
            return false;
        }
        self.leave();
        true
    }

    fn needs_answer_for(&self, credentials: &Credentials) -> bool {
        credentials.awaiting_resetup() && !self.state.security_question_verified
    }

    fn leave(&mut self) {
        if !self.navigating {
            self.navigating = true;
            self.events.push(SessionEvent::SettingsSaved);
        }
    }
}
