//! PIN set/change form and its validation.

use crate::model::credentials::Credentials;

/// Raw user input of the PIN settings screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinSetupForm {
    /// Only checked when a PIN already exists.
    pub old_pin: String,
    pub new_pin: String,
    pub confirm_pin: String,
    pub question: String,
    pub answer: String,
}

/// Per-field error flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PinFieldErrors {
    pub old_pin: bool,
    pub new_pin: bool,
    pub confirm_pin: bool,
    pub question: bool,
    pub answer: bool,
}

impl PinFieldErrors {
    pub fn any(&self) -> bool {
        self.old_pin || self.new_pin || self.confirm_pin || self.question || self.answer
    }

    /// Any flag other than the old-PIN check.
    pub fn any_input(&self) -> bool {
        self.new_pin || self.confirm_pin || self.question || self.answer
    }
}

impl PinSetupForm {
    /// Checks every field and flags all failures together.
    pub fn validate(&self, credentials: &Credentials) -> PinFieldErrors {
        PinFieldErrors {
            old_pin: credentials.has_pin()
                && (is_blank(&self.old_pin) || !credentials.pin_matches(&self.old_pin)),
            new_pin: is_blank(&self.new_pin),
            confirm_pin: is_blank(&self.confirm_pin) || self.new_pin != self.confirm_pin,
            question: is_blank(&self.question),
            answer: is_blank(&self.answer),
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
