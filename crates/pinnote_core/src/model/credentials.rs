//! PIN and security-question credentials snapshot.
//!
//! # Invariants
//! - Values are plain strings; PIN comparison is exact equality.
//! - Security answers compare case-sensitively after trimming both sides,
//!   and a blank stored answer never matches.

/// Point-in-time view of the access credentials held in the preference
/// store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub pin: Option<String>,
    pub security_question: Option<String>,
    pub security_answer: Option<String>,
    /// Set when the PIN is cleared by a reset; cleared by the next
    /// successful PIN setup.
    pub force_setup_after_reset: bool,
}

impl Credentials {
    pub fn has_pin(&self) -> bool {
        self.pin.is_some()
    }

    /// True only when both question and answer are stored.
    pub fn has_security_question(&self) -> bool {
        self.security_question.is_some() && self.security_answer.is_some()
    }

    /// Exact, untrimmed PIN comparison.
    pub fn pin_matches(&self, entered: &str) -> bool {
        self.pin.as_deref() == Some(entered)
    }

    pub fn answer_matches(&self, entered: &str) -> bool {
        let stored = self.security_answer.as_deref().unwrap_or("").trim();
        !stored.is_empty() && entered.trim() == stored
    }

    /// PIN cleared by a reset and not yet configured again.
    pub fn awaiting_resetup(&self) -> bool {
        !self.has_pin() && self.force_setup_after_reset
    }
}
