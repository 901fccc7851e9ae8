//! PIN use-case service.
//!
//! # Responsibility
//! - Check PINs, save PIN setups and reset PINs against the preference
//!   store.
//!
//! # Invariants
//! - A setup after a reset is refused until the security answer has been
//!   re-verified by the caller.
//! - A reset keeps the security question and answer.

use crate::model::credentials::Credentials;
use crate::repo::feed::Subscription;
use crate::repo::preference_repo::PreferenceRepository;
use crate::repo::RepoResult;
use crate::security::pin_form::{PinFieldErrors, PinSetupForm};
use log::{info, warn};

/// Result of a PIN setup attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinSetupOutcome {
    Saved,
    /// Forced re-setup is active and the security answer was not verified.
    AnswerNotVerified,
    Invalid(PinFieldErrors),
}

/// Result of a PIN reset attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinResetOutcome {
    Cleared,
    NoSecurityQuestion,
    WrongAnswer,
}

pub struct PinService<P: PreferenceRepository> {
    prefs: P,
}

impl<P: PreferenceRepository> PinService<P> {
    pub fn new(prefs: P) -> Self {
        Self { prefs }
    }

    pub fn credentials(&self) -> RepoResult<Credentials> {
        self.prefs.load_credentials()
    }

    pub fn observe(&self) -> RepoResult<Subscription<Credentials>> {
        self.prefs.observe()
    }

    /// Exact comparison against the stored PIN.
    pub fn check_pin(&self, entered: &str) -> RepoResult<bool> {
        Ok(self.prefs.load_credentials()?.pin_matches(entered))
    }

    /// Trimmed, case-sensitive comparison against the stored answer.
    pub fn verify_security_answer(&self, entered: &str) -> RepoResult<bool> {
        let verified = self.prefs.load_credentials()?.answer_matches(entered);
        info!("event=security_answer_verify module=service status={}", status(verified));
        Ok(verified)
    }

    /// Saves a new PIN together with the security question and answer.
    pub fn setup_pin(&self, form: &PinSetupForm, answer_verified: bool) -> RepoResult<PinSetupOutcome> {
        let credentials = self.prefs.load_credentials()?;
        if credentials.force_setup_after_reset && !answer_verified {
            warn!("event=pin_setup module=service status=rejected reason=answer_not_verified");
            return Ok(PinSetupOutcome::AnswerNotVerified);
        }

        let errors = form.validate(&credentials);
        if errors.any() {
            warn!(
                "event=pin_setup module=service status=rejected reason=invalid_fields old_pin={} new_pin={} confirm_pin={} question={} answer={}",
                errors.old_pin, errors.new_pin, errors.confirm_pin, errors.question, errors.answer
            );
            return Ok(PinSetupOutcome::Invalid(errors));
        }

        self.prefs
            .save_pin_setup(&form.new_pin, &form.question, &form.answer)?;
        info!(
            "event=pin_setup module=service status=ok changed_existing={}",
            credentials.has_pin()
        );
        Ok(PinSetupOutcome::Saved)
    }

    /// Clears the PIN when `answer` matches the stored security answer.
    pub fn reset_pin(&self, answer: &str) -> RepoResult<PinResetOutcome> {
        let credentials = self.prefs.load_credentials()?;
        if !credentials.has_security_question() {
            warn!("event=pin_reset module=service status=rejected reason=no_security_question");
            return Ok(PinResetOutcome::NoSecurityQuestion);
        }
        if !credentials.answer_matches(answer) {
            warn!("event=pin_reset module=service status=rejected reason=wrong_answer");
            return Ok(PinResetOutcome::WrongAnswer);
        }

        self.prefs.clear_pin()?;
        info!("event=pin_reset module=service status=ok");
        Ok(PinResetOutcome::Cleared)
    }
}

fn status(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "rejected"
    }
}
