//! Access gate for protected notes and PIN setup validation.
//!
//! # Responsibility
//! - Decide whether a protected note may be opened.
//! - Validate PIN set/change input, flagging every invalid field at once.
//!
//! # Invariants
//! - Protected notes never open without a PIN match in the same attempt.
//! - Nothing here touches storage; callers pass credential snapshots in.

pub mod pin_form;
pub mod pin_gate;
