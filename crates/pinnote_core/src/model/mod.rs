//! Domain model for notes, list ordering and PIN credentials.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep validation rules next to the types they protect.
//!
//! # Invariants
//! - Every note returned by a store read carries an id.
//! - Security question and answer are stored together.

pub mod credentials;
pub mod note;
pub mod order;
