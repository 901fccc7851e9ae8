//! Per-screen state holders.
//!
//! # Responsibility
//! - Own one screen's worth of state and serialize every change through
//!   `&mut self` methods.
//! - Turn validation and authorization failures into queued
//!   `SessionEvent`s instead of errors.
//!
//! # Invariants
//! - Each session holds at most one live note subscription; re-subscribing
//!   drops the previous one first.
//! - Only storage failures surface as `ServiceError`.

pub mod event;
pub mod note_editor;
pub mod note_list;
pub mod pin_settings;
pub mod selection;
