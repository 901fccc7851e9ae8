//! Core domain logic for PinNote.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod security;
pub mod service;
pub mod session;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::credentials::Credentials;
pub use model::note::{Note, NoteId, NoteValidationError};
pub use model::order::{NoteOrder, OrderType};
pub use repo::feed::{ChangeFeed, Subscription};
pub use repo::note_repo::{NoteFeed, NoteRepository, SqliteNoteRepository};
pub use repo::preference_repo::{
    PrefKey, PreferenceFeed, PreferenceRepository, SqlitePreferenceRepository,
};
pub use repo::{RepoError, RepoResult};
pub use search::query::query_notes;
pub use security::pin_form::{PinFieldErrors, PinSetupForm};
pub use security::pin_gate::{GateState, OpenDecision, PinGate, PinOutcome, PinPrompt};
pub use service::note_service::{BulkDeleteReport, NoteService};
pub use service::pin_service::{PinResetOutcome, PinService, PinSetupOutcome};
pub use service::ServiceError;
pub use session::event::SessionEvent;
pub use session::note_editor::{EditorState, NoteEditorSession};
pub use session::note_list::{NoteListSession, NotesState};
pub use session::pin_settings::{PinSettingsSession, PinSettingsState, ResetDialog};
pub use session::selection::SelectionSet;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
