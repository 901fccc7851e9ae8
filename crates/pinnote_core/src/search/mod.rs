//! Note list query pipeline.
//!
//! # Responsibility
//! - Turn the raw note list into the list shown to the user.
//!
//! # See also
//! - `session::note_list` re-runs the pipeline on every store emission.

pub mod query;
