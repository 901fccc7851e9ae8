//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Keep every call stateless: open the store, run one use case, close.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported inside response envelopes, never as panics.

use log::warn;
use pinnote_core::db::open_db;
use pinnote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CoreConfig, Note, NoteFeed, NoteId, NoteOrder, NoteService, OrderType, PinResetOutcome,
    PinService, PinSetupForm, PinSetupOutcome, PreferenceFeed, ServiceError,
    SqliteNoteRepository, SqlitePreferenceRepository,
};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Note projection shown in list and editor screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub is_protected: bool,
}

/// Note list response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesQueryResponse {
    pub ok: bool,
    pub items: Vec<NoteItem>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Single-note write response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    pub ok: bool,
    pub note: Option<NoteItem>,
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note: Note) -> Self {
        Self {
            ok: true,
            note: to_note_item(note),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkDeleteResponse {
    pub deleted: Vec<i64>,
    pub failed: Vec<i64>,
    pub message: String,
}

/// Credential summary; never carries the PIN or answer themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinStatusResponse {
    pub ok: bool,
    pub has_pin: bool,
    pub has_security_question: bool,
    pub force_setup_after_reset: bool,
    pub security_question: Option<String>,
    pub message: String,
}

/// PIN mutation response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinActionResponse {
    pub ok: bool,
    /// Per-field error flags, in form order: old, new, confirm, question,
    /// answer.
    pub field_errors: Vec<bool>,
    pub message: String,
}

impl PinActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            field_errors: Vec::new(),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            field_errors: Vec::new(),
            message: message.into(),
        }
    }
}

/// Lists notes through the visibility, search and sort pipeline.
///
/// Input semantics:
/// - `order_key`: `title|date`; `direction`: `ascending|descending`.
/// - Blank `search_text` disables text filtering.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_query(
    order_key: String,
    direction: String,
    search_text: String,
    include_protected: bool,
) -> NotesQueryResponse {
    notes_query_at(
        &resolve_db_path(),
        &order_key,
        &direction,
        &search_text,
        include_protected,
    )
}

/// Inserts (`id=None`) or replaces a note, stamping the current time.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Protected notes are refused while no PIN is configured.
#[flutter_rust_bridge::frb(sync)]
pub fn note_save(
    id: Option<i64>,
    title: String,
    content: String,
    is_protected: bool,
) -> NoteActionResponse {
    note_save_at(&resolve_db_path(), id, title, content, is_protected)
}

/// Deletes one note; the response carries it so the caller can undo.
#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(id: i64) -> NoteActionResponse {
    note_delete_at(&resolve_db_path(), id)
}

/// Re-inserts a previously deleted note, keeping its id when still free.
#[flutter_rust_bridge::frb(sync)]
pub fn note_restore(note: NoteItem) -> NoteActionResponse {
    note_restore_at(&resolve_db_path(), note)
}

/// Deletes every id, continuing past individual failures.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_bulk_delete(ids: Vec<i64>) -> BulkDeleteResponse {
    notes_bulk_delete_at(&resolve_db_path(), ids)
}

#[flutter_rust_bridge::frb(sync)]
pub fn pin_status() -> PinStatusResponse {
    pin_status_at(&resolve_db_path())
}

/// Exact comparison against the stored PIN; `false` on any failure.
#[flutter_rust_bridge::frb(sync)]
pub fn pin_verify(pin: String) -> bool {
    pin_verify_at(&resolve_db_path(), &pin)
}

/// Trimmed, case-sensitive comparison against the stored answer.
#[flutter_rust_bridge::frb(sync)]
pub fn security_answer_verify(answer: String) -> bool {
    security_answer_verify_at(&resolve_db_path(), &answer)
}

/// Sets or changes the PIN together with the security question.
///
/// `answer_verified` must be true while a reset PIN awaits replacement.
#[flutter_rust_bridge::frb(sync)]
pub fn pin_setup(
    old_pin: String,
    new_pin: String,
    confirm_pin: String,
    question: String,
    answer: String,
    answer_verified: bool,
) -> PinActionResponse {
    let form = PinSetupForm {
        old_pin,
        new_pin,
        confirm_pin,
        question,
        answer,
    };
    pin_setup_at(&resolve_db_path(), &form, answer_verified)
}

/// Clears the PIN when `answer` matches the stored security answer.
#[flutter_rust_bridge::frb(sync)]
pub fn pin_reset(answer: String) -> PinActionResponse {
    pin_reset_at(&resolve_db_path(), &answer)
}

fn notes_query_at(
    db_path: &Path,
    order_key: &str,
    direction: &str,
    search_text: &str,
    include_protected: bool,
) -> NotesQueryResponse {
    let result = parse_order(order_key, direction).and_then(|order| {
        with_services(db_path, |notes, _| {
            notes.query(order, search_text, include_protected)
        })
    });
    match result {
        Ok(found) => {
            let items = found.into_iter().filter_map(to_note_item).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No notes.".to_string()
            } else {
                format!("Found {} note(s).", items.len())
            };
            NotesQueryResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => NotesQueryResponse {
            ok: false,
            items: Vec::new(),
            message: format!("notes_query failed: {err}"),
        },
    }
}

fn note_save_at(
    db_path: &Path,
    id: Option<NoteId>,
    title: String,
    content: String,
    is_protected: bool,
) -> NoteActionResponse {
    let result = with_services(db_path, |notes, pins| {
        let draft = Note {
            id,
            ..Note::new(title, content).protected(is_protected)
        };
        let has_pin = pins.credentials()?.has_pin();
        notes.save_note(draft, has_pin)
    });
    match result {
        Ok(note) => NoteActionResponse::success("Note saved.", note),
        Err(err) => NoteActionResponse::failure(format!("note_save failed: {err}")),
    }
}

fn note_delete_at(db_path: &Path, id: NoteId) -> NoteActionResponse {
    match with_services(db_path, |notes, _| notes.delete_note(id)) {
        Ok(note) => NoteActionResponse::success("Note deleted.", note),
        Err(err) => NoteActionResponse::failure(format!("note_delete failed: {err}")),
    }
}

fn note_restore_at(db_path: &Path, item: NoteItem) -> NoteActionResponse {
    let note = Note {
        id: Some(item.id),
        title: item.title,
        content: item.content,
        timestamp: item.timestamp,
        is_protected: item.is_protected,
    };
    let result = with_services(db_path, |notes, _| {
        let id = notes.restore_note(&note)?;
        notes
            .get_note(id)?
            .ok_or(ServiceError::InconsistentState("restored note not found in read-back"))
    });
    match result {
        Ok(note) => NoteActionResponse::success("Note restored.", note),
        Err(err) => NoteActionResponse::failure(format!("note_restore failed: {err}")),
    }
}

fn notes_bulk_delete_at(db_path: &Path, ids: Vec<NoteId>) -> BulkDeleteResponse {
    match with_services(db_path, |notes, _| Ok(notes.delete_many(ids))) {
        Ok(report) => {
            let mut message = format!("{} note(s) permanently deleted.", report.deleted.len());
            if !report.failed.is_empty() {
                message.push_str(&format!(
                    " {} note(s) could not be deleted.",
                    report.failed.len()
                ));
            }
            BulkDeleteResponse {
                deleted: report.deleted,
                failed: report.failed.into_iter().map(|(id, _)| id).collect(),
                message,
            }
        }
        Err(err) => BulkDeleteResponse {
            deleted: Vec::new(),
            failed: Vec::new(),
            message: format!("notes_bulk_delete failed: {err}"),
        },
    }
}

fn pin_status_at(db_path: &Path) -> PinStatusResponse {
    match with_services(db_path, |_, pins| Ok(pins.credentials()?)) {
        Ok(credentials) => PinStatusResponse {
            ok: true,
            has_pin: credentials.has_pin(),
            has_security_question: credentials.has_security_question(),
            force_setup_after_reset: credentials.force_setup_after_reset,
            security_question: credentials.security_question,
            message: String::new(),
        },
        Err(err) => PinStatusResponse {
            ok: false,
            has_pin: false,
            has_security_question: false,
            force_setup_after_reset: false,
            security_question: None,
            message: format!("pin_status failed: {err}"),
        },
    }
}

fn pin_verify_at(db_path: &Path, pin: &str) -> bool {
    with_services(db_path, |_, pins| Ok(pins.check_pin(pin)?)).unwrap_or_else(|err| {
        warn!("event=pin_verify module=ffi status=error error={err}");
        false
    })
}

fn security_answer_verify_at(db_path: &Path, answer: &str) -> bool {
    with_services(db_path, |_, pins| Ok(pins.verify_security_answer(answer)?)).unwrap_or_else(
        |err| {
            warn!("event=security_answer_verify module=ffi status=error error={err}");
            false
        },
    )
}

fn pin_setup_at(db_path: &Path, form: &PinSetupForm, answer_verified: bool) -> PinActionResponse {
    match with_services(db_path, |_, pins| Ok(pins.setup_pin(form, answer_verified)?)) {
        Ok(PinSetupOutcome::Saved) => {
            PinActionResponse::success("PIN and security question updated successfully!")
        }
        Ok(PinSetupOutcome::AnswerNotVerified) => PinActionResponse::failure(
            "Verify your security question before setting a new PIN.",
        ),
        Ok(PinSetupOutcome::Invalid(errors)) => PinActionResponse {
            ok: false,
            field_errors: vec![
                errors.old_pin,
                errors.new_pin,
                errors.confirm_pin,
                errors.question,
                errors.answer,
            ],
            message: if errors.any_input() {
                "Please fill in all fields and make sure the PINs match.".to_string()
            } else {
                "Old PIN is wrong or empty!".to_string()
            },
        },
        Err(err) => PinActionResponse::failure(format!("pin_setup failed: {err}")),
    }
}

fn pin_reset_at(db_path: &Path, answer: &str) -> PinActionResponse {
    match with_services(db_path, |_, pins| Ok(pins.reset_pin(answer)?)) {
        Ok(PinResetOutcome::Cleared) => PinActionResponse::success(
            "PIN reset. Verify your security question to set a new PIN.",
        ),
        Ok(PinResetOutcome::NoSecurityQuestion) => {
            PinActionResponse::failure("Set a security question before resetting the PIN!")
        }
        Ok(PinResetOutcome::WrongAnswer) => {
            PinActionResponse::failure("Wrong answer or no security question set!")
        }
        Err(err) => PinActionResponse::failure(format!("pin_reset failed: {err}")),
    }
}

fn parse_order(order_key: &str, direction: &str) -> Result<NoteOrder, String> {
    let order_type = match direction.trim().to_ascii_lowercase().as_str() {
        "ascending" => OrderType::Ascending,
        "descending" => OrderType::Descending,
        other => return Err(format!("unsupported direction `{other}`")),
    };
    match order_key.trim().to_ascii_lowercase().as_str() {
        "title" => Ok(NoteOrder::Title(order_type)),
        "date" => Ok(NoteOrder::Date(order_type)),
        other => Err(format!("unsupported order key `{other}`")),
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| match CoreConfig::from_env() {
            Ok(config) => config.db_path,
            Err(err) => {
                warn!("event=config_load module=ffi status=error error={err}");
                CoreConfig::default().db_path
            }
        })
        .clone()
}

fn with_services<T>(
    db_path: &Path,
    f: impl FnOnce(
        &NoteService<SqliteNoteRepository<'_>>,
        &PinService<SqlitePreferenceRepository<'_>>,
    ) -> Result<T, ServiceError>,
) -> Result<T, String> {
    let conn = open_db(db_path).map_err(|err| format!("DB open failed: {err}"))?;
    let note_repo = SqliteNoteRepository::try_new(&conn, NoteFeed::new())
        .map_err(|err| format!("note repo init failed: {err}"))?;
    let pref_repo = SqlitePreferenceRepository::try_new(&conn, PreferenceFeed::new())
        .map_err(|err| format!("preference repo init failed: {err}"))?;
    let notes = NoteService::new(note_repo);
    let pins = PinService::new(pref_repo);
    f(&notes, &pins).map_err(|err| err.to_string())
}

fn to_note_item(note: Note) -> Option<NoteItem> {
    Some(NoteItem {
        id: note.id?,
        title: note.title,
        content: note.content,
        timestamp: note.timestamp,
        is_protected: note.is_protected,
    })
}
