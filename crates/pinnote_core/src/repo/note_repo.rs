//! Note store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide point CRUD over the `notes` table.
//! - Expose a live read that re-emits the full note list after every write.
//!
//! # Invariants
//! - Reads return notes in ascending id order (insertion order).
//! - Every note returned by a read has `id = Some(_)`.
//! - Deletes are permanent; there is no tombstone.

use crate::model::note::{Note, NoteId};
use crate::repo::feed::{ChangeFeed, Subscription};
use crate::repo::{ensure_table, RepoError, RepoResult};
use log::{debug, error, info};
use rusqlite::{params, Connection, Row};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    timestamp,
    is_protected
FROM notes";

/// Live feed carrying full note-list snapshots.
pub type NoteFeed = ChangeFeed<Vec<Note>>;

/// Repository interface for the note store.
pub trait NoteRepository {
    /// Subscribes to the full note list; the current list arrives first.
    fn observe_all(&self) -> RepoResult<Subscription<Vec<Note>>>;
    /// Reads every note once.
    fn list_all(&self) -> RepoResult<Vec<Note>>;
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Inserts a note and returns its id.
    ///
    /// An explicit `note.id` is kept (used when restoring a deleted note);
    /// otherwise the store assigns the next id.
    fn insert_note(&self, note: &Note) -> RepoResult<NoteId>;
    /// Replaces every field of the note identified by `note.id`.
    fn update_note(&self, note: &Note) -> RepoResult<()>;
    fn delete_note(&self, id: NoteId) -> RepoResult<()>;
}

/// SQLite-backed note store.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
    feed: NoteFeed,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// Handles built over the same database should share one `feed` so a
    /// write through any handle reaches every subscriber.
    pub fn try_new(conn: &'conn Connection, feed: NoteFeed) -> RepoResult<Self> {
        ensure_table(conn, "notes")?;
        Ok(Self { conn, feed })
    }

    fn notify(&self, op: &'static str) {
        match self.list_all() {
            Ok(notes) => {
                let delivered = self.feed.publish(&notes);
                debug!("event=notes_publish module=repo status=ok op={op} subscribers={delivered}");
            }
            Err(err) => {
                error!("event=notes_publish module=repo status=error op={op} error={err}");
            }
        }
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn observe_all(&self) -> RepoResult<Subscription<Vec<Note>>> {
        let current = self.list_all()?;
        Ok(self.feed.subscribe(current))
    }

    fn list_all(&self) -> RepoResult<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_note_row(row)?)),
            None => Ok(None),
        }
    }

    fn insert_note(&self, note: &Note) -> RepoResult<NoteId> {
        note.validate()?;

        self.conn.execute(
            "INSERT INTO notes (id, title, content, timestamp, is_protected)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                note.id,
                note.title,
                note.content,
                note.timestamp,
                note.is_protected
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        info!(
            "event=note_insert module=repo status=ok note_id={id} protected={}",
            note.is_protected
        );
        self.notify("insert");
        Ok(id)
    }

    fn update_note(&self, note: &Note) -> RepoResult<()> {
        let Some(id) = note.id else {
            return Err(RepoError::InvalidData(
                "cannot update a note without an id".to_string(),
            ));
        };
        note.validate()?;

        let changed = self.conn.execute(
            "UPDATE notes
             SET
                title = ?2,
                content = ?3,
                timestamp = ?4,
                is_protected = ?5
             WHERE id = ?1;",
            params![
                id,
                note.title,
                note.content,
                note.timestamp,
                note.is_protected
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        info!(
            "event=note_update module=repo status=ok note_id={id} protected={}",
            note.is_protected
        );
        self.notify("update");
        Ok(())
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        info!("event=note_delete module=repo status=ok note_id={id}");
        self.notify("delete");
        Ok(())
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id: NoteId = row.get("id")?;
    let timestamp: i64 = row.get("timestamp")?;
    if timestamp < 0 {
        return Err(RepoError::InvalidData(format!(
            "note {id} has negative timestamp {timestamp}"
        )));
    }

    Ok(Note {
        id: Some(id),
        title: row.get("title")?,
        content: row.get("content")?,
        timestamp,
        is_protected: row.get("is_protected")?,
    })
}

