use pinnote_core::db::open_db_in_memory;
use pinnote_core::{
    Note, NoteFeed, NoteRepository, NoteValidationError, RepoError, SqliteNoteRepository,
};
use rusqlite::Connection;

fn repo(conn: &Connection) -> SqliteNoteRepository<'_> {
    SqliteNoteRepository::try_new(conn, NoteFeed::new()).unwrap()
}

#[test]
fn insert_assigns_id_and_get_roundtrips() {
    let conn = open_db_in_memory().unwrap();
    let repo = repo(&conn);

    let mut note = Note::new("Groceries", "milk, eggs").protected(true);
    note.timestamp = 1_700_000_000_000;
    let id = repo.insert_note(&note).unwrap();

    let loaded = repo.get_note(id).unwrap().unwrap();
    assert_eq!(loaded.id, Some(id));
    assert_eq!(loaded.title, "Groceries");
    assert_eq!(loaded.content, "milk, eggs");
    assert_eq!(loaded.timestamp, 1_700_000_000_000);
    assert!(loaded.is_protected);
}

#[test]
fn list_all_returns_insertion_order_with_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = repo(&conn);
    let first = repo.insert_note(&Note::new("b", "")).unwrap();
    let second = repo.insert_note(&Note::new("a", "")).unwrap();

    let listed = repo.list_all().unwrap();
    assert_eq!(
        listed.iter().map(|note| note.id).collect::<Vec<_>>(),
        vec![Some(first), Some(second)]
    );
}

#[test]
fn insert_keeps_explicit_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = repo(&conn);
    let mut note = Note::new("restored", "");
    note.id = Some(42);

    assert_eq!(repo.insert_note(&note).unwrap(), 42);
    assert!(repo.get_note(42).unwrap().is_some());
}

#[test]
fn insert_rejects_blank_note() {
    let conn = open_db_in_memory().unwrap();
    let repo = repo(&conn);

    let err = repo.insert_note(&Note::new("  ", "")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(NoteValidationError::EmptyNote)
    ));
    assert!(repo.list_all().unwrap().is_empty());
}

#[test]
fn update_replaces_fields_and_requires_existing_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = repo(&conn);
    let id = repo.insert_note(&Note::new("draft", "")).unwrap();

    let mut note = repo.get_note(id).unwrap().unwrap();
    note.title = "final".to_string();
    note.is_protected = true;
    repo.update_note(&note).unwrap();
    assert_eq!(repo.get_note(id).unwrap().unwrap(), note);

    note.id = Some(id + 100);
    assert!(matches!(
        repo.update_note(&note).unwrap_err(),
        RepoError::NotFound(missing) if missing == id + 100
    ));

    note.id = None;
    assert!(matches!(
        repo.update_note(&note).unwrap_err(),
        RepoError::InvalidData(_)
    ));
}

#[test]
fn delete_is_permanent_and_reports_missing_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = repo(&conn);
    let id = repo.insert_note(&Note::new("gone", "")).unwrap();

    repo.delete_note(id).unwrap();
    assert!(repo.get_note(id).unwrap().is_none());
    assert!(matches!(
        repo.delete_note(id).unwrap_err(),
        RepoError::NotFound(missing) if missing == id
    ));
}

#[test]
fn observe_all_emits_current_list_then_every_change() {
    let conn = open_db_in_memory().unwrap();
    let repo = repo(&conn);
    let existing = repo.insert_note(&Note::new("existing", "")).unwrap();

    let sub = repo.observe_all().unwrap();
    assert_eq!(sub.try_next().unwrap().len(), 1);
    assert!(sub.try_next().is_none());

    let added = repo.insert_note(&Note::new("added", "")).unwrap();
    assert_eq!(sub.try_next().unwrap().len(), 2);

    repo.delete_note(existing).unwrap();
    let after_delete = sub.try_next().unwrap();
    assert_eq!(after_delete.len(), 1);
    assert_eq!(after_delete[0].id, Some(added));
}

#[test]
fn handles_sharing_a_feed_see_each_others_writes() {
    let conn = open_db_in_memory().unwrap();
    let feed = NoteFeed::new();
    let reader = SqliteNoteRepository::try_new(&conn, feed.clone()).unwrap();
    let writer = SqliteNoteRepository::try_new(&conn, feed).unwrap();

    let sub = reader.observe_all().unwrap();
    writer.insert_note(&Note::new("from writer", "")).unwrap();

    let latest = sub.latest().unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].title, "from writer");
}

#[test]
fn failed_write_does_not_emit() {
    let conn = open_db_in_memory().unwrap();
    let repo = repo(&conn);
    let sub = repo.observe_all().unwrap();
    sub.latest();

    let _ = repo.delete_note(999);
    let _ = repo.insert_note(&Note::new("", ""));
    assert!(sub.try_next().is_none());
}

#[test]
fn try_new_rejects_connection_without_schema() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteNoteRepository::try_new(&conn, NoteFeed::new())
        .err()
        .unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("notes")));
}
