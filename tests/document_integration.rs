use std::time::{Duration, Instant};

use mdpad::Error;
use mdpad::document::{ControllerConfig, DocumentController, SEED_TEXT, SaveState};
use mdpad::editor::{Direction, Selection};
use mdpad::store::{FileStore, KeyValueStore};

fn config() -> ControllerConfig {
    ControllerConfig::default()
}

#[test]
fn test_first_launch_shows_seed() {
    let dir = tempfile::tempdir().unwrap();
    let doc = DocumentController::open(config(), FileStore::new(dir.path().join("store.json")));
    assert_eq!(doc.text(), SEED_TEXT);
    assert_eq!(doc.save_state(), SaveState::Idle);
}

#[test]
fn test_edits_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let t0 = Instant::now();

    let mut doc = DocumentController::open(config(), FileStore::new(&path));
    doc.replace_text("# Draft\n\nkept across sessions", t0);
    assert!(doc.poll_autosave(t0 + Duration::from_millis(299)).is_none());
    assert!(matches!(
        doc.poll_autosave(t0 + Duration::from_millis(300)),
        Some(Ok(()))
    ));
    drop(doc);

    let reopened = DocumentController::open(config(), FileStore::new(&path));
    assert_eq!(reopened.text(), "# Draft\n\nkept across sessions");
    assert_eq!(reopened.word_count(), 5);
}

#[test]
fn test_unflushed_edit_is_lost_but_flush_keeps_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let now = Instant::now();

    let mut doc = DocumentController::open(config(), FileStore::new(&path));
    doc.replace_text("pending", now);
    drop(doc);
    assert_eq!(
        DocumentController::open(config(), FileStore::new(&path)).text(),
        SEED_TEXT
    );

    let mut doc = DocumentController::open(config(), FileStore::new(&path));
    doc.replace_text("flushed", now);
    assert!(matches!(doc.flush_autosave(), Some(Ok(()))));
    assert!(doc.flush_autosave().is_none());
    drop(doc);
    assert_eq!(
        DocumentController::open(config(), FileStore::new(&path)).text(),
        "flushed"
    );
}

#[test]
fn test_empty_snapshot_falls_back_to_seed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let mut store = FileStore::new(&path);
    store.set("markdown", "").unwrap();

    let doc = DocumentController::open(config(), FileStore::new(&path));
    assert_eq!(doc.text(), SEED_TEXT);
}

#[test]
fn test_unreadable_store_keeps_seed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "{ not json").unwrap();

    let doc = DocumentController::open(config(), FileStore::new(&path));
    assert_eq!(doc.text(), SEED_TEXT);
}

#[test]
fn test_failed_write_is_reported_and_buffer_kept() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the store file should be makes every write fail
    let path = dir.path().join("store.json");
    std::fs::create_dir(&path).unwrap();
    let now = Instant::now();

    let mut doc = DocumentController::open(config(), FileStore::new(&path));
    doc.replace_text("still here", now);
    let result = doc.poll_autosave(now + Duration::from_secs(1));
    assert!(matches!(result, Some(Err(Error::StorageUnavailable(_)))));
    assert_eq!(doc.text(), "still here");
}

#[test]
fn test_rejected_import_leaves_buffer() {
    let mut doc = DocumentController::open(
        config(),
        FileStore::new(tempfile::tempdir().unwrap().path().join("s.json")),
    );
    let before = doc.text();
    let revision = doc.revision();

    let result = doc.import("notes.txt", "replacement", Instant::now());
    assert!(matches!(result, Err(Error::UnsupportedFormat { .. })));
    assert_eq!(doc.text(), before);
    assert_eq!(doc.revision(), revision);
    assert!(doc.next_deadline().is_none());
}

#[test]
fn test_import_then_export_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = DocumentController::open(config(), FileStore::new(dir.path().join("s.json")));
    doc.import("notes.md", "# Notes\n\n- one\n- two\n", Instant::now())
        .unwrap();

    let first = doc.export();
    let second = doc.export();
    assert_eq!(first, second);
    assert_eq!(first.file_name, "markdown-preview.md");
    assert_eq!(first.mime_type, "text/markdown");
    assert_eq!(first.bytes, b"# Notes\n\n- one\n- two\n");
}

#[test]
fn test_markup_out_of_range_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = DocumentController::open(
        ControllerConfig {
            seed_text: "abc".to_string(),
            ..config()
        },
        FileStore::new(dir.path().join("s.json")),
    );

    let result = doc.apply_markup(Selection::new(1, 10), "**", "**", Instant::now());
    assert!(matches!(result, Err(Error::InvalidRange { .. })));
    assert_eq!(doc.text(), "abc");

    let selection = doc
        .apply_markup(Selection::new(0, 3), "_", "_", Instant::now())
        .unwrap();
    assert_eq!(doc.text(), "_abc_");
    assert_eq!(selection, Selection::caret(5));
}

#[test]
fn test_imported_crlf_and_form_feed_text_stays_editable() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = DocumentController::open(config(), FileStore::new(dir.path().join("s.json")));
    let now = Instant::now();
    doc.import("page.md", "one\u{c}two\r\nthree", now).unwrap();
    assert_eq!(doc.buffer().line_count(), 2);

    doc.navigate(mdpad::editor::EditorBuffer::move_end);
    doc.edit(now, |buf| {
        buf.insert_char('!');
        true
    });
    doc.navigate(|buf| buf.move_cursor(Direction::Left));
    assert_eq!(doc.text(), "one\u{c}two!\r\nthree");

    doc.navigate(|buf| {
        buf.move_cursor(Direction::Down);
        buf.move_home();
    });
    doc.edit(now, mdpad::editor::EditorBuffer::delete_back);
    assert_eq!(doc.text(), "one\u{c}two!three");
    assert_eq!(doc.buffer().line_count(), 1);
}
