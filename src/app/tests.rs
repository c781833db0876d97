use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use tempfile::tempdir;

use crate::config::LayoutMode;
use crate::debounce::Debouncer;
use crate::document::{ControllerConfig, SaveState};
use crate::editor::{Direction, MarkupAction};
use crate::store::{KeyValueStore, MemoryStore};

use super::{App, Message, Model, ToastLevel, update};

const KEY: &str = "markdown";

fn create_test_model(text: &str) -> Model {
    let config = ControllerConfig {
        seed_text: text.to_string(),
        ..ControllerConfig::default()
    };
    Model::new(config, Box::new(MemoryStore::new()), (80, 24))
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn stored(model: &Model) -> Option<String> {
    model.document.store().get(KEY).unwrap()
}

#[test]
fn test_typing_updates_buffer_and_word_count() {
    let mut model = create_test_model("");
    let now = Instant::now();
    for ch in "two words".chars() {
        update(&mut model, Message::InsertChar(ch), now);
    }
    assert_eq!(model.document.text(), "two words");
    assert_eq!(model.document.word_count(), 2);
    assert_eq!(model.document.save_state(), SaveState::PendingSave);
}

#[test]
fn test_autosave_fires_after_quiet_period() {
    let mut model = create_test_model("");
    let t0 = Instant::now();
    update(&mut model, Message::InsertChar('a'), t0);

    assert!(model.document.poll_autosave(t0 + Duration::from_millis(100)).is_none());
    assert_eq!(stored(&model), None);

    let result = model.document.poll_autosave(t0 + Duration::from_millis(300));
    assert!(matches!(result, Some(Ok(()))));
    assert_eq!(stored(&model).as_deref(), Some("a"));
    assert_eq!(model.document.save_state(), SaveState::Idle);
}

#[test]
fn test_typing_burst_saves_once_with_final_text() {
    let mut model = create_test_model("");
    let t0 = Instant::now();
    for (i, ch) in "abc".chars().enumerate() {
        let at = t0 + Duration::from_millis(100 * u64::try_from(i).unwrap());
        update(&mut model, Message::InsertChar(ch), at);
    }

    // The last keystroke at +200ms pushes the deadline to +500ms
    assert!(model.document.poll_autosave(t0 + Duration::from_millis(350)).is_none());
    assert!(model.document.poll_autosave(t0 + Duration::from_millis(500)).is_some());
    assert_eq!(stored(&model).as_deref(), Some("abc"));
    assert!(model.document.poll_autosave(t0 + Duration::from_secs(5)).is_none());
}

#[test]
fn test_cursor_movement_does_not_arm_autosave() {
    let mut model = create_test_model("hello world");
    let now = Instant::now();
    update(&mut model, Message::MoveToEnd, now);
    update(&mut model, Message::MoveWordLeft, now);
    update(&mut model, Message::Select(Direction::Right), now);
    assert_eq!(model.document.save_state(), SaveState::Idle);
    assert!(model.document.next_deadline().is_none());
}

#[test]
fn test_bold_shortcut_wraps_selection() {
    let mut model = create_test_model("bold");
    let now = Instant::now();
    update(&mut model, Message::SelectAll, now);
    update(&mut model, Message::Markup(MarkupAction::Bold), now);
    assert_eq!(model.document.text(), "**bold**");
    assert_eq!(model.document.save_state(), SaveState::PendingSave);
}

#[test]
fn test_markup_at_caret_inserts_tokens() {
    let mut model = create_test_model("");
    update(&mut model, Message::Markup(MarkupAction::Link), Instant::now());
    assert_eq!(model.document.text(), "[](https://)");
}

#[test]
fn test_paste_replaces_selection() {
    let mut model = create_test_model("old");
    let now = Instant::now();
    update(&mut model, Message::SelectAll, now);
    update(&mut model, Message::InsertText("new\ntext".into()), now);
    assert_eq!(model.document.text(), "new\ntext");
}

#[test]
fn test_rejected_import_keeps_buffer_and_shows_error() {
    let mut model = create_test_model("keep me");
    update(
        &mut model,
        Message::Import("notes.txt".into()),
        Instant::now(),
    );

    assert_eq!(model.document.text(), "keep me");
    assert!(model.import_request.is_none());
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Error);
    assert!(message.contains("notes.txt"));
}

#[test]
fn test_accepted_import_is_queued_for_worker() {
    let mut model = create_test_model("");
    update(&mut model, Message::Import("notes.md".into()), Instant::now());
    assert_eq!(model.import_request, Some("notes.md".into()));
    assert!(model.active_toast().is_none());
}

#[test]
fn test_second_import_while_busy_is_refused() {
    let mut model = create_test_model("");
    model.importing = Some("first.md".to_string());
    update(&mut model, Message::Import("second.md".into()), Instant::now());
    assert!(model.import_request.is_none());
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Warning);
}

#[test]
fn test_loaded_import_replaces_buffer() {
    let mut model = create_test_model("old text");
    model.importing = Some("notes.md".to_string());
    let now = Instant::now();
    update(
        &mut model,
        Message::ImportLoaded {
            name: "/tmp/notes.md".to_string(),
            content: Ok("# Imported\n\nthree more words".to_string()),
        },
        now,
    );

    assert_eq!(model.document.text(), "# Imported\n\nthree more words");
    assert_eq!(model.document.word_count(), 5);
    assert!(model.importing.is_none());
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Info);
    assert!(message.contains("notes.md"));
    assert_eq!(model.document.next_deadline(), Some(now + Duration::from_millis(300)));
}

#[test]
fn test_failed_read_keeps_buffer() {
    let mut model = create_test_model("old text");
    update(
        &mut model,
        Message::ImportLoaded {
            name: "gone.md".to_string(),
            content: Err("No such file".to_string()),
        },
        Instant::now(),
    );
    assert_eq!(model.document.text(), "old text");
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Error);
}

#[test]
fn test_import_flow_through_worker() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("draft.md");
    std::fs::write(&path, "imported body").unwrap();

    let mut model = create_test_model("seed");
    let (tx, rx) = mpsc::channel();
    let msg = Message::Import(path);
    update(&mut model, msg.clone(), Instant::now());
    App::handle_message_side_effects(&mut model, &msg, &tx);
    assert_eq!(model.importing.as_deref(), Some("draft.md"));

    let loaded = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    update(&mut model, loaded, Instant::now());
    assert_eq!(model.document.text(), "imported body");
    assert!(model.importing.is_none());
}

#[test]
fn test_export_writes_file_and_is_repeatable() {
    let dir = tempdir().unwrap();
    let mut model = create_test_model("# Export me").with_export_dir(dir.path().to_path_buf());
    let (tx, _rx) = mpsc::channel();

    App::handle_message_side_effects(&mut model, &Message::Export, &tx);
    let path = dir.path().join("markdown-preview.md");
    let first = std::fs::read(&path).unwrap();
    App::handle_message_side_effects(&mut model, &Message::Export, &tx);
    let second = std::fs::read(&path).unwrap();

    assert_eq!(first, b"# Export me");
    assert_eq!(first, second);
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Info);
    assert_eq!(model.document.save_state(), SaveState::Idle);
}

#[test]
fn test_export_failure_is_reported() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "not a directory").unwrap();
    let mut model = create_test_model("text").with_export_dir(blocker.join("sub"));
    let (tx, _rx) = mpsc::channel();

    App::handle_message_side_effects(&mut model, &Message::Export, &tx);
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Error);
    assert!(message.starts_with("Export failed"));
}

#[test]
fn test_prompt_flow_submits_typed_path() {
    let mut model = create_test_model("");
    let now = Instant::now();
    let msg = App::handle_key(ctrl('o'), &model).unwrap();
    assert_eq!(msg, Message::OpenImportPrompt);
    update(&mut model, msg, now);

    for ch in "a.mdx".chars() {
        let msg = App::handle_key(key(KeyCode::Char(ch)), &model).unwrap();
        update(&mut model, msg, now);
    }
    let msg = App::handle_key(key(KeyCode::Backspace), &model).unwrap();
    update(&mut model, msg, now);
    assert_eq!(model.import_prompt.as_deref(), Some("a.md"));

    let msg = App::handle_key(key(KeyCode::Enter), &model).unwrap();
    assert_eq!(msg, Message::PromptSubmit);
    update(&mut model, msg, now);
    assert!(model.import_prompt.is_none());
    assert_eq!(model.import_request, Some("a.md".into()));
}

#[test]
fn test_prompt_escape_cancels() {
    let mut model = create_test_model("");
    update(&mut model, Message::OpenImportPrompt, Instant::now());
    let msg = App::handle_key(key(KeyCode::Esc), &model).unwrap();
    update(&mut model, msg, Instant::now());
    assert!(model.import_prompt.is_none());
    assert!(model.import_request.is_none());
}

#[test]
fn test_prompt_swallows_editing_keys() {
    let mut model = create_test_model("body");
    update(&mut model, Message::OpenImportPrompt, Instant::now());
    let msg = App::handle_key(key(KeyCode::Char('x')), &model).unwrap();
    update(&mut model, msg, Instant::now());
    assert_eq!(model.document.text(), "body");
}

#[test]
fn test_any_key_closes_help() {
    let mut model = create_test_model("");
    update(&mut model, Message::ToggleHelp, Instant::now());
    assert!(model.help_visible);
    let msg = App::handle_key(key(KeyCode::Char('z')), &model);
    assert_eq!(msg, Some(Message::HideHelp));
}

#[test]
fn test_control_keys() {
    let model = create_test_model("");
    let cases = [
        (ctrl('q'), Message::Quit),
        (ctrl('c'), Message::Quit),
        (ctrl('s'), Message::Export),
        (ctrl('e'), Message::CycleLayout),
        (ctrl('a'), Message::SelectAll),
        (key(KeyCode::F(1)), Message::ToggleHelp),
    ];
    for (event, expected) in cases {
        assert_eq!(App::handle_key(event, &model), Some(expected));
    }
}

#[test]
fn test_alt_letters_map_to_markup() {
    let model = create_test_model("");
    for action in MarkupAction::ALL {
        let event = KeyEvent::new(KeyCode::Char(action.key()), KeyModifiers::ALT);
        assert_eq!(App::handle_key(event, &model), Some(Message::Markup(action)));
    }
    let unbound = KeyEvent::new(KeyCode::Char('z'), KeyModifiers::ALT);
    assert_eq!(App::handle_key(unbound, &model), None);
}

#[test]
fn test_editing_and_movement_keys() {
    let model = create_test_model("");
    let shift_left = KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT);
    let ctrl_right = KeyEvent::new(KeyCode::Right, KeyModifiers::CONTROL);
    let ctrl_end = KeyEvent::new(KeyCode::End, KeyModifiers::CONTROL);
    let shifted_char = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
    let cases = [
        (key(KeyCode::Char('x')), Message::InsertChar('x')),
        (shifted_char, Message::InsertChar('A')),
        (key(KeyCode::Enter), Message::InsertNewline),
        (key(KeyCode::Backspace), Message::DeleteBack),
        (key(KeyCode::Delete), Message::DeleteForward),
        (key(KeyCode::Tab), Message::InsertText("    ".into())),
        (key(KeyCode::Up), Message::MoveCursor(Direction::Up)),
        (key(KeyCode::Home), Message::MoveHome),
        (shift_left, Message::Select(Direction::Left)),
        (ctrl_right, Message::MoveWordRight),
        (ctrl_end, Message::MoveToEnd),
        (key(KeyCode::PageDown), Message::PreviewPageDown),
    ];
    for (event, expected) in cases {
        assert_eq!(App::handle_key(event, &model), Some(expected));
    }
}

#[test]
fn test_page_keys_ignored_without_preview() {
    let model = create_test_model("").with_layout(LayoutMode::EditorOnly);
    assert_eq!(App::handle_key(key(KeyCode::PageDown), &model), None);
}

#[test]
fn test_resize_is_debounced() {
    let model = create_test_model("");
    let mut debouncer = Debouncer::new(Duration::from_millis(100));
    let t0 = Instant::now();

    let msg = App::handle_event(&Event::Resize(120, 40), &model, t0, &mut debouncer);
    assert!(msg.is_none());
    let later = t0 + Duration::from_millis(20);
    App::handle_event(&Event::Resize(140, 50), &model, later, &mut debouncer);

    assert!(debouncer.take_ready(t0 + Duration::from_millis(100)).is_none());
    assert_eq!(
        debouncer.take_ready(t0 + Duration::from_millis(120)),
        Some((140, 50))
    );
}

#[test]
fn test_paste_event_inserts_text() {
    let model = create_test_model("");
    let mut debouncer = Debouncer::new(Duration::from_millis(100));
    let msg = App::handle_event(
        &Event::Paste("a\r\nb".to_string()),
        &model,
        Instant::now(),
        &mut debouncer,
    );
    assert_eq!(msg, Some(Message::InsertText("a\nb".to_string())));
}

#[test]
fn test_mouse_wheel_scrolls_preview_only_over_preview() {
    let model = create_test_model("");
    let wheel = |column| MouseEvent {
        kind: MouseEventKind::ScrollDown,
        column,
        row: 5,
        modifiers: KeyModifiers::NONE,
    };
    assert_eq!(
        App::handle_mouse(wheel(60), &model),
        Some(Message::PreviewScrollDown(3))
    );
    assert_eq!(App::handle_mouse(wheel(10), &model), None);
}

#[test]
fn test_resize_message_reflows_panes() {
    let mut model = create_test_model("");
    update(&mut model, Message::Resize(100, 30), Instant::now());
    assert_eq!(model.terminal_size, (100, 30));
    assert_eq!(model.preview_viewport.height(), 25);
    assert_eq!(model.editor_viewport.height(), 25);
}

#[test]
fn test_cycle_layout_wraps_around() {
    let mut model = create_test_model("");
    let now = Instant::now();
    assert_eq!(model.layout, LayoutMode::Split);
    update(&mut model, Message::CycleLayout, now);
    assert_eq!(model.layout, LayoutMode::EditorOnly);
    update(&mut model, Message::CycleLayout, now);
    assert_eq!(model.layout, LayoutMode::PreviewOnly);
    update(&mut model, Message::CycleLayout, now);
    assert_eq!(model.layout, LayoutMode::Split);
}

#[test]
fn test_toast_expires() {
    let mut model = create_test_model("");
    let now = Instant::now();
    model.show_toast_at(ToastLevel::Info, "hi", now);
    assert!(!model.expire_toast(now + Duration::from_secs(1)));
    assert!(model.active_toast().is_some());
    assert!(model.expire_toast(now + Duration::from_secs(4)));
    assert!(model.active_toast().is_none());
    assert!(model.toast_deadline().is_none());
}

#[test]
fn test_quit_sets_flag() {
    let mut model = create_test_model("");
    update(&mut model, Message::Quit, Instant::now());
    assert!(model.should_quit);
}

#[test]
fn test_flush_on_quit_persists_pending_edit() {
    let mut model = create_test_model("");
    let now = Instant::now();
    update(&mut model, Message::InsertChar('z'), now);
    update(&mut model, Message::Quit, now);
    assert!(matches!(model.document.flush_autosave(), Some(Ok(()))));
    assert_eq!(stored(&model).as_deref(), Some("z"));
}

#[test]
fn test_restores_stored_snapshot() {
    let store = MemoryStore::new().with_entry(KEY, "saved earlier");
    let model = Model::new(ControllerConfig::default(), Box::new(store), (80, 24));
    assert_eq!(model.document.text(), "saved earlier");
}
