//! Transcription store tests

use std::path::Path;
use voxscribe_bus::Segment;
use voxscribe_foundation::StorageError;
use voxscribe_storage::{RecordUpdate, TranscriptionStore};

fn segment(text: &str) -> Segment {
    Segment {
        id: 0,
        start: 0.0,
        end: 1.5,
        text: text.to_string(),
    }
}

#[test]
fn save_then_get_round_trips_all_fields() {
    let store = TranscriptionStore::open_in_memory().unwrap();
    let segments = vec![segment("hello"), segment("world")];

    let id = store
        .save("hello world", &segments, Some(Path::new("a.wav")))
        .unwrap();
    let record = store.get(id).unwrap().expect("record should exist");

    assert_eq!(record.id, id);
    assert_eq!(record.text, "hello world");
    assert_eq!(record.segments, segments);
    assert_eq!(record.audio_path.as_deref(), Some("a.wav"));
    assert!(!record.timestamp.is_empty());
}

#[test]
fn save_without_audio_reference() {
    let store = TranscriptionStore::open_in_memory().unwrap();
    let id = store.save("no audio", &[segment("no audio")], None).unwrap();
    let record = store.get(id).unwrap().unwrap();
    assert_eq!(record.audio_path, None);
}

#[test]
fn empty_text_is_rejected() {
    let store = TranscriptionStore::open_in_memory().unwrap();
    assert!(matches!(
        store.save("", &[], None),
        Err(StorageError::EmptyText)
    ));
    assert!(matches!(
        store.save("   ", &[], None),
        Err(StorageError::EmptyText)
    ));
}

#[test]
fn get_missing_id_is_absent() {
    let store = TranscriptionStore::open_in_memory().unwrap();
    assert_eq!(store.get(42).unwrap(), None);
}

#[test]
fn list_recent_orders_newest_first_and_honors_limit() {
    let store = TranscriptionStore::open_in_memory().unwrap();
    for text in ["first", "second", "third"] {
        store.save(text, &[segment(text)], None).unwrap();
    }

    let recent = store.list_recent(2).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].text, "third");
    assert_eq!(recent[1].text, "second");
}

#[test]
fn update_text_touches_only_text() {
    let store = TranscriptionStore::open_in_memory().unwrap();
    let segments = vec![segment("original")];
    let id = store
        .save("original", &segments, Some(Path::new("a.wav")))
        .unwrap();

    let changed = store.update(id, &RecordUpdate::new().text("edited")).unwrap();
    assert!(changed);

    let record = store.get(id).unwrap().unwrap();
    assert_eq!(record.text, "edited");
    assert_eq!(record.segments, segments);
    assert_eq!(record.audio_path.as_deref(), Some("a.wav"));
}

#[test]
fn update_can_clear_audio_path() {
    let store = TranscriptionStore::open_in_memory().unwrap();
    let id = store
        .save("text", &[segment("text")], Some(Path::new("a.wav")))
        .unwrap();

    assert!(store
        .update(id, &RecordUpdate::new().clear_audio_path())
        .unwrap());
    assert_eq!(store.get(id).unwrap().unwrap().audio_path, None);
}

#[test]
fn update_with_no_fields_returns_false() {
    let store = TranscriptionStore::open_in_memory().unwrap();
    let id = store.save("text", &[], None).unwrap();
    assert!(!store.update(id, &RecordUpdate::new()).unwrap());
}

#[test]
fn update_missing_id_returns_false() {
    let store = TranscriptionStore::open_in_memory().unwrap();
    assert!(!store.update(42, &RecordUpdate::new().text("x")).unwrap());
}

#[test]
fn delete_then_get_is_absent_and_second_delete_fails() {
    let store = TranscriptionStore::open_in_memory().unwrap();
    let id = store.save("going away", &[], None).unwrap();

    assert!(store.delete(id).unwrap());
    assert_eq!(store.get(id).unwrap(), None);
    assert!(!store.delete(id).unwrap());
}

#[test]
fn ids_are_never_reused_after_deletion() {
    let store = TranscriptionStore::open_in_memory().unwrap();
    let first = store.save("one", &[], None).unwrap();
    assert!(store.delete(first).unwrap());
    let second = store.save("two", &[], None).unwrap();
    assert!(second > first);
}

#[test]
fn delete_audio_removes_file_and_clears_references() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("a.wav");
    std::fs::write(&audio, b"fake wav").unwrap();

    let store = TranscriptionStore::open_in_memory().unwrap();
    let id = store.save("text", &[], Some(&audio)).unwrap();

    assert!(store.delete_audio(&audio).unwrap());
    assert!(!audio.exists());
    let record = store.get(id).unwrap().unwrap();
    assert_eq!(record.audio_path, None);
    assert_eq!(record.text, "text");
}

#[test]
fn delete_audio_missing_file_returns_false() {
    let store = TranscriptionStore::open_in_memory().unwrap();
    assert!(!store.delete_audio(Path::new("/nonexistent/a.wav")).unwrap());
}

#[test]
fn open_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("transcriptions.db");

    let id = {
        let store = TranscriptionStore::open(&db).unwrap();
        store.save("persisted", &[segment("persisted")], None).unwrap()
    };

    let store = TranscriptionStore::open(&db).unwrap();
    assert_eq!(store.get(id).unwrap().unwrap().text, "persisted");
}
