//! Event bus tests
//!
//! Covers publish/subscribe ordering, unsubscribe semantics, panic
//! isolation between subscribers, and the named queue registry.

use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use voxscribe_bus::{
    AppEvent, EventBus, EventKind, TranscriptionJob, TranscriptionResult, RESULT_QUEUE,
    TRANSCRIPTION_QUEUE,
};
use voxscribe_foundation::BusError;

fn recording_started(path: &str) -> AppEvent {
    AppEvent::RecordingStarted(PathBuf::from(path))
}

#[test]
fn publish_reaches_subscriber_with_payload() {
    let bus = EventBus::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = seen.clone();
    bus.subscribe(EventKind::RecordingStarted, move |event| {
        if let AppEvent::RecordingStarted(path) = event {
            sink.lock().push(path.clone());
        }
    });

    bus.publish(recording_started("a.wav"));
    bus.publish(recording_started("b.wav"));

    let seen = seen.lock();
    assert_eq!(*seen, vec![PathBuf::from("a.wav"), PathBuf::from("b.wav")]);
}

#[test]
fn handlers_run_in_registration_order() {
    let bus = EventBus::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    for label in ["first", "second", "third"] {
        let sink = order.clone();
        bus.subscribe(EventKind::RecordingStopped, move |_| {
            sink.lock().push(label);
        });
    }

    bus.publish(AppEvent::RecordingStopped(PathBuf::from("a.wav")));
    assert_eq!(*order.lock(), vec!["first", "second", "third"]);
}

#[test]
fn unsubscribed_handler_is_never_invoked_again() {
    let bus = EventBus::new();
    let count = Arc::new(Mutex::new(0u32));

    let sink = count.clone();
    let id = bus.subscribe(EventKind::RecordingStarted, move |_| {
        *sink.lock() += 1;
    });

    bus.publish(recording_started("a.wav"));
    assert!(bus.unsubscribe(EventKind::RecordingStarted, id));
    bus.publish(recording_started("b.wav"));

    assert_eq!(*count.lock(), 1);
}

#[test]
fn unsubscribe_twice_returns_false() {
    let bus = EventBus::new();
    let id = bus.subscribe(EventKind::Error, |_| {});
    assert!(bus.unsubscribe(EventKind::Error, id));
    assert!(!bus.unsubscribe(EventKind::Error, id));
}

#[test]
fn unsubscribe_unknown_kind_is_noop() {
    let bus = EventBus::new();
    let id = bus.subscribe(EventKind::Error, |_| {});
    assert!(!bus.unsubscribe(EventKind::ConfigChanged, id));
}

#[test]
fn panicking_subscriber_does_not_stop_others() {
    let bus = EventBus::new();
    let survivors = Arc::new(Mutex::new(0u32));

    bus.subscribe(EventKind::RecordingStarted, |_| {
        panic!("bad handler");
    });
    let sink = survivors.clone();
    bus.subscribe(EventKind::RecordingStarted, move |_| {
        *sink.lock() += 1;
    });

    // The panic must not propagate to the publisher, and must not prevent
    // the second handler from running on this or subsequent publishes.
    bus.publish(recording_started("a.wav"));
    bus.publish(recording_started("b.wav"));

    assert_eq!(*survivors.lock(), 2);
}

#[test]
fn panicking_subscriber_does_not_affect_other_kinds() {
    let bus = EventBus::new();
    let seen = Arc::new(Mutex::new(0u32));

    bus.subscribe(EventKind::RecordingStarted, |_| {
        panic!("bad handler");
    });
    let sink = seen.clone();
    bus.subscribe(EventKind::RecordingStopped, move |_| {
        *sink.lock() += 1;
    });

    bus.publish(recording_started("a.wav"));
    bus.publish(AppEvent::RecordingStopped(PathBuf::from("a.wav")));

    assert_eq!(*seen.lock(), 1);
}

#[test]
fn publish_without_subscribers_is_noop() {
    let bus = EventBus::new();
    bus.publish(AppEvent::Error {
        message: "nobody listening".into(),
        critical: false,
    });
}

#[test]
fn create_queue_is_idempotent() {
    let bus = EventBus::new();
    let first = bus
        .create_queue::<TranscriptionJob>(TRANSCRIPTION_QUEUE)
        .unwrap();
    let second = bus
        .create_queue::<TranscriptionJob>(TRANSCRIPTION_QUEUE)
        .unwrap();

    first.push(TranscriptionJob::new("a.wav")).unwrap();
    assert_eq!(
        second.pop(Duration::from_millis(100)),
        Some(TranscriptionJob::new("a.wav"))
    );
}

#[test]
fn get_queue_returns_the_shared_channel() {
    let bus = EventBus::new();
    bus.create_queue::<TranscriptionJob>(TRANSCRIPTION_QUEUE)
        .unwrap();
    let producer = bus
        .get_queue::<TranscriptionJob>(TRANSCRIPTION_QUEUE)
        .unwrap();
    let consumer = bus
        .get_queue::<TranscriptionJob>(TRANSCRIPTION_QUEUE)
        .unwrap();

    producer.push(TranscriptionJob::new("b.wav")).unwrap();
    assert_eq!(
        consumer.pop(Duration::from_millis(100)),
        Some(TranscriptionJob::new("b.wav"))
    );
}

#[test]
fn get_queue_unknown_name_fails() {
    let bus = EventBus::new();
    match bus.get_queue::<TranscriptionJob>("missing") {
        Err(BusError::QueueNotFound { name }) => assert_eq!(name, "missing"),
        Err(other) => panic!("expected QueueNotFound, got {other:?}"),
        Ok(_) => panic!("expected QueueNotFound, got a queue"),
    }
}

#[test]
fn queue_type_mismatch_is_rejected() {
    let bus = EventBus::new();
    bus.create_queue::<TranscriptionJob>(RESULT_QUEUE).unwrap();

    assert!(matches!(
        bus.get_queue::<TranscriptionResult>(RESULT_QUEUE),
        Err(BusError::QueueTypeMismatch { .. })
    ));
    assert!(matches!(
        bus.create_queue::<TranscriptionResult>(RESULT_QUEUE),
        Err(BusError::QueueTypeMismatch { .. })
    ));
}
