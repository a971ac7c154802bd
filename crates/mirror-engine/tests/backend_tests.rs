//! Tests for backend-driven sync, mutation pass-through, and replay files.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use mirror_engine::{
    CalendarBackend, CalendarItem, CalendarMirror, ConnectionState, DetachedBackend, FixedClock,
    ItemId, MemoryBackend, MirrorConfig, MirrorError, NewEvent, Replay, TimeWindow, WindowConfig,
};

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, hour, min, 0).unwrap()
}

fn item(id: &str, subject: &str, start_hour: u32, end_hour: u32) -> CalendarItem {
    CalendarItem::new(id, subject, at(start_hour, 0), at(end_hour, 0))
}

/// Backend whose every fetch fails.
struct OfflineBackend;

impl CalendarBackend for OfflineBackend {
    fn fetch_snapshot(&self, _window: &TimeWindow) -> mirror_engine::error::Result<Vec<CalendarItem>> {
        Err(MirrorError::Backend("connection refused".to_string()))
    }
}

#[test]
fn sync_pulls_window_from_backend() {
    let backend = Arc::new(MemoryBackend::with_items(vec![
        item("1", "In window", 10, 11),
        item("2", "Outside", 20, 21),
    ]));
    let mirror = CalendarMirror::new(backend);

    let report = mirror.sync(at(9, 0), at(12, 0)).unwrap();

    assert_eq!(report.added, 1);
    assert_eq!(mirror.len(), 1);
    assert!(mirror.item_by_id(&ItemId::new("1")).unwrap().is_some());
    assert_eq!(mirror.connection_state(), ConnectionState::Connected);
}

#[test]
fn sync_detects_backend_side_changes() {
    let backend = Arc::new(MemoryBackend::with_items(vec![
        item("1", "A", 10, 11),
        item("2", "B", 11, 12),
    ]));
    let mirror = CalendarMirror::new(backend.clone());
    mirror.sync(at(9, 0), at(12, 0)).unwrap();

    backend.replace_all(vec![item("1", "A renamed", 10, 11)]);
    let report = mirror.sync(at(9, 0), at(12, 0)).unwrap();

    assert_eq!(report.changed, 1);
    assert_eq!(report.deleted, 1);
    assert_eq!(mirror.len(), 1);
}

#[test]
fn failed_sync_reports_disconnected_and_returns_error() {
    let mirror = CalendarMirror::new(Arc::new(OfflineBackend));
    let log = Arc::new(Mutex::new(Vec::new()));
    let l = log.clone();
    mirror.on_disconnected(move |_, state| l.lock().unwrap().push(state));

    let err = mirror.sync(at(9, 0), at(12, 0)).unwrap_err();
    assert!(matches!(err, MirrorError::Backend(ref msg) if msg == "connection refused"));

    // A second failure is not a new transition.
    let _ = mirror.sync(at(9, 0), at(12, 0));

    assert_eq!(*log.lock().unwrap(), vec![ConnectionState::Disconnected]);
    assert!(mirror.is_empty());
}

#[test]
fn sync_default_uses_configured_window() {
    let backend = Arc::new(MemoryBackend::with_items(vec![
        item("near", "N", 13, 14),
        item("far", "F", 22, 23),
    ]));
    let config = MirrorConfig {
        window: WindowConfig {
            lookbehind_hours: 1,
            lookahead_hours: 3,
        },
        ..MirrorConfig::default()
    };
    let mirror = CalendarMirror::new(backend)
        .with_config(config)
        .with_clock(Arc::new(FixedClock::new(at(12, 0))));

    mirror.sync_default().unwrap();

    let held: Vec<String> = mirror
        .all_items()
        .unwrap()
        .into_iter()
        .map(|i| i.item_id.to_string())
        .collect();
    assert_eq!(held, vec!["near"]);
}

#[test]
fn sync_default_with_unrepresentable_window_is_a_config_error() {
    let backend = Arc::new(MemoryBackend::with_items(vec![item("a", "A", 9, 10)]));
    let config = MirrorConfig {
        window: WindowConfig {
            lookbehind_hours: 1,
            lookahead_hours: 2_000_000_000_000,
        },
        ..MirrorConfig::default()
    };
    let mirror = CalendarMirror::new(backend)
        .with_config(config)
        .with_clock(Arc::new(FixedClock::new(at(12, 0))));

    assert!(matches!(mirror.sync_default(), Err(MirrorError::Config(_))));
    assert!(mirror.is_empty());
    assert_eq!(mirror.connection_state(), ConnectionState::Unknown);
}

#[test]
fn detached_backend_rejects_sync_and_mutations() {
    let mirror = CalendarMirror::new(Arc::new(DetachedBackend));

    assert!(matches!(
        mirror.sync(at(9, 0), at(12, 0)),
        Err(MirrorError::Unsupported("fetch_snapshot"))
    ));
    assert!(matches!(
        mirror.create_event(&NewEvent {
            subject: "x".to_string(),
            body: String::new(),
            start: at(9, 0),
            end: at(10, 0),
        }),
        Err(MirrorError::Unsupported("create_event"))
    ));
    let held = item("1", "A", 9, 10);
    assert!(matches!(
        mirror.change_event_time(&held, at(10, 0), at(11, 0)),
        Err(MirrorError::Unsupported("change_event_time"))
    ));
    assert!(matches!(
        mirror.delete_event(&held),
        Err(MirrorError::Unsupported("delete_event"))
    ));
}

#[test]
fn mutations_do_not_touch_the_mirror_until_next_sync() {
    let backend = Arc::new(MemoryBackend::new());
    let mirror = CalendarMirror::new(backend.clone());

    let created = mirror
        .create_event(&NewEvent {
            subject: "Planning".to_string(),
            body: "agenda".to_string(),
            start: at(10, 0),
            end: at(11, 0),
        })
        .unwrap();
    assert_eq!(created.item_id.as_str(), "mem-1");
    assert!(mirror.is_empty());

    let report = mirror.sync(at(9, 0), at(12, 0)).unwrap();
    assert_eq!(report.added, 1);

    mirror.change_event_time(&created, at(10, 30), at(11, 30)).unwrap();
    let report = mirror.sync(at(9, 0), at(12, 0)).unwrap();
    assert_eq!(report.changed, 1);
    let moved = mirror.item_by_id(&created.item_id).unwrap().unwrap();
    assert_eq!(moved.start, at(10, 30));

    mirror.delete_event(&moved).unwrap();
    let report = mirror.sync(at(9, 0), at(12, 0)).unwrap();
    assert_eq!(report.deleted, 1);
    assert!(mirror.is_empty());
}

#[test]
fn memory_backend_delete_of_unknown_item_fails() {
    let backend = MemoryBackend::new();
    let err = backend.delete_event(&item("nope", "", 9, 10)).unwrap_err();
    assert!(matches!(err, MirrorError::ItemNotFound(_)));
}

#[test]
fn memory_backend_upsert_replaces_by_identity() {
    let backend = MemoryBackend::new();
    backend.upsert(item("1", "A", 9, 10));
    backend.upsert(item("1", "B", 9, 10));
    backend.upsert(item("2", "C", 9, 10));

    let subjects: Vec<String> = backend.items().into_iter().map(|i| i.subject).collect();
    assert_eq!(subjects, vec!["B", "C"]);
}

#[test]
fn replay_applies_frames_in_order() {
    let json = r#"{
        "frames": [
            {"window_start": "2026-03-01T09:00:00Z", "window_end": "2026-03-01T12:00:00Z",
             "items": [{"item_id": "1", "subject": "A",
                        "start": "2026-03-01T10:00:00Z", "end": "2026-03-01T11:00:00Z"}]},
            {"window_start": "2026-03-01T09:00:00Z", "window_end": "2026-03-01T12:00:00Z",
             "items": []}
        ]
    }"#;
    let replay = Replay::from_json(json).unwrap();
    let mirror = CalendarMirror::new(Arc::new(DetachedBackend));

    let reports = replay.apply(&mirror);

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].added, 1);
    assert_eq!(reports[1].deleted, 1);
    assert!(mirror.is_empty());
}

#[test]
fn replay_rejects_malformed_json() {
    let err = Replay::from_json(r#"{"frames": [{"window_start": "yesterday"}]}"#).unwrap_err();
    assert!(matches!(err, MirrorError::Snapshot(_)));
}
