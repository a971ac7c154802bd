//! Tests for CalendarItem predicates, field access, identity, and datetime parsing.

use chrono::{DateTime, TimeZone, Utc};
use mirror_engine::{parse_datetime, CalendarItem, MirrorError, TimeWindow};
use serde_json::json;

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, hour, min, 0).unwrap()
}

#[test]
fn containment_is_half_open() {
    let item = CalendarItem::new("1", "A", at(10, 0), at(11, 0));

    assert!(item.contains(at(10, 0)));
    assert!(item.contains(at(10, 30)));
    assert!(!item.contains(at(11, 0)));
    assert!(!item.contains(at(9, 59)));
}

#[test]
fn zero_length_item_contains_nothing() {
    let item = CalendarItem::new("1", "A", at(10, 0), at(10, 0));

    assert!(!item.contains(at(10, 0)));
    assert!(!item.falls_within(at(10, 0), at(10, 0)));
}

#[test]
fn window_bounds_compose() {
    let item = CalendarItem::new("1", "A", at(10, 0), at(11, 0));

    assert!(item.ends_after(at(10, 59)));
    assert!(!item.ends_after(at(11, 0)));
    assert!(item.starts_on_or_before(at(10, 0)));
    assert!(!item.starts_on_or_before(at(9, 59)));

    assert!(item.falls_within(at(9, 0), at(10, 0)));
    assert!(item.falls_within(at(10, 59), at(12, 0)));
    assert!(!item.falls_within(at(11, 0), at(12, 0)));
    assert!(TimeWindow::new(at(8, 0), at(12, 0)).includes(&item));
}

#[test]
fn equality_is_not_identity() {
    let a = CalendarItem::new("1", "A", at(10, 0), at(11, 0));
    let b = CalendarItem::new("1", "B", at(10, 0), at(11, 0));

    assert!(a.same_identity(&b));
    assert_ne!(a, b);
    assert_eq!(a, a.clone());
}

#[test]
fn generic_field_access() {
    let item = CalendarItem::new("abc", "Standup", at(9, 0), at(9, 15))
        .with_body("daily")
        .with_field("Location", "Room 4")
        .with_field("Attendees", json!(["a@example.com"]));

    assert_eq!(item.field("ItemId"), Some(json!("abc")));
    assert_eq!(item.field("Subject"), Some(json!("Standup")));
    assert_eq!(item.field("Body"), Some(json!("daily")));
    assert_eq!(item.field("Start"), Some(json!("2026-03-01T09:00:00+00:00")));
    assert_eq!(item.field("Location"), Some(json!("Room 4")));
    assert_eq!(item.field("Attendees"), Some(json!(["a@example.com"])));
    assert_eq!(item.field("Nope"), None);
}

#[test]
fn item_json_shape() {
    let item: CalendarItem = serde_json::from_value(json!({
        "item_id": "1",
        "subject": "A",
        "start": "2026-03-01T10:00:00Z",
        "end": "2026-03-01T11:00:00Z",
        "extra": {"Location": "Room 1"}
    }))
    .unwrap();

    assert_eq!(item.item_id.as_str(), "1");
    assert_eq!(item.body, "");
    assert_eq!(item.start, at(10, 0));
    assert_eq!(item.field("Location"), Some(json!("Room 1")));

    let out = serde_json::to_value(CalendarItem::new("2", "B", at(10, 0), at(11, 0))).unwrap();
    assert!(out.get("extra").is_none(), "empty extra map is omitted");
}

#[test]
fn parse_rfc3339_and_naive() {
    assert_eq!(parse_datetime("2026-03-01T10:00:00Z").unwrap(), at(10, 0));
    assert_eq!(parse_datetime("2026-03-01T11:00:00+01:00").unwrap(), at(10, 0));
    assert_eq!(parse_datetime("2026-03-01T10:00:00").unwrap(), at(10, 0));
}

#[test]
fn parse_rejects_garbage() {
    let err = parse_datetime("tomorrow at ten").unwrap_err();
    assert!(matches!(err, MirrorError::InvalidDateTime(_)));
}
