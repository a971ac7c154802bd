//! Calendar items, their identity, and the temporal predicates used by queries
//! and reconciliation.
//!
//! Ranges are half-open: an item occupies `[start, end)`. A window test is an
//! overlap test against that span, so a point window `[t, t]` selects exactly
//! the items that [`CalendarItem::contains`] `t`.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MirrorError, Result};

/// Opaque, backend-assigned identity of a calendar item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One scheduled event as reported by a calendar backend.
///
/// Equality compares every field, including backend-specific `extra` fields.
/// Two items with the same [`ItemId`] but different fields are the same event
/// in a changed state; use [`CalendarItem::same_identity`] for identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarItem {
    pub item_id: ItemId,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Backend-specific fields the engine does not interpret.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl CalendarItem {
    pub fn new(
        item_id: impl Into<ItemId>,
        subject: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            subject: subject.into(),
            body: String::new(),
            start,
            end,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// True when both values denote the same logical event.
    pub fn same_identity(&self, other: &CalendarItem) -> bool {
        self.item_id == other.item_id
    }

    /// Generic field accessor.
    ///
    /// The well-known fields are exposed under their backend names (`ItemId`,
    /// `Subject`, `Body`, `Start`, `End`); anything else is looked up in the
    /// extension map. Datetimes are rendered as RFC 3339 strings.
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "ItemId" => Some(Value::String(self.item_id.to_string())),
            "Subject" => Some(Value::String(self.subject.clone())),
            "Body" => Some(Value::String(self.body.clone())),
            "Start" => Some(Value::String(self.start.to_rfc3339())),
            "End" => Some(Value::String(self.end.to_rfc3339())),
            other => self.extra.get(other).cloned(),
        }
    }

    /// `start <= instant < end`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Lower-bound half of the window test: the item is still live after `lower`.
    pub fn ends_after(&self, lower: DateTime<Utc>) -> bool {
        self.end > lower
    }

    /// Upper-bound half of the window test: the item has begun by `upper`.
    pub fn starts_on_or_before(&self, upper: DateTime<Utc>) -> bool {
        self.start <= upper
    }

    /// Two-sided window test, `lower <= item <= upper`.
    pub fn falls_within(&self, lower: DateTime<Utc>, upper: DateTime<Utc>) -> bool {
        self.ends_after(lower) && self.starts_on_or_before(upper)
    }
}

/// A declared time window for snapshots and range queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn includes(&self, item: &CalendarItem) -> bool {
        item.falls_within(self.start, self.end)
    }
}

/// Fields for a calendar event that does not exist on the backend yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub subject: String,
    #[serde(default)]
    pub body: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Parse an ISO 8601 datetime string into `DateTime<Utc>`.
///
/// Accepts RFC 3339 (with offset, e.g. "2026-03-01T10:00:00+01:00") and naive
/// "2026-03-01T10:00:00", which is interpreted as UTC.
///
/// # Errors
/// Returns `MirrorError::InvalidDateTime` if neither form matches.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| MirrorError::InvalidDateTime(format!("'{}': {}", s, e)))
}
