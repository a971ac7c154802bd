//! Snapshot reconciliation.
//!
//! A snapshot is the backend's complete list of items for a declared window.
//! Reconciling it brings the materialized collection in line with the backend:
//!
//! 1. Every snapshot item, in snapshot order, is added if its identity is new
//!    or replaces the held value if any field differs.
//! 2. Every held item that falls within the window and is absent from the
//!    snapshot is removed, in collection order.
//!
//! Items outside the window are never deleted, whatever the snapshot says.
//! Add/change notifications are always delivered before deletions.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::item::{CalendarItem, ItemId};
use crate::mirror::CalendarMirror;
use crate::notifier::ItemEvent;

/// Counts of what one reconcile call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub added: usize,
    pub changed: usize,
    pub deleted: usize,
    pub unchanged: usize,
}

impl ReconcileReport {
    /// True when no notification was fired.
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.changed == 0 && self.deleted == 0
    }
}

impl CalendarMirror {
    /// Apply a snapshot covering `[window_start, window_end]`.
    ///
    /// The caller guarantees the snapshot is complete for the window. Neither
    /// the window nor the items are validated. Callbacks run on this thread
    /// after the collection has been fully updated, so handlers observe the
    /// post-reconcile view.
    pub fn reconcile(
        &self,
        snapshot: Vec<CalendarItem>,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let mut events = Vec::new();

        {
            let mut items = self.items.lock();

            for incoming in &snapshot {
                match items.iter().position(|held| held.same_identity(incoming)) {
                    None => {
                        items.push(incoming.clone());
                        report.added += 1;
                        events.push(ItemEvent::Created(incoming.clone()));
                    }
                    Some(pos) if items[pos] != *incoming => {
                        items.remove(pos);
                        items.push(incoming.clone());
                        report.changed += 1;
                        events.push(ItemEvent::Changed(incoming.clone()));
                    }
                    Some(_) => report.unchanged += 1,
                }
            }

            // After the first pass every held identity present in the snapshot
            // holds that snapshot value, so identity membership equals value
            // membership here.
            let in_snapshot: HashSet<&ItemId> = snapshot.iter().map(|i| &i.item_id).collect();
            let held: Vec<CalendarItem> = items.clone();
            for existing in held {
                if !existing.falls_within(window_start, window_end)
                    || in_snapshot.contains(&existing.item_id)
                {
                    continue;
                }
                if let Some(pos) = items.iter().position(|i| i.same_identity(&existing)) {
                    items.remove(pos);
                }
                report.deleted += 1;
                events.push(ItemEvent::Deleted(existing));
            }
        }

        for event in &events {
            debug!(
                kind = event.kind(),
                item_id = %event.item().item_id,
                subject = %event.item().subject,
                "calendar item event"
            );
        }
        info!(
            added = report.added,
            changed = report.changed,
            deleted = report.deleted,
            unchanged = report.unchanged,
            %window_start,
            %window_end,
            "reconciled snapshot"
        );

        self.dispatch(&events);
        report
    }
}
