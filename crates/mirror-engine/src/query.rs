//! Read-side queries over the materialized collection.
//!
//! Each query copies the collection under its lock, selects items from the
//! copy, releases the lock, and only then refreshes the selected items from
//! the backend. A slow refresh therefore never blocks reconciliation. The
//! first refresh failure is returned as-is; refreshed values are not written
//! back into the collection.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::Result;
use crate::item::{CalendarItem, ItemId};
use crate::mirror::CalendarMirror;

impl CalendarMirror {
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// The item with identity `item_id`, if held.
    pub fn item_by_id(&self, item_id: &ItemId) -> Result<Option<CalendarItem>> {
        let found = self
            .copy_items()
            .into_iter()
            .find(|item| &item.item_id == item_id);
        found.map(|item| self.refresh(&item)).transpose()
    }

    /// Items whose subject equals `exact`, or otherwise contains `partial`.
    ///
    /// The exact test wins, so an item matching both is returned once.
    /// Either argument may be omitted; with both omitted nothing matches.
    /// An empty `partial` matches nothing.
    pub fn items_by_subject(
        &self,
        exact: Option<&str>,
        partial: Option<&str>,
    ) -> Result<Vec<CalendarItem>> {
        self.select(|item| {
            exact.is_some_and(|s| item.subject == s)
                || partial.is_some_and(|s| !s.is_empty() && item.subject.contains(s))
        })
    }

    pub fn all_items(&self) -> Result<Vec<CalendarItem>> {
        self.select(|_| true)
    }

    /// Items in progress at `instant` (`start <= instant < end`).
    pub fn items_at(&self, instant: DateTime<Utc>) -> Result<Vec<CalendarItem>> {
        self.select(|item| item.contains(instant))
    }

    /// Items overlapping `[start, end]`.
    pub fn items_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarItem>> {
        self.select(|item| item.falls_within(start, end))
    }

    /// Items in progress right now, according to the mirror's clock.
    pub fn items_at_now(&self) -> Result<Vec<CalendarItem>> {
        self.items_at(self.now())
    }

    /// The soonest upcoming item(s).
    ///
    /// Finds the earliest start strictly after now and returns every item
    /// starting at that instant. Items already in progress are not included.
    pub fn next_items(&self) -> Result<Vec<CalendarItem>> {
        let now = self.now();
        let items = self.copy_items();

        let Some(next_start) = items
            .iter()
            .map(|item| item.start)
            .filter(|start| *start > now)
            .min()
        else {
            return Ok(Vec::new());
        };

        items
            .iter()
            .filter(|item| item.start == next_start)
            .map(|item| self.refresh(item))
            .collect()
    }

    fn copy_items(&self) -> Vec<CalendarItem> {
        self.items.lock().clone()
    }

    fn select<F>(&self, predicate: F) -> Result<Vec<CalendarItem>>
    where
        F: Fn(&CalendarItem) -> bool,
    {
        let selected: Vec<CalendarItem> = self
            .copy_items()
            .into_iter()
            .filter(|item| predicate(item))
            .collect();
        selected.iter().map(|item| self.refresh(item)).collect()
    }

    fn refresh(&self, item: &CalendarItem) -> Result<CalendarItem> {
        debug!(item_id = %item.item_id, "refreshing item from backend");
        self.backend.refresh_item(item)
    }
}
