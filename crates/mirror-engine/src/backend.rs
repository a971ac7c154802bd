//! The calendar backend collaborator.
//!
//! A backend is the protocol client for one calendar provider. The mirror asks
//! it for complete snapshots of a window and for the current value of single
//! items; it never interprets how the backend gets them.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::debug;

use crate::error::{MirrorError, Result};
use crate::item::{CalendarItem, ItemId, NewEvent, TimeWindow};

pub trait CalendarBackend: Send + Sync {
    /// Every item the provider knows of in `window`, in provider order.
    ///
    /// The mirror trusts this to be complete: an in-window item missing from
    /// the result is treated as deleted.
    fn fetch_snapshot(&self, window: &TimeWindow) -> Result<Vec<CalendarItem>>;

    /// Current canonical value of `item`.
    ///
    /// The default returns the value already held.
    fn refresh_item(&self, item: &CalendarItem) -> Result<CalendarItem> {
        Ok(item.clone())
    }

    fn create_event(&self, _event: &NewEvent) -> Result<CalendarItem> {
        Err(MirrorError::Unsupported("create_event"))
    }

    fn change_event_time(
        &self,
        _item: &CalendarItem,
        _new_start: DateTime<Utc>,
        _new_end: DateTime<Utc>,
    ) -> Result<CalendarItem> {
        Err(MirrorError::Unsupported("change_event_time"))
    }

    fn delete_event(&self, _item: &CalendarItem) -> Result<()> {
        Err(MirrorError::Unsupported("delete_event"))
    }
}

/// A backend with no remote side.
///
/// Refresh returns the held value unchanged and fetching is unsupported, so
/// the mirror is fed only through direct `reconcile` calls (e.g. replayed
/// snapshots).
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedBackend;

impl CalendarBackend for DetachedBackend {
    fn fetch_snapshot(&self, _window: &TimeWindow) -> Result<Vec<CalendarItem>> {
        Err(MirrorError::Unsupported("fetch_snapshot"))
    }
}

/// A backend that keeps its events in process memory.
///
/// Stands in for a real provider in tests and demos. Created items get
/// sequential ids `mem-1`, `mem-2`, ...
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    items: Vec<CalendarItem>,
    next_id: u64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<CalendarItem>) -> Self {
        Self {
            state: Mutex::new(MemoryState { items, next_id: 0 }),
        }
    }

    /// Replace the whole store, as if the provider changed behind our back.
    pub fn replace_all(&self, items: Vec<CalendarItem>) {
        self.state.lock().items = items;
    }

    /// Insert or overwrite one item by identity.
    pub fn upsert(&self, item: CalendarItem) {
        let mut state = self.state.lock();
        match state.items.iter_mut().find(|i| i.same_identity(&item)) {
            Some(existing) => *existing = item,
            None => state.items.push(item),
        }
    }

    pub fn items(&self) -> Vec<CalendarItem> {
        self.state.lock().items.clone()
    }

    fn find(&self, id: &ItemId) -> Result<CalendarItem> {
        self.state
            .lock()
            .items
            .iter()
            .find(|i| &i.item_id == id)
            .cloned()
            .ok_or_else(|| MirrorError::ItemNotFound(id.clone()))
    }
}

impl CalendarBackend for MemoryBackend {
    fn fetch_snapshot(&self, window: &TimeWindow) -> Result<Vec<CalendarItem>> {
        let items: Vec<CalendarItem> = self
            .state
            .lock()
            .items
            .iter()
            .filter(|item| window.includes(item))
            .cloned()
            .collect();
        debug!(count = items.len(), "memory backend snapshot");
        Ok(items)
    }

    fn refresh_item(&self, item: &CalendarItem) -> Result<CalendarItem> {
        self.find(&item.item_id)
    }

    fn create_event(&self, event: &NewEvent) -> Result<CalendarItem> {
        let mut state = self.state.lock();
        state.next_id += 1;
        let item = CalendarItem::new(
            format!("mem-{}", state.next_id),
            event.subject.clone(),
            event.start,
            event.end,
        )
        .with_body(event.body.clone());
        state.items.push(item.clone());
        Ok(item)
    }

    fn change_event_time(
        &self,
        item: &CalendarItem,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
    ) -> Result<CalendarItem> {
        let mut state = self.state.lock();
        let stored = state
            .items
            .iter_mut()
            .find(|i| i.same_identity(item))
            .ok_or_else(|| MirrorError::ItemNotFound(item.item_id.clone()))?;
        stored.start = new_start;
        stored.end = new_end;
        Ok(stored.clone())
    }

    fn delete_event(&self, item: &CalendarItem) -> Result<()> {
        let mut state = self.state.lock();
        let before = state.items.len();
        state.items.retain(|i| !i.same_identity(item));
        if state.items.len() == before {
            return Err(MirrorError::ItemNotFound(item.item_id.clone()));
        }
        Ok(())
    }
}
