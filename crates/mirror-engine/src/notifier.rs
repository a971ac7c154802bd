//! Callback slots fired by reconciliation and connection reports.
//!
//! Each slot is either empty or holds one handler. Firing an empty slot does
//! nothing. Handlers run synchronously on the thread that triggered the event.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::connection::ConnectionState;
use crate::item::CalendarItem;
use crate::mirror::CalendarMirror;

/// Handler for item notifications: `(mirror, item)`.
pub type ItemHandler = Arc<dyn Fn(&CalendarMirror, &CalendarItem) + Send + Sync>;

/// Handler for connection notifications: `(mirror, new_state)`.
pub type ConnectionHandler = Arc<dyn Fn(&CalendarMirror, ConnectionState) + Send + Sync>;

/// A change detected by reconciliation, in the order it is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "item", rename_all = "lowercase")]
pub enum ItemEvent {
    Created(CalendarItem),
    Changed(CalendarItem),
    Deleted(CalendarItem),
}

impl ItemEvent {
    pub fn item(&self) -> &CalendarItem {
        match self {
            ItemEvent::Created(item) | ItemEvent::Changed(item) | ItemEvent::Deleted(item) => item,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ItemEvent::Created(_) => "created",
            ItemEvent::Changed(_) => "changed",
            ItemEvent::Deleted(_) => "deleted",
        }
    }
}

#[derive(Clone, Default)]
pub(crate) struct Notifier {
    pub(crate) connected: Option<ConnectionHandler>,
    pub(crate) disconnected: Option<ConnectionHandler>,
    pub(crate) new_item: Option<ItemHandler>,
    pub(crate) item_changed: Option<ItemHandler>,
    pub(crate) item_deleted: Option<ItemHandler>,
}

impl Notifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fire_item(&self, mirror: &CalendarMirror, event: &ItemEvent) {
        let slot = match event {
            ItemEvent::Created(_) => &self.new_item,
            ItemEvent::Changed(_) => &self.item_changed,
            ItemEvent::Deleted(_) => &self.item_deleted,
        };
        if let Some(handler) = slot {
            handler(mirror, event.item());
        }
    }

    pub(crate) fn fire_connection(&self, mirror: &CalendarMirror, state: ConnectionState) {
        let slot = match state {
            ConnectionState::Connected => &self.connected,
            ConnectionState::Disconnected => &self.disconnected,
            ConnectionState::Unknown => return,
        };
        if let Some(handler) = slot {
            handler(mirror, state);
        }
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("connected", &self.connected.is_some())
            .field("disconnected", &self.disconnected.is_some())
            .field("new_item", &self.new_item.is_some())
            .field("item_changed", &self.item_changed.is_some())
            .field("item_deleted", &self.item_deleted.is_some())
            .finish()
    }
}
