//! The calendar mirror: owner of the materialized collection.
//!
//! Reconciliation lives in [`crate::reconcile`] and the read side in
//! [`crate::query`]; this module holds the shared state, callback
//! registration, connection reports, and backend pass-through.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use crate::backend::CalendarBackend;
use crate::clock::{Clock, SystemClock};
use crate::config::MirrorConfig;
use crate::connection::{ConnectionMonitor, ConnectionState};
use crate::error::Result;
use crate::item::{CalendarItem, NewEvent, TimeWindow};
use crate::notifier::{ItemEvent, Notifier};
use crate::reconcile::ReconcileReport;

pub struct CalendarMirror {
    pub(crate) backend: Arc<dyn CalendarBackend>,
    pub(crate) clock: Arc<dyn Clock>,
    config: MirrorConfig,
    /// Insertion-ordered; at most one item per identity.
    pub(crate) items: Mutex<Vec<CalendarItem>>,
    connection: Mutex<ConnectionMonitor>,
    notifier: RwLock<Notifier>,
}

impl CalendarMirror {
    /// An empty mirror over `backend`, using the system clock and default config.
    pub fn new(backend: Arc<dyn CalendarBackend>) -> Self {
        Self {
            backend,
            clock: Arc::new(SystemClock),
            config: MirrorConfig::default(),
            items: Mutex::new(Vec::new()),
            connection: Mutex::new(ConnectionMonitor::new()),
            notifier: RwLock::new(Notifier::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: MirrorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // -- callback registration ------------------------------------------------

    pub fn on_connected<F>(&self, handler: F)
    where
        F: Fn(&CalendarMirror, ConnectionState) + Send + Sync + 'static,
    {
        self.notifier.write().connected = Some(Arc::new(handler));
    }

    pub fn on_disconnected<F>(&self, handler: F)
    where
        F: Fn(&CalendarMirror, ConnectionState) + Send + Sync + 'static,
    {
        self.notifier.write().disconnected = Some(Arc::new(handler));
    }

    pub fn on_new_item<F>(&self, handler: F)
    where
        F: Fn(&CalendarMirror, &CalendarItem) + Send + Sync + 'static,
    {
        self.notifier.write().new_item = Some(Arc::new(handler));
    }

    pub fn on_item_changed<F>(&self, handler: F)
    where
        F: Fn(&CalendarMirror, &CalendarItem) + Send + Sync + 'static,
    {
        self.notifier.write().item_changed = Some(Arc::new(handler));
    }

    pub fn on_item_deleted<F>(&self, handler: F)
    where
        F: Fn(&CalendarMirror, &CalendarItem) + Send + Sync + 'static,
    {
        self.notifier.write().item_deleted = Some(Arc::new(handler));
    }

    pub fn clear_connected(&self) {
        self.notifier.write().connected = None;
    }

    pub fn clear_disconnected(&self) {
        self.notifier.write().disconnected = None;
    }

    pub fn clear_new_item(&self) {
        self.notifier.write().new_item = None;
    }

    pub fn clear_item_changed(&self) {
        self.notifier.write().item_changed = None;
    }

    pub fn clear_item_deleted(&self) {
        self.notifier.write().item_deleted = None;
    }

    /// Deliver item events in order. The notifier is cloned first so handlers
    /// may re-register callbacks.
    pub(crate) fn dispatch(&self, events: &[ItemEvent]) {
        let notifier = self.notifier.read().clone();
        for event in events {
            notifier.fire_item(self, event);
        }
    }

    // -- connection -----------------------------------------------------------

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.lock().state()
    }

    /// Record a connectivity observation from the transport layer.
    ///
    /// Fires `on_connected` / `on_disconnected` only when the state actually
    /// changes. Returns whether it changed.
    pub fn report_state(&self, state: ConnectionState) -> bool {
        let changed = self.connection.lock().report(state);
        if changed {
            info!(%state, "connection state changed");
            let notifier = self.notifier.read().clone();
            notifier.fire_connection(self, state);
        }
        changed
    }

    // -- backend --------------------------------------------------------------

    /// Fetch a snapshot of `[window_start, window_end]` and reconcile it.
    ///
    /// A failed fetch reports `Disconnected` and returns the backend error
    /// untouched; a successful one reports `Connected`.
    pub fn sync(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<ReconcileReport> {
        let window = TimeWindow::new(window_start, window_end);
        let snapshot = match self.backend.fetch_snapshot(&window) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "snapshot fetch failed");
                self.report_state(ConnectionState::Disconnected);
                return Err(e);
            }
        };
        self.report_state(ConnectionState::Connected);
        Ok(self.reconcile(snapshot, window_start, window_end))
    }

    /// [`sync`](Self::sync) over the configured window around the clock's now.
    pub fn sync_default(&self) -> Result<ReconcileReport> {
        let window = self.config.window.around(self.now())?;
        self.sync(window.start, window.end)
    }

    /// Ask the backend to create an event. The mirror picks it up on a later sync.
    pub fn create_event(&self, event: &NewEvent) -> Result<CalendarItem> {
        self.backend.create_event(event)
    }

    pub fn change_event_time(
        &self,
        item: &CalendarItem,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
    ) -> Result<CalendarItem> {
        self.backend.change_event_time(item, new_start, new_end)
    }

    pub fn delete_event(&self, item: &CalendarItem) -> Result<()> {
        self.backend.delete_event(item)
    }
}

impl fmt::Debug for CalendarMirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarMirror")
            .field("items", &self.items.lock().len())
            .field("connection", &self.connection_state())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
