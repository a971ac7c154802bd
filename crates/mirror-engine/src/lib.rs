//! # mirror-engine
//!
//! Local, in-memory mirror of a remote calendar.
//!
//! A backend (Exchange or similar) hands the mirror complete snapshots of a
//! time window. The mirror reconciles each snapshot against what it already
//! holds, fires created/changed/deleted callbacks, and answers time-based
//! queries ("what is on now", "what is next") over the result.
//!
//! ## Modules
//!
//! - [`item`] — `CalendarItem`, identity, and the half-open temporal predicates
//! - [`reconcile`] — snapshot reconciliation within a declared window
//! - [`query`] — lookups by id, subject, instant, range, now and next
//! - [`connection`] — edge-triggered connection state
//! - [`notifier`] — callback slots
//! - [`backend`] — the `CalendarBackend` collaborator and an in-memory backend
//! - [`mirror`] — `CalendarMirror`, which owns all of the above
//! - [`snapshot`] — recorded snapshot frames (JSON replay files)
//! - [`clock`] — injectable wall clock
//! - [`config`] — TOML configuration
//! - [`error`] — Error types

pub mod backend;
pub mod clock;
pub mod config;
pub mod connection;
pub mod error;
pub mod item;
pub mod mirror;
pub mod notifier;
pub mod query;
pub mod reconcile;
pub mod snapshot;

pub use backend::{CalendarBackend, DetachedBackend, MemoryBackend};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{MirrorConfig, WindowConfig};
pub use connection::ConnectionState;
pub use error::MirrorError;
pub use item::{parse_datetime, CalendarItem, ItemId, NewEvent, TimeWindow};
pub use mirror::CalendarMirror;
pub use notifier::ItemEvent;
pub use reconcile::ReconcileReport;
pub use snapshot::{Replay, SnapshotFrame};
