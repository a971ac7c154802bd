//! Recorded snapshots, as JSON.
//!
//! A replay file is a list of frames, each one snapshot for one window:
//!
//! ```json
//! {"frames": [
//!   {"window_start": "2026-03-01T09:00:00Z",
//!    "window_end": "2026-03-01T12:00:00Z",
//!    "items": [{"item_id": "1", "subject": "A",
//!               "start": "2026-03-01T10:00:00Z", "end": "2026-03-01T11:00:00Z"}]}
//! ]}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MirrorError, Result};
use crate::item::CalendarItem;
use crate::mirror::CalendarMirror;
use crate::reconcile::ReconcileReport;

/// One snapshot together with the window it claims to cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotFrame {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<CalendarItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replay {
    pub frames: Vec<SnapshotFrame>,
}

impl Replay {
    /// # Errors
    /// Returns `MirrorError::Snapshot` if the document is not a valid replay.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MirrorError::Snapshot(e.to_string()))
    }

    /// Reconcile every frame into `mirror`, in order.
    pub fn apply(&self, mirror: &CalendarMirror) -> Vec<ReconcileReport> {
        self.frames
            .iter()
            .map(|frame| mirror.reconcile(frame.items.clone(), frame.window_start, frame.window_end))
            .collect()
    }
}
