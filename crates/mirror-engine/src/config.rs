//! Mirror configuration, loaded from TOML.
//!
//! ```toml
//! log_filter = "info"
//!
//! [window]
//! lookbehind_hours = 24
//! lookahead_hours = 168
//! ```

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MirrorError, Result};
use crate::item::TimeWindow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Window fetched by `CalendarMirror::sync_default`.
    pub window: WindowConfig,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            log_filter: "warn".to_string(),
            window: WindowConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub lookbehind_hours: i64,
    pub lookahead_hours: i64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            lookbehind_hours: 24,
            lookahead_hours: 24 * 7,
        }
    }
}

impl WindowConfig {
    /// The sync window centred on `now`.
    ///
    /// # Errors
    /// Returns `MirrorError::Config` if either bound falls outside the
    /// representable datetime range.
    pub fn around(&self, now: DateTime<Utc>) -> Result<TimeWindow> {
        let start = Duration::try_hours(self.lookbehind_hours)
            .and_then(|d| now.checked_sub_signed(d))
            .ok_or_else(|| out_of_range("lookbehind_hours", self.lookbehind_hours))?;
        let end = Duration::try_hours(self.lookahead_hours)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(|| out_of_range("lookahead_hours", self.lookahead_hours))?;
        Ok(TimeWindow::new(start, end))
    }
}

fn out_of_range(field: &str, value: i64) -> MirrorError {
    MirrorError::Config(format!("window.{} = {} is out of range", field, value))
}

impl MirrorConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    /// Returns `MirrorError::Config` for malformed TOML, or for window sizes
    /// that are negative or too large to express as a duration.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MirrorConfig =
            toml::from_str(content).map_err(|e| MirrorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| MirrorError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.window.lookbehind_hours < 0 || self.window.lookahead_hours < 0 {
            return Err(MirrorError::Config(
                "window hours must not be negative".to_string(),
            ));
        }
        if Duration::try_hours(self.window.lookbehind_hours).is_none() {
            return Err(out_of_range("lookbehind_hours", self.window.lookbehind_hours));
        }
        if Duration::try_hours(self.window.lookahead_hours).is_none() {
            return Err(out_of_range("lookahead_hours", self.window.lookahead_hours));
        }
        Ok(())
    }
}
