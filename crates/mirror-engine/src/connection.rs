//! Edge-triggered tracking of backend connectivity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Last known connectivity of the calendar backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Nothing has been reported yet.
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Unknown => "Unknown",
            ConnectionState::Connected => "Connected",
            ConnectionState::Disconnected => "Disconnected",
        };
        f.write_str(name)
    }
}

/// Stores the last reported state and detects transitions.
///
/// Repeated reports of the same state are not transitions.
#[derive(Debug, Default)]
pub struct ConnectionMonitor {
    state: ConnectionState,
}

impl ConnectionMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Record an observation. Returns `true` when the stored state changed.
    pub fn report(&mut self, state: ConnectionState) -> bool {
        if state == self.state {
            return false;
        }
        self.state = state;
        true
    }
}
