//! Error types for mirror-engine operations.

use thiserror::Error;

use crate::item::ItemId;

#[derive(Error, Debug)]
pub enum MirrorError {
    /// Failure reported by the calendar backend (fetch, refresh or mutation).
    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend does not implement this request.
    #[error("Operation not supported by this backend: {0}")]
    Unsupported(&'static str),

    #[error("Calendar item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Invalid datetime: {0}")]
    InvalidDateTime(String),

    #[error("Invalid snapshot: {0}")]
    Snapshot(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MirrorError>;
