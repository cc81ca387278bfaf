//! Error types for the docking engine

use thiserror::Error;

/// Errors raised by fallible docking operations
///
/// Missing panes or containers are not errors: lookups return `Option` and
/// callers skip the entry.
#[derive(Debug, Error)]
pub enum DockError {
    #[error("layout version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("layout data is empty")]
    EmptyLayout,

    #[error("layout data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected layout structure: {0}")]
    Structural(String),

    #[error("a drag is already in progress")]
    Reentrant,
}

/// Result alias used throughout the crate
pub type DockResult<T> = Result<T, DockError>;
