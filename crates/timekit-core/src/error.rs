//! Core error types for timekit-core.

use thiserror::Error;

use crate::clock::ClockError;

/// Core error type for timekit-core.
///
/// Logical no-ops (starting an already-running timer, recording a lap while
/// paused) are not errors; operations return `Ok(None)` for those.
#[derive(Error, Debug)]
pub enum TimerError {
    /// The monotonic time source could not be read. Fatal; surfaced to the
    /// caller immediately, never retried.
    #[error("clock unavailable: {0}")]
    ClockUnavailable(#[from] ClockError),

    /// A caller-supplied phase identifier was not recognized. Recoverable;
    /// sequencer state is left unchanged.
    #[error("unknown phase '{id}' (expected one of: work, short-break, long-break)")]
    InvalidPhase { id: String },
}

/// Result type alias for TimerError
pub type Result<T, E = TimerError> = std::result::Result<T, E>;
