//! Monotonic time sources.
//!
//! The timer engine samples time through the [`Clock`] trait so that the
//! drift and pause/resume properties can be tested against a manually
//! advanced clock. Production code uses [`MonotonicClock`]; tests use
//! [`ManualClock`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

/// The host's time source could not be read. Fatal; there is no retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("monotonic time source unavailable: {0}")]
    Unavailable(String),
}

/// A monotonic millisecond counter.
///
/// Samples are only compared against each other, never against wall-clock
/// epochs, so the zero point is arbitrary.
pub trait Clock {
    fn now_ms(&self) -> Result<u64, ClockError>;
}

/// Production clock anchored to a [`std::time::Instant`] taken at
/// construction.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> Result<u64, ClockError> {
        Ok(self.origin.elapsed().as_millis() as u64)
    }
}

/// Manually advanced clock for deterministic tests.
///
/// Clones share the same underlying counter, so a test can hold a handle
/// while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
    unavailable: Arc<AtomicBool>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Arc::new(AtomicU64::new(start_ms)),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Move time forward by `delta_ms`.
    pub fn advance(&self, delta_ms: u64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }

    pub fn set(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    /// Make every subsequent sample fail, for exercising the fatal
    /// [`ClockError::Unavailable`] path.
    pub fn make_unavailable(&self) {
        self.unavailable.store(true, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Result<u64, ClockError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ClockError::Unavailable(
                "manual clock marked unavailable".into(),
            ));
        }
        Ok(self.now_ms.load(Ordering::SeqCst))
    }
}
