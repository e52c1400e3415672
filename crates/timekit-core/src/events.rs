use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Every state transition in the system produces an Event.
/// Consumers (the CLI drive loops, a GUI) render or forward them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        /// Countdown target, absent in count-up mode.
        total_ms: Option<u64>,
        at: DateTime<Utc>,
    },
    TimerResumed {
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    /// A countdown reached zero (the zero-crossing tick).
    TimerCompleted {
        total_ms: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    LapRecorded {
        id: u64,
        cumulative_ms: u64,
        split_ms: u64,
        at: DateTime<Utc>,
    },
    /// The sequencer advanced to the next phase after a zero-crossing.
    PhaseAdvanced {
        phase: Phase,
        session_count: u32,
        at: DateTime<Utc>,
    },
    /// The user switched phase manually; no counter increment, no auto-start.
    PhaseSelected {
        phase: Phase,
        at: DateTime<Utc>,
    },
}
