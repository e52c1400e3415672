//! Lap bookkeeping for a count-up timer.
//!
//! Laps are stored most-recent-first for display, but ids increase in
//! creation order and splits are computed against the previous lap by id --
//! never by display position.

use serde::{Deserialize, Serialize};

use super::engine::{TimerEngine, TimerState};
use crate::clock::Clock;
use crate::error::Result;
use crate::events::Event;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapRecord {
    /// Monotone creation-order sequence number, starting at 1.
    pub id: u64,
    /// Total elapsed time when the lap was captured.
    pub cumulative_ms: u64,
    /// Delta since the previous lap (the full elapsed for the first lap).
    pub split_ms: u64,
    pub label: String,
}

pub struct LapRecorder {
    laps: Vec<LapRecord>,
    next_id: u64,
    last_cumulative_ms: u64,
}

impl LapRecorder {
    pub fn new() -> Self {
        Self {
            laps: Vec::new(),
            next_id: 1,
            last_cumulative_ms: 0,
        }
    }

    /// Capture a lap at the timer's current elapsed time.
    ///
    /// Valid only while the timer is Running; a defined no-op otherwise,
    /// including while Paused.
    pub fn record_lap<C: Clock>(&mut self, timer: &TimerEngine<C>) -> Result<Option<Event>> {
        if timer.state() != TimerState::Running {
            return Ok(None);
        }
        let cumulative_ms = timer.elapsed_ms()?;
        let split_ms = cumulative_ms.saturating_sub(self.last_cumulative_ms);
        let id = self.next_id;
        self.next_id += 1;
        self.last_cumulative_ms = cumulative_ms;
        self.laps.insert(
            0,
            LapRecord {
                id,
                cumulative_ms,
                split_ms,
                label: format!("Lap {id}"),
            },
        );
        Ok(Some(Event::LapRecorded {
            id,
            cumulative_ms,
            split_ms,
            at: chrono::Utc::now(),
        }))
    }

    /// Laps in display order (most recent first).
    pub fn laps(&self) -> &[LapRecord] {
        &self.laps
    }

    /// Laps in creation order (ascending id).
    pub fn laps_in_creation_order(&self) -> impl Iterator<Item = &LapRecord> {
        self.laps.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.laps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }

    /// Cumulative elapsed at the most recent lap; the base for the next
    /// split.
    pub fn last_cumulative_ms(&self) -> u64 {
        self.last_cumulative_ms
    }

    /// Clear all laps and restart the id sequence. Invoked only together
    /// with a full timer reset, never independently.
    pub fn reset_laps(&mut self) {
        self.laps.clear();
        self.next_id = 1;
        self.last_cumulative_ms = 0;
    }
}

impl Default for LapRecorder {
    fn default() -> Self {
        Self::new()
    }
}
