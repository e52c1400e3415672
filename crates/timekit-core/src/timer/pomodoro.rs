//! Pomodoro phase sequencing on top of the countdown engine.
//!
//! On the zero-crossing tick the sequencer increments the session counter
//! (only when leaving Work), selects the next phase from the transition
//! table, re-arms the engine with that phase's duration, and starts it --
//! one explicit action list, not a reactive side effect.
//!
//! ## Transition table
//!
//! ```text
//! Work       -> ShortBreak   (session count % 4 != 0 after increment)
//! Work       -> LongBreak    (session count % 4 == 0 after increment)
//! ShortBreak -> Work
//! LongBreak  -> Work
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::engine::{TimerEngine, TimerSnapshot, TimerState};
use super::ticker::{SubscriberFn, SubscriberId, TickRegistration};
use crate::clock::Clock;
use crate::error::{Result, TimerError};
use crate::events::Event;

/// Completed Work phases per long-break cycle.
pub const WORK_SESSIONS_PER_CYCLE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::ShortBreak => "short-break",
            Phase::LongBreak => "long-break",
        }
    }

    /// The phase the transition table selects after this one completes,
    /// given the session count *after* any increment.
    pub fn next(self, session_count: u32) -> Phase {
        match self {
            Phase::Work if session_count % WORK_SESSIONS_PER_CYCLE == 0 => Phase::LongBreak,
            Phase::Work => Phase::ShortBreak,
            Phase::ShortBreak | Phase::LongBreak => Phase::Work,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = TimerError;

    /// Unknown ids are rejected; there is no silent fallback phase.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "work" => Ok(Phase::Work),
            "short-break" => Ok(Phase::ShortBreak),
            "long-break" => Ok(Phase::LongBreak),
            _ => Err(TimerError::InvalidPhase { id: s.to_string() }),
        }
    }
}

/// Nominal phase durations in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseDurations {
    pub work_ms: u64,
    pub short_break_ms: u64,
    pub long_break_ms: u64,
}

impl PhaseDurations {
    pub fn from_secs(work: u64, short_break: u64, long_break: u64) -> Self {
        Self {
            work_ms: work.saturating_mul(1000),
            short_break_ms: short_break.saturating_mul(1000),
            long_break_ms: long_break.saturating_mul(1000),
        }
    }

    pub fn duration_ms(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Work => self.work_ms,
            Phase::ShortBreak => self.short_break_ms,
            Phase::LongBreak => self.long_break_ms,
        }
    }
}

impl Default for PhaseDurations {
    /// 25 min work / 5 min short break / 15 min long break.
    fn default() -> Self {
        Self::from_secs(1_500, 300, 900)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PomodoroSnapshot {
    pub phase: Phase,
    /// Completed Work phases since the last reset.
    pub session_count: u32,
    #[serde(flatten)]
    pub timer: TimerSnapshot,
}

/// Drives a countdown [`TimerEngine`] through the work/break cycle.
pub struct PhaseSequencer<C: Clock> {
    timer: TimerEngine<C>,
    durations: PhaseDurations,
    phase: Phase,
    session_count: u32,
}

impl<C: Clock> PhaseSequencer<C> {
    pub fn new(clock: C, durations: PhaseDurations) -> Self {
        let timer = TimerEngine::countdown(clock, durations.duration_ms(Phase::Work));
        Self {
            timer,
            durations,
            phase: Phase::Work,
            session_count: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session_count(&self) -> u32 {
        self.session_count
    }

    pub fn durations(&self) -> PhaseDurations {
        self.durations
    }

    pub fn state(&self) -> TimerState {
        self.timer.state()
    }

    pub fn remaining_ms(&self) -> Result<u64> {
        // The inner engine is always in countdown mode.
        Ok(self.timer.remaining_ms()?.unwrap_or(0))
    }

    pub fn snapshot(&self) -> Result<PomodoroSnapshot> {
        Ok(PomodoroSnapshot {
            phase: self.phase,
            session_count: self.session_count,
            timer: self.timer.snapshot()?,
        })
    }

    pub fn tick_registration(&self) -> Option<TickRegistration> {
        self.timer.tick_registration()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Result<Option<Event>> {
        self.timer.start()
    }

    pub fn pause(&mut self) -> Result<Option<Event>> {
        self.timer.pause()
    }

    pub fn toggle(&mut self) -> Result<Option<Event>> {
        self.timer.toggle()
    }

    pub fn subscribe(&mut self, callback: SubscriberFn) -> SubscriberId {
        self.timer.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.timer.unsubscribe(id)
    }

    /// Advance one scheduler callback.
    ///
    /// On the zero-crossing tick the whole transition runs in this call:
    /// increment (if leaving Work), select, re-arm, start. The returned
    /// events describe it in order.
    pub fn tick(&mut self, registration: TickRegistration) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        if let Some(completed) = self.timer.tick(registration)? {
            events.push(completed);
            if self.phase == Phase::Work {
                self.session_count += 1;
            }
            let next = self.phase.next(self.session_count);
            self.phase = next;
            self.timer.reset(Some(self.durations.duration_ms(next)));
            events.push(Event::PhaseAdvanced {
                phase: next,
                session_count: self.session_count,
                at: chrono::Utc::now(),
            });
            if let Some(started) = self.timer.start()? {
                events.push(started);
            }
        }
        Ok(events)
    }

    /// Manual phase switch: stops any running segment and re-arms with the
    /// selected phase's duration. Bypasses the transition table -- no
    /// session increment, no auto-start.
    pub fn select_phase(&mut self, phase: Phase) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        if let Some(paused) = self.timer.pause()? {
            events.push(paused);
        }
        self.phase = phase;
        self.timer.reset(Some(self.durations.duration_ms(phase)));
        events.push(Event::PhaseSelected {
            phase,
            at: chrono::Utc::now(),
        });
        Ok(events)
    }

    /// Parse-and-select for callers holding a raw phase id. An unknown id
    /// is [`TimerError::InvalidPhase`] and leaves all state unchanged.
    pub fn select_phase_id(&mut self, id: &str) -> Result<Vec<Event>> {
        let phase = id.parse::<Phase>()?;
        self.select_phase(phase)
    }

    /// Full reset: back to an idle Work phase with the session counter
    /// cleared.
    pub fn reset(&mut self) -> Event {
        self.phase = Phase::Work;
        self.session_count = 0;
        self.timer.reset(Some(self.durations.duration_ms(Phase::Work)))
    }
}
