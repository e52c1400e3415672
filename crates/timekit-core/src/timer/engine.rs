//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()`
//! periodically with the registration issued at start.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> ... -> (Idle via reset)
//!            \
//!             -> Expired   (countdown zero-crossing, sticky until re-arm)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::countdown(MonotonicClock::new(), 25 * 60 * 1000);
//! engine.start()?;
//! let reg = engine.tick_registration().unwrap();
//! // In a loop:
//! engine.tick(reg)?; // Returns Some(Event::TimerCompleted) on the crossing tick
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::segment::SegmentClock;
use super::ticker::{SubscriberFn, SubscriberId, TickRegistration, Ticker};
use crate::clock::Clock;
use crate::error::Result;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    /// Countdown reached zero. Sticky until the engine is re-armed via
    /// `reset`; `start()` in this state is a defined no-op.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum TimerMode {
    CountUp,
    Countdown { total_ms: u64 },
}

/// Observable output of one scheduler tick (or an on-demand read).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub elapsed_ms: u64,
    /// Present only in countdown mode; floored at zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_ms: Option<u64>,
    pub at: DateTime<Utc>,
}

/// Core timer state machine.
///
/// Elapsed time is anchored to monotonic segment starts -- remaining time
/// is always derived from elapsed, so count-up and countdown share one
/// source of truth and cannot diverge. One consumer owns one engine; there
/// is no shared global timer.
pub struct TimerEngine<C: Clock> {
    clock: C,
    mode: TimerMode,
    state: TimerState,
    segment: SegmentClock,
    ticker: Ticker,
}

impl<C: Clock> TimerEngine<C> {
    /// Unbounded count-up timer (stopwatch).
    pub fn count_up(clock: C) -> Self {
        Self::new(clock, TimerMode::CountUp)
    }

    /// Countdown timer with a fixed target.
    pub fn countdown(clock: C, total_ms: u64) -> Self {
        Self::new(clock, TimerMode::Countdown { total_ms })
    }

    fn new(clock: C, mode: TimerMode) -> Self {
        Self {
            clock,
            mode,
            state: TimerState::Idle,
            segment: SegmentClock::new(),
            ticker: Ticker::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn total_ms(&self) -> Option<u64> {
        match self.mode {
            TimerMode::Countdown { total_ms } => Some(total_ms),
            TimerMode::CountUp => None,
        }
    }

    /// Elapsed active time. In countdown mode this is capped at the target,
    /// even when sampled between the crossing and the tick that detects it.
    pub fn elapsed_ms(&self) -> Result<u64> {
        let now = self.clock.now_ms()?;
        let raw = self.segment.elapsed(now);
        Ok(match self.mode {
            TimerMode::Countdown { total_ms } => raw.min(total_ms),
            TimerMode::CountUp => raw,
        })
    }

    /// Remaining time, floored at zero. `None` in count-up mode.
    pub fn remaining_ms(&self) -> Result<Option<u64>> {
        let elapsed = self.elapsed_ms()?;
        Ok(self.total_ms().map(|total| total.saturating_sub(elapsed)))
    }

    /// 0.0 .. 1.0 progress toward the countdown target. `None` in count-up
    /// mode.
    pub fn progress(&self) -> Result<Option<f64>> {
        let elapsed = self.elapsed_ms()?;
        Ok(match self.total_ms() {
            Some(0) | None => None,
            Some(total) => Some(elapsed as f64 / total as f64),
        })
    }

    pub fn snapshot(&self) -> Result<TimerSnapshot> {
        Ok(TimerSnapshot {
            state: self.state,
            elapsed_ms: self.elapsed_ms()?,
            remaining_ms: self.remaining_ms()?,
            total_ms: self.total_ms(),
            at: Utc::now(),
        })
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Register an observer notified with a snapshot on every live tick.
    pub fn subscribe(&mut self, callback: SubscriberFn) -> SubscriberId {
        self.ticker.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.ticker.unsubscribe(id)
    }

    /// The registration the driving scheduler must present on each tick.
    /// `None` unless Running.
    pub fn tick_registration(&self) -> Option<TickRegistration> {
        self.ticker.current()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Idle/Paused -> Running. No-op while Running, and no-op on a
    /// countdown whose remaining time is already zero (the caller must
    /// `reset` first).
    pub fn start(&mut self) -> Result<Option<Event>> {
        match self.state {
            TimerState::Running | TimerState::Expired => Ok(None),
            TimerState::Idle | TimerState::Paused => {
                if self.remaining_ms()? == Some(0) {
                    return Ok(None);
                }
                let now = self.clock.now_ms()?;
                let resumed = self.state == TimerState::Paused;
                self.segment.start(now);
                self.state = TimerState::Running;
                self.ticker.register();
                Ok(Some(if resumed {
                    Event::TimerResumed {
                        elapsed_ms: self.elapsed_ms()?,
                        at: Utc::now(),
                    }
                } else {
                    Event::TimerStarted {
                        total_ms: self.total_ms(),
                        at: Utc::now(),
                    }
                }))
            }
        }
    }

    /// Running -> Paused, banking the in-flight segment exactly once.
    /// No-op in any other state.
    pub fn pause(&mut self) -> Result<Option<Event>> {
        if self.state != TimerState::Running {
            return Ok(None);
        }
        let now = self.clock.now_ms()?;
        self.segment.stop(now);
        self.state = TimerState::Paused;
        self.ticker.cancel();
        Ok(Some(Event::TimerPaused {
            elapsed_ms: self.elapsed_ms()?,
            at: Utc::now(),
        }))
    }

    /// Running -> pause; otherwise -> start.
    pub fn toggle(&mut self) -> Result<Option<Event>> {
        if self.state == TimerState::Running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Return to Idle, discarding (not banking) any in-flight segment.
    /// A countdown re-arms with `new_total_ms` when given, keeping its
    /// previous target otherwise; passing a target to a count-up engine
    /// converts it to countdown mode (a mode reset).
    pub fn reset(&mut self, new_total_ms: Option<u64>) -> Event {
        if let Some(total_ms) = new_total_ms {
            self.mode = TimerMode::Countdown { total_ms };
        }
        self.segment.reset(0);
        self.state = TimerState::Idle;
        self.ticker.cancel();
        Event::TimerReset { at: Utc::now() }
    }

    /// Advance the machine one scheduler callback.
    ///
    /// Ticks presented with a stale registration are ignored. While
    /// Running, samples the clock, detects the countdown zero-crossing
    /// exactly once (Running -> Expired, elapsed clamped to the target),
    /// and broadcasts a snapshot to subscribers -- including the crossing
    /// tick itself. Returns the `TimerCompleted` event on that tick.
    pub fn tick(&mut self, registration: TickRegistration) -> Result<Option<Event>> {
        if !self.ticker.accepts(registration) || self.state != TimerState::Running {
            return Ok(None);
        }
        let now = self.clock.now_ms()?;
        let mut completed = None;
        if let TimerMode::Countdown { total_ms } = self.mode {
            if self.segment.elapsed(now) >= total_ms {
                self.segment.reset(total_ms);
                self.state = TimerState::Expired;
                self.ticker.cancel();
                completed = Some(Event::TimerCompleted {
                    total_ms,
                    at: Utc::now(),
                });
            }
        }
        let snapshot = self.snapshot()?;
        self.ticker.broadcast(&snapshot);
        Ok(completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn running_registration<C: Clock>(engine: &TimerEngine<C>) -> TickRegistration {
        engine.tick_registration().expect("engine should be running")
    }

    #[test]
    fn start_pause_resume() {
        let clock = ManualClock::new(0);
        let mut engine = TimerEngine::count_up(clock.clone());
        assert_eq!(engine.state(), TimerState::Idle);

        assert!(engine.start().unwrap().is_some());
        assert_eq!(engine.state(), TimerState::Running);

        clock.advance(1_000);
        assert!(engine.pause().unwrap().is_some());
        assert_eq!(engine.state(), TimerState::Paused);
        assert_eq!(engine.elapsed_ms().unwrap(), 1_000);

        assert!(engine.start().unwrap().is_some());
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn start_while_running_is_noop() {
        let mut engine = TimerEngine::count_up(ManualClock::new(0));
        engine.start().unwrap();
        assert!(engine.start().unwrap().is_none());
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn pause_freezes_elapsed_across_idle_gap() {
        let clock = ManualClock::new(0);
        let mut engine = TimerEngine::count_up(clock.clone());
        engine.start().unwrap();
        clock.advance(400);
        engine.pause().unwrap();

        clock.advance(60_000); // Idle gap must not count.
        assert_eq!(engine.elapsed_ms().unwrap(), 400);

        engine.start().unwrap();
        clock.advance(600);
        assert_eq!(engine.elapsed_ms().unwrap(), 1_000);
    }

    #[test]
    fn countdown_crossing_expires_and_clamps() {
        let clock = ManualClock::new(0);
        let mut engine = TimerEngine::countdown(clock.clone(), 1_000);
        engine.start().unwrap();
        let reg = running_registration(&engine);

        clock.advance(999);
        assert!(engine.tick(reg).unwrap().is_none());
        assert_eq!(engine.remaining_ms().unwrap(), Some(1));

        clock.advance(501); // Overshoot past the target.
        let event = engine.tick(reg).unwrap();
        assert!(matches!(event, Some(Event::TimerCompleted { total_ms: 1_000, .. })));
        assert_eq!(engine.state(), TimerState::Expired);
        assert_eq!(engine.elapsed_ms().unwrap(), 1_000);
        assert_eq!(engine.remaining_ms().unwrap(), Some(0));

        // Sampling after the crossing tick stays clamped.
        clock.advance(10_000);
        assert_eq!(engine.remaining_ms().unwrap(), Some(0));
    }

    #[test]
    fn start_on_expired_countdown_is_noop() {
        let clock = ManualClock::new(0);
        let mut engine = TimerEngine::countdown(clock.clone(), 100);
        engine.start().unwrap();
        let reg = running_registration(&engine);
        clock.advance(100);
        engine.tick(reg).unwrap();
        assert_eq!(engine.state(), TimerState::Expired);

        assert!(engine.start().unwrap().is_none());
        assert_eq!(engine.state(), TimerState::Expired);

        engine.reset(Some(100));
        assert!(engine.start().unwrap().is_some());
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn reset_is_idempotent() {
        let clock = ManualClock::new(0);
        let mut engine = TimerEngine::count_up(clock.clone());
        engine.start().unwrap();
        clock.advance(5_000);

        engine.reset(None);
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.elapsed_ms().unwrap(), 0);

        engine.reset(None);
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.elapsed_ms().unwrap(), 0);
    }

    #[test]
    fn stale_registration_is_ignored() {
        let clock = ManualClock::new(0);
        let mut engine = TimerEngine::count_up(clock.clone());
        engine.start().unwrap();
        let stale = running_registration(&engine);

        engine.pause().unwrap();
        engine.start().unwrap();
        let live = running_registration(&engine);

        // Count deliveries through a subscriber.
        let counter = std::rc::Rc::new(std::cell::Cell::new(0_u32));
        let seen = counter.clone();
        engine.subscribe(Box::new(move |_| seen.set(seen.get() + 1)));

        engine.tick(stale).unwrap();
        assert_eq!(counter.get(), 0);

        engine.tick(live).unwrap();
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn progress_tracks_countdown() {
        let clock = ManualClock::new(0);
        let mut engine = TimerEngine::countdown(clock.clone(), 1_000);
        assert_eq!(engine.mode(), TimerMode::Countdown { total_ms: 1_000 });
        assert_eq!(engine.progress().unwrap(), Some(0.0));
        engine.start().unwrap();
        clock.advance(250);
        assert_eq!(engine.progress().unwrap(), Some(0.25));

        let count_up = TimerEngine::count_up(ManualClock::new(0));
        assert_eq!(count_up.progress().unwrap(), None);
    }

    #[test]
    fn toggle_alternates_states() {
        let mut engine = TimerEngine::count_up(ManualClock::new(0));
        engine.toggle().unwrap();
        assert_eq!(engine.state(), TimerState::Running);
        engine.toggle().unwrap();
        assert_eq!(engine.state(), TimerState::Paused);
        engine.toggle().unwrap();
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn clock_failure_propagates() {
        let clock = ManualClock::new(0);
        let mut engine = TimerEngine::count_up(clock.clone());
        engine.start().unwrap();
        clock.make_unavailable();
        assert!(engine.elapsed_ms().is_err());
        assert!(engine.pause().is_err());
    }
}
