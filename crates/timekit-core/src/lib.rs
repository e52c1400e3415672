//! # Timekit Core Library
//!
//! Drift-corrected timing logic behind the Timekit stopwatch and pomodoro
//! tools. The core is deliberately free of scheduling technology: a
//! wall-clock-delta state machine that the caller drives by invoking
//! `tick()` periodically, with a thin CLI (or any GUI) layered on top.
//!
//! ## Architecture
//!
//! - **Segment clock**: elapsed time is anchored to a single monotonic
//!   start sample per running segment, so callback-interval jitter never
//!   accumulates into drift
//! - **Timer engine**: Idle/Running/Paused/Expired state machine over the
//!   segment clock, in count-up or countdown mode
//! - **Lap recorder**: creation-ordered splits for the stopwatch
//! - **Phase sequencer**: work/break cycling for the pomodoro, re-arming
//!   and restarting the engine on each zero-crossing
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: core timer state machine
//! - [`PhaseSequencer`]: pomodoro work/break cycle driver
//! - [`LapRecorder`]: stopwatch lap splits
//! - [`Clock`]: injectable monotonic time source

pub mod clock;
pub mod error;
pub mod events;
pub mod timer;

pub use clock::{Clock, ClockError, ManualClock, MonotonicClock};
pub use error::{Result, TimerError};
pub use events::Event;
pub use timer::{
    LapRecord, LapRecorder, Phase, PhaseDurations, PhaseSequencer, PomodoroSnapshot,
    TimerEngine, TimerMode, TimerSnapshot, TimerState,
};
