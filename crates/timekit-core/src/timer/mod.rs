mod engine;
mod laps;
mod pomodoro;
mod segment;
mod ticker;

pub use engine::{TimerEngine, TimerMode, TimerSnapshot, TimerState};
pub use laps::{LapRecord, LapRecorder};
pub use pomodoro::{
    Phase, PhaseDurations, PhaseSequencer, PomodoroSnapshot, WORK_SESSIONS_PER_CYCLE,
};
pub use segment::SegmentClock;
pub use ticker::{SubscriberFn, SubscriberId, TickRegistration, Ticker};
