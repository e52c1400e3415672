//! Timing-correctness properties for the timer core, driven through a
//! manually advanced clock so every scenario is deterministic.

use proptest::prelude::*;

use timekit_core::{
    Event, LapRecorder, ManualClock, Phase, PhaseDurations, PhaseSequencer, TimerEngine,
    TimerError, TimerState,
};

fn running_count_up(clock: &ManualClock) -> TimerEngine<ManualClock> {
    let mut timer = TimerEngine::count_up(clock.clone());
    timer.start().unwrap();
    timer
}

proptest! {
    /// Elapsed time equals total wall time regardless of how irregular the
    /// callback intervals are -- error never accumulates with tick count.
    #[test]
    fn drift_independence(intervals in prop::collection::vec(1u64..=500, 1..80)) {
        let clock = ManualClock::new(0);
        let mut timer = running_count_up(&clock);
        let reg = timer.tick_registration().unwrap();

        let mut total = 0u64;
        for delta in intervals {
            clock.advance(delta);
            total += delta;
            timer.tick(reg).unwrap();
        }

        prop_assert_eq!(timer.elapsed_ms().unwrap(), total);
    }

    /// Running for `a`, pausing for an arbitrary gap, then running for `b`
    /// yields exactly `a + b`.
    #[test]
    fn pause_resume_additivity(a in 0u64..100_000, gap in 0u64..10_000_000, b in 0u64..100_000) {
        let clock = ManualClock::new(0);
        let mut timer = running_count_up(&clock);

        clock.advance(a);
        timer.pause().unwrap();
        clock.advance(gap);
        timer.start().unwrap();
        clock.advance(b);
        timer.pause().unwrap();

        prop_assert_eq!(timer.elapsed_ms().unwrap(), a + b);
    }

    /// Remaining time reports exactly zero once elapsed reaches the target,
    /// for any overshoot past the crossing.
    #[test]
    fn countdown_clamps_at_zero(total in 1u64..1_000_000, overshoot in 0u64..1_000_000) {
        let clock = ManualClock::new(0);
        let mut timer = TimerEngine::countdown(clock.clone(), total);
        timer.start().unwrap();
        let reg = timer.tick_registration().unwrap();

        clock.advance(total + overshoot);
        timer.tick(reg).unwrap();

        prop_assert_eq!(timer.state(), TimerState::Expired);
        prop_assert_eq!(timer.remaining_ms().unwrap(), Some(0));
        prop_assert_eq!(timer.elapsed_ms().unwrap(), total);

        // Sampled again after the crossing tick, still clamped.
        clock.advance(1_000);
        prop_assert_eq!(timer.remaining_ms().unwrap(), Some(0));
    }
}

#[test]
fn lap_splits_for_known_cumulative_times() {
    let clock = ManualClock::new(0);
    let timer = running_count_up(&clock);
    let mut laps = LapRecorder::new();

    for at in [1_000, 2_500, 4_000] {
        clock.set(at);
        laps.record_lap(&timer).unwrap();
    }

    let splits: Vec<u64> = laps.laps_in_creation_order().map(|l| l.split_ms).collect();
    assert_eq!(splits, vec![1_000, 1_500, 1_500]);
}

#[test]
fn lap_while_paused_is_a_noop() {
    let clock = ManualClock::new(0);
    let mut timer = running_count_up(&clock);
    let mut laps = LapRecorder::new();

    clock.advance(800);
    laps.record_lap(&timer).unwrap();
    timer.pause().unwrap();

    laps.record_lap(&timer).unwrap();
    assert_eq!(laps.len(), 1);
}

#[test]
fn reset_is_idempotent_and_clears_laps() {
    let clock = ManualClock::new(0);
    let mut timer = running_count_up(&clock);
    let mut laps = LapRecorder::new();

    clock.advance(2_000);
    laps.record_lap(&timer).unwrap();

    for _ in 0..2 {
        timer.reset(None);
        laps.reset_laps();
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.elapsed_ms().unwrap(), 0);
        assert!(laps.is_empty());
    }
}

#[test]
fn pomodoro_four_session_cycle() {
    let durations = PhaseDurations::from_secs(2, 1, 3);
    let clock = ManualClock::new(0);
    let mut seq = PhaseSequencer::new(clock.clone(), durations);
    seq.start().unwrap();

    let mut after_work = Vec::new();
    while seq.session_count() < 4 {
        let reg = seq.tick_registration().unwrap();
        clock.advance(durations.duration_ms(seq.phase()));
        let was_work = seq.phase() == Phase::Work;
        let events = seq.tick(reg).unwrap();
        assert!(!events.is_empty());
        if was_work {
            after_work.push(seq.phase());
        }
    }

    assert_eq!(
        after_work,
        vec![
            Phase::ShortBreak,
            Phase::ShortBreak,
            Phase::ShortBreak,
            Phase::LongBreak
        ]
    );
    assert_eq!(seq.session_count(), 4);
}

#[test]
fn pomodoro_transition_emits_completed_then_advanced_then_started() {
    let durations = PhaseDurations::from_secs(1, 1, 1);
    let clock = ManualClock::new(0);
    let mut seq = PhaseSequencer::new(clock.clone(), durations);
    seq.start().unwrap();

    let reg = seq.tick_registration().unwrap();
    clock.advance(durations.work_ms);
    let events = seq.tick(reg).unwrap();

    assert!(matches!(events[0], Event::TimerCompleted { .. }));
    assert!(matches!(
        events[1],
        Event::PhaseAdvanced {
            phase: Phase::ShortBreak,
            session_count: 1,
            ..
        }
    ));
    assert!(matches!(events[2], Event::TimerStarted { .. }));
}

#[test]
fn stale_registration_delivers_nothing() {
    let clock = ManualClock::new(0);
    let mut timer = running_count_up(&clock);
    let stale = timer.tick_registration().unwrap();

    timer.pause().unwrap();
    clock.advance(500);

    // A callback left over from before the pause must be ignored.
    assert!(timer.tick(stale).unwrap().is_none());
    assert_eq!(timer.elapsed_ms().unwrap(), 0);
}

#[test]
fn unavailable_clock_is_fatal_and_propagated() {
    let clock = ManualClock::new(0);
    let mut timer = running_count_up(&clock);
    let reg = timer.tick_registration().unwrap();

    clock.make_unavailable();
    assert!(matches!(
        timer.tick(reg),
        Err(TimerError::ClockUnavailable(_))
    ));
}

#[test]
fn subscriber_sees_monotone_elapsed_while_running() {
    let clock = ManualClock::new(0);
    let mut timer = running_count_up(&clock);
    let reg = timer.tick_registration().unwrap();

    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = seen.clone();
    timer.subscribe(Box::new(move |snap| sink.borrow_mut().push(snap.elapsed_ms)));

    for delta in [5, 300, 1, 250] {
        clock.advance(delta);
        timer.tick(reg).unwrap();
    }

    let samples = seen.borrow();
    assert_eq!(samples.as_slice(), &[5, 305, 306, 556]);
    assert!(samples.windows(2).all(|w| w[0] <= w[1]));
}
