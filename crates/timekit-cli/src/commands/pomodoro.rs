use std::path::PathBuf;
use std::time::Duration;

use clap::Subcommand;
use log::{debug, info};
use serde::Serialize;
use timekit_core::{Event, MonotonicClock, Phase, PhaseDurations, PhaseSequencer};

use crate::common::{format_clock, parse_duration};
use crate::config;

#[derive(Subcommand)]
pub enum PomodoroAction {
    /// Drive the work/break cycle until N work sessions complete
    Run {
        /// Stop after this many completed work sessions
        #[arg(long, default_value_t = 1)]
        sessions: u32,
        /// Work phase duration (e.g. 25m), overriding config
        #[arg(long, value_name = "DURATION")]
        work: Option<String>,
        /// Short break duration, overriding config
        #[arg(long, value_name = "DURATION")]
        short_break: Option<String>,
        /// Long break duration, overriding config
        #[arg(long, value_name = "DURATION")]
        long_break: Option<String>,
        /// TOML config file with a [durations] table
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Scheduler tick interval
        #[arg(long, default_value = "250ms", value_name = "DURATION")]
        tick: String,
        /// Emit JSON event lines instead of formatted output
        #[arg(long)]
        json: bool,
    },
    /// Print the phase sequence the transition table produces
    Plan {
        /// Number of work sessions to plan through
        #[arg(long, default_value_t = 4)]
        sessions: u32,
        /// Phase to start from (work, short-break, long-break)
        #[arg(long, default_value = "work")]
        phase: String,
        /// Emit the plan as a JSON array
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: PomodoroAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PomodoroAction::Run {
            sessions,
            work,
            short_break,
            long_break,
            config,
            tick,
            json,
        } => {
            let mut durations = match config {
                Some(path) => config::load(&path)?.durations.to_phase_durations(),
                None => PhaseDurations::default(),
            };
            if let Some(work) = work {
                durations.work_ms = parse_duration(&work)?.as_millis() as u64;
            }
            if let Some(short_break) = short_break {
                durations.short_break_ms = parse_duration(&short_break)?.as_millis() as u64;
            }
            if let Some(long_break) = long_break {
                durations.long_break_ms = parse_duration(&long_break)?.as_millis() as u64;
            }
            let tick = parse_duration(&tick)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(drive(durations, sessions, tick, json))
        }
        PomodoroAction::Plan {
            sessions,
            phase,
            json,
        } => plan(sessions, &phase, json),
    }
}

async fn drive(
    durations: PhaseDurations,
    sessions: u32,
    tick_every: Duration,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut seq = PhaseSequencer::new(MonotonicClock::new(), durations);
    seq.start()?;
    info!(
        "pomodoro started: {} until {} work sessions complete",
        seq.phase(),
        sessions
    );

    let mut interval = tokio::time::interval(tick_every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    while seq.session_count() < sessions {
        interval.tick().await;
        let Some(reg) = seq.tick_registration() else {
            break;
        };
        for event in seq.tick(reg)? {
            if json {
                println!("{}", serde_json::to_string(&event)?);
            } else if let Event::PhaseAdvanced {
                phase,
                session_count,
                ..
            } = event
            {
                println!("-> {phase} (work sessions completed: {session_count})");
            }
        }
        debug!(
            "phase {} remaining {}",
            seq.phase(),
            format_clock(seq.remaining_ms()?)
        );
    }

    seq.pause()?;
    if json {
        println!("{}", serde_json::to_string(&seq.snapshot()?)?);
    } else {
        println!(
            "done: {} work sessions completed, next phase {} ({})",
            seq.session_count(),
            seq.phase(),
            format_clock(seq.remaining_ms()?)
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct PlanRow {
    completed: Phase,
    session_count: u32,
    next: Phase,
}

/// Pure preview of the transition table; never sleeps.
fn plan(sessions: u32, start: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let start: Phase = start.parse()?;
    let mut rows = Vec::new();
    let mut phase = start;
    let mut count = 0_u32;

    while count < sessions {
        if phase == Phase::Work {
            count += 1;
        }
        let next = phase.next(count);
        rows.push(PlanRow {
            completed: phase,
            session_count: count,
            next,
        });
        phase = next;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for row in &rows {
            println!(
                "{} #{} -> {}",
                row.completed, row.session_count, row.next
            );
        }
    }
    Ok(())
}
