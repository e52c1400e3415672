use std::time::Duration;

use clap::Subcommand;
use log::debug;
use timekit_core::{LapRecorder, MonotonicClock, TimerEngine};

use crate::common::{format_elapsed, parse_duration};

#[derive(Subcommand)]
pub enum StopwatchAction {
    /// Run the stopwatch for a fixed wall time, then print the lap table
    Run {
        /// How long to keep the stopwatch running (e.g. 5s, 2m)
        #[arg(long = "for", value_name = "DURATION")]
        run_for: String,
        /// Scheduler tick interval
        #[arg(long, default_value = "100ms", value_name = "DURATION")]
        tick: String,
        /// Record a lap each time this much elapsed time passes
        #[arg(long, value_name = "DURATION")]
        lap_every: Option<String>,
        /// Emit JSON lines instead of formatted output
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: StopwatchAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        StopwatchAction::Run {
            run_for,
            tick,
            lap_every,
            json,
        } => {
            let run_for = parse_duration(&run_for)?;
            let tick = parse_duration(&tick)?;
            let lap_every = lap_every.as_deref().map(parse_duration).transpose()?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(drive(run_for, tick, lap_every, json))
        }
    }
}

async fn drive(
    run_for: Duration,
    tick_every: Duration,
    lap_every: Option<Duration>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut timer = TimerEngine::count_up(MonotonicClock::new());
    let mut laps = LapRecorder::new();

    timer.start()?;
    debug!("stopwatch started, running for {run_for:?}");

    let deadline = tokio::time::Instant::now() + run_for;
    let mut interval = tokio::time::interval(tick_every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut next_lap_at = lap_every.map(|d| d.as_millis() as u64);

    loop {
        interval.tick().await;
        let Some(reg) = timer.tick_registration() else {
            break;
        };
        timer.tick(reg)?;
        let snapshot = timer.snapshot()?;

        if let (Some(every), Some(due)) = (lap_every, next_lap_at.as_mut()) {
            if snapshot.elapsed_ms >= *due {
                if let Some(event) = laps.record_lap(&timer)? {
                    debug!("lap recorded at {} ms", snapshot.elapsed_ms);
                    if json {
                        println!("{}", serde_json::to_string(&event)?);
                    }
                }
                *due += every.as_millis() as u64;
            }
        }

        if json {
            println!("{}", serde_json::to_string(&snapshot)?);
        }

        if tokio::time::Instant::now() >= deadline {
            break;
        }
    }

    timer.pause()?;
    let final_snapshot = timer.snapshot()?;

    if json {
        println!("{}", serde_json::to_string(&final_snapshot)?);
        println!("{}", serde_json::to_string(laps.laps())?);
    } else {
        println!("total {}", format_elapsed(final_snapshot.elapsed_ms));
        for lap in laps.laps_in_creation_order() {
            println!(
                "{}  total {}  split {}",
                lap.label,
                format_elapsed(lap.cumulative_ms),
                format_elapsed(lap.split_ms)
            );
        }
    }
    Ok(())
}
