//! Duration parsing and time formatting for the CLI.
//!
//! Formatting lives here rather than in the core: the engine reports
//! milliseconds and is agnostic to how they are rendered.

use std::time::Duration;

/// Parse a human duration: `250ms`, `90s`, `25m`, `1h`. A bare number is
/// seconds.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let (digits, unit) = match s.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => s.split_at(idx),
        None => (s, "s"),
    };
    let value: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration '{s}'"))?;
    let ms = match unit.trim() {
        "ms" => value,
        "s" => value.saturating_mul(1_000),
        "m" => value.saturating_mul(60_000),
        "h" => value.saturating_mul(3_600_000),
        other => return Err(format!("invalid duration unit '{other}' in '{s}'")),
    };
    Ok(Duration::from_millis(ms))
}

/// Stopwatch display: `MM:SS.cs`, growing to `HH:MM:SS.cs` past an hour.
pub fn format_elapsed(ms: u64) -> String {
    let cs = (ms % 1_000) / 10;
    let total_secs = ms / 1_000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3_600;
    if hours > 0 {
        format!("{hours:02}:{mins:02}:{secs:02}.{cs:02}")
    } else {
        format!("{mins:02}:{secs:02}.{cs:02}")
    }
}

/// Countdown display: `MM:SS`, rounding partial seconds up so the display
/// only shows 00:00 once remaining time is actually zero.
pub fn format_clock(ms: u64) -> String {
    let total_secs = ms.div_ceil(1_000);
    let mins = total_secs / 60;
    let secs = total_secs % 60;
    format!("{mins:02}:{secs:02}")
}
