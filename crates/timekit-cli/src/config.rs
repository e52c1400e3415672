//! TOML configuration for phase durations.
//!
//! ```toml
//! [durations]
//! work_secs = 1500
//! short_break_secs = 300
//! long_break_secs = 900
//! ```

use std::path::Path;

use serde::Deserialize;
use timekit_core::PhaseDurations;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub durations: DurationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DurationConfig {
    pub work_secs: u64,
    pub short_break_secs: u64,
    pub long_break_secs: u64,
}

impl Default for DurationConfig {
    fn default() -> Self {
        let defaults = PhaseDurations::default();
        Self {
            work_secs: defaults.work_ms / 1_000,
            short_break_secs: defaults.short_break_ms / 1_000,
            long_break_secs: defaults.long_break_ms / 1_000,
        }
    }
}

impl DurationConfig {
    pub fn to_phase_durations(&self) -> PhaseDurations {
        PhaseDurations::from_secs(self.work_secs, self.short_break_secs, self.long_break_secs)
    }
}

pub fn load(path: &Path) -> Result<FileConfig, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {e}", path.display()))?;
    let config: FileConfig = toml::from_str(&text)
        .map_err(|e| format!("failed to parse config {}: {e}", path.display()))?;
    Ok(config)
}
