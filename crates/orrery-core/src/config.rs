use crate::constants::*;
use std::time::Duration;

/// Startup configuration for an orrery instance.
///
/// Nothing is persisted between sessions; front-ends build this from
/// defaults and may override fields before constructing the app.
#[derive(Clone, Debug, PartialEq)]
pub struct OrreryConfig {
    pub tempo_bpm: f64,
    pub volume: f32,
    /// UI speed multiplier, 0.1–10.
    pub speed: f64,
    pub recovery_attempts: u32,
    /// Quiet period before a burst of slider changes is applied.
    pub debounce: Duration,
    pub star_count: usize,
    pub star_seed: u64,
    /// Anchor initial phases on today's date instead of angle zero.
    pub date_anchored: bool,
}

impl Default for OrreryConfig {
    fn default() -> Self {
        Self {
            tempo_bpm: DEFAULT_TEMPO_BPM,
            volume: DEFAULT_MASTER_VOLUME,
            speed: 1.0,
            recovery_attempts: MAX_RECOVERY_ATTEMPTS,
            debounce: Duration::from_millis(DEBOUNCE_WINDOW_MS),
            star_count: DEFAULT_STAR_COUNT,
            star_seed: DEFAULT_STAR_SEED,
            date_anchored: true,
        }
    }
}
