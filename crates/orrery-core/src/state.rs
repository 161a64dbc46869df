//! Engine-side state types mirrored into the UI through subscriptions.
//!
//! These types avoid referencing platform-specific APIs and are shared by
//! the web and native frontends.

use crate::constants::{DEFAULT_MASTER_VOLUME, DEFAULT_PLANET_VOLUME, DEFAULT_TEMPO_BPM};
use crate::error::AudioError;
use crate::mapping::PENTATONIC_NOTES;

/// Process-wide playback settings.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioSettings {
    pub is_playing: bool,
    /// Master volume in [0, 1].
    pub volume: f32,
    /// Tempo in [60, 180] BPM.
    pub tempo: f64,
    /// Engine time multiplier in [1, 10000].
    pub time_multiplier: f64,
    /// Silent mode, independent of per-planet mutes.
    pub global_mute: bool,
    pub scale: Vec<String>,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            is_playing: false,
            volume: DEFAULT_MASTER_VOLUME,
            tempo: DEFAULT_TEMPO_BPM,
            time_multiplier: 1.0,
            global_mute: false,
            scale: PENTATONIC_NOTES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// State of the underlying output context, as reported by the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContextState {
    /// No context has been acquired.
    #[default]
    None,
    /// Created but waiting for a user gesture.
    Suspended,
    Running,
    Closed,
}

/// Engine lifecycle. The silent degraded engine sits in `Error`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
    Error,
}

/// Engine health snapshot for the UI.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AudioState {
    pub lifecycle: Lifecycle,
    pub is_initialized: bool,
    pub is_playing: bool,
    pub has_error: bool,
    pub error: Option<AudioError>,
    pub context_state: ContextState,
    /// True when running on the no-op backend.
    pub is_silent: bool,
}

/// Per-planet audio state, owned by the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanetAudioState {
    pub is_muted: bool,
    /// Planet gain in [0, 1]; kept while muted so unmuting restores it.
    pub volume: f32,
    pub frequency: f64,
}

impl PlanetAudioState {
    pub fn new(frequency: f64, is_muted: bool) -> Self {
        Self {
            is_muted,
            volume: DEFAULT_PLANET_VOLUME,
            frequency,
        }
    }

    /// Gain that should currently reach the output.
    pub fn effective_gain(&self) -> f32 {
        if self.is_muted {
            0.0
        } else {
            self.volume
        }
    }
}
