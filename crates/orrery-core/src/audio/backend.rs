//! Seam between the engine and a concrete audio output (WebAudio, cpal).
//!
//! A driver is probed once per initialization and answers with a tagged
//! capability rather than the engine poking at the platform's API surface.

use crate::error::BackendError;
use crate::mapping::VoiceParams;
use crate::state::ContextState;

/// Backend-assigned id of a per-planet synthesizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VoiceHandle(pub u32);

/// One short tone to play on a voice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub frequency_hz: f64,
    pub attack_sec: f64,
    pub sustain_sec: f64,
    pub release_sec: f64,
    pub tremolo_hz: f64,
    /// Peak envelope level, 0..1, before voice and master gain.
    pub velocity: f32,
    /// Seconds from now until the tone should start (0 = immediately).
    pub delay_sec: f64,
}

impl Tone {
    pub fn from_params(params: &VoiceParams, sustain_sec: f64, velocity: f32) -> Self {
        Self {
            frequency_hz: params.frequency_hz,
            attack_sec: params.attack_sec,
            sustain_sec,
            release_sec: params.release_sec,
            tremolo_hz: params.tremolo_hz,
            velocity,
            delay_sec: 0.0,
        }
    }

    pub fn duration_sec(&self) -> f64 {
        self.attack_sec + self.sustain_sec + self.release_sec
    }
}

/// A live audio output graph: master gain plus per-planet voices.
pub trait AudioBackend {
    fn context_state(&self) -> ContextState;

    /// Resume a suspended output context.
    ///
    /// May return before the context is running; the outcome then shows up
    /// through [`AudioBackend::poll_context`].
    fn resume(&mut self) -> Result<(), BackendError>;

    /// Current context state, or the error a pending resume settled with.
    /// A rejection is reported once.
    fn poll_context(&mut self) -> Result<ContextState, BackendError> {
        Ok(self.context_state())
    }

    fn set_master_gain(&mut self, gain: f32);

    fn create_voice(
        &mut self,
        planet_id: &str,
        params: &VoiceParams,
        gain: f32,
    ) -> Result<VoiceHandle, BackendError>;

    fn set_voice_gain(&mut self, voice: VoiceHandle, gain: f32);

    fn trigger(&mut self, voice: VoiceHandle, tone: &Tone) -> Result<(), BackendError>;

    /// Cut any tone still sounding on `voice`.
    fn silence(&mut self, voice: VoiceHandle);

    fn release_voice(&mut self, voice: VoiceHandle);

    /// Tear down the whole graph; the backend is not used afterwards.
    fn close(&mut self);

    /// True for the no-op fallback.
    fn is_silent(&self) -> bool {
        false
    }
}

/// Result of probing for an audio output.
pub enum Capability {
    Available(Box<dyn AudioBackend>),
    Unavailable(String),
}

impl std::fmt::Debug for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Available(_) => f.write_str("Available(..)"),
            Capability::Unavailable(reason) => f.debug_tuple("Unavailable").field(reason).finish(),
        }
    }
}

/// Something that can try to acquire an audio output.
pub trait AudioDriver {
    fn probe(&mut self) -> Capability;
}

impl<F> AudioDriver for F
where
    F: FnMut() -> Capability,
{
    fn probe(&mut self) -> Capability {
        self()
    }
}

/// Driver for environments with no audio at all.
#[derive(Clone, Debug, Default)]
pub struct NoAudio;

impl AudioDriver for NoAudio {
    fn probe(&mut self) -> Capability {
        Capability::Unavailable("audio disabled".into())
    }
}

/// No-op backend used when no output can be acquired.
///
/// Accepts every call so the rest of the app keeps running unchanged.
#[derive(Debug, Default)]
pub struct SilentBackend {
    next_voice: u32,
    closed: bool,
}

impl SilentBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioBackend for SilentBackend {
    fn context_state(&self) -> ContextState {
        if self.closed {
            ContextState::Closed
        } else {
            ContextState::None
        }
    }

    fn resume(&mut self) -> Result<(), BackendError> {
        Ok(())
    }

    fn set_master_gain(&mut self, _gain: f32) {}

    fn create_voice(
        &mut self,
        _planet_id: &str,
        _params: &VoiceParams,
        _gain: f32,
    ) -> Result<VoiceHandle, BackendError> {
        let handle = VoiceHandle(self.next_voice);
        self.next_voice += 1;
        Ok(handle)
    }

    fn set_voice_gain(&mut self, _voice: VoiceHandle, _gain: f32) {}

    fn trigger(&mut self, _voice: VoiceHandle, _tone: &Tone) -> Result<(), BackendError> {
        Ok(())
    }

    fn silence(&mut self, _voice: VoiceHandle) {}

    fn release_voice(&mut self, _voice: VoiceHandle) {}

    fn close(&mut self) {
        self.closed = true;
    }

    fn is_silent(&self) -> bool {
        true
    }
}
