use super::backend::{AudioBackend, AudioDriver, Capability, SilentBackend, Tone, VoiceHandle};
use super::recovery::RetryPolicy;
use super::transport::{FiredEvents, Transport};
use crate::config::OrreryConfig;
use crate::constants::{RESUME_SETTLE_MS, TONE_SUSTAIN_SEC, TONE_VELOCITY};
use crate::error::{AudioError, BackendError};
use crate::mapping::{
    clamp_tempo, clamp_time_multiplier, clamp_unit, effective_interval, speed_to_time_multiplier,
};
use crate::observers::{ListenerToken, Listeners};
use crate::planets::{Catalogue, Planet};
use crate::state::{AudioSettings, AudioState, ContextState, Lifecycle, PlanetAudioState};
use fnv::{FnvHashMap, FnvHashSet};
use std::time::Duration;

/// When a freshly scheduled planet sounds for the first time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FirstTone {
    Now,
    AfterInterval,
}

/// Sonification engine: owns the output graph, one synth per planet, and
/// the transport that triggers each unmuted planet at its interval.
///
/// One engine per running app, constructed by the app and passed around by
/// reference. All mutation of the audio graph goes through these methods.
///
/// The transport is driven by [`AudioEngine::tick`] from the host loop; it
/// is independent of the animation clock, so tones and on-screen orbits are
/// only approximately aligned.
pub struct AudioEngine {
    driver: Box<dyn AudioDriver>,
    backend: Option<Box<dyn AudioBackend>>,
    catalogue: Catalogue,
    settings: AudioSettings,
    state: AudioState,
    voices: FnvHashMap<String, VoiceHandle>,
    planet_states: FnvHashMap<String, PlanetAudioState>,
    failed_voices: FnvHashSet<String>,
    transport: Transport,
    retry: RetryPolicy,
    /// Time spent waiting on a resume that has not landed yet.
    resume_wait: Option<Duration>,
    fired: FiredEvents,
    state_listeners: Listeners<AudioState>,
    settings_listeners: Listeners<AudioSettings>,
    error_listeners: Listeners<AudioError>,
}

impl AudioEngine {
    pub fn new(catalogue: Catalogue, driver: impl AudioDriver + 'static) -> Self {
        Self::with_config(catalogue, driver, &OrreryConfig::default())
    }

    pub fn with_config(
        catalogue: Catalogue,
        driver: impl AudioDriver + 'static,
        config: &OrreryConfig,
    ) -> Self {
        let settings = AudioSettings {
            volume: clamp_unit(config.volume),
            tempo: clamp_tempo(config.tempo_bpm),
            time_multiplier: speed_to_time_multiplier(config.speed),
            ..AudioSettings::default()
        };
        Self {
            driver: Box::new(driver),
            backend: None,
            catalogue,
            settings,
            state: AudioState::default(),
            voices: FnvHashMap::default(),
            planet_states: FnvHashMap::default(),
            failed_voices: FnvHashSet::default(),
            transport: Transport::new(),
            retry: RetryPolicy::new(config.recovery_attempts),
            resume_wait: None,
            fired: FiredEvents::new(),
            state_listeners: Listeners::new(),
            settings_listeners: Listeners::new(),
            error_listeners: Listeners::new(),
        }
    }

    // ---------------- Lifecycle ----------------

    /// Acquire the output graph. Idempotent.
    ///
    /// If no output can be acquired after retries the engine switches to a
    /// silent backend, reports `is_initialized && has_error`, and returns the
    /// error. The engine stays fully usable either way.
    pub fn initialize(&mut self) -> Result<(), AudioError> {
        if self.backend.is_some() {
            return Ok(());
        }
        self.state.lifecycle = Lifecycle::Initializing;
        self.notify_state();

        let retry = self.retry;
        let driver = &mut self.driver;
        let probed = retry.run("initialize", || match driver.probe() {
            Capability::Available(backend) => Ok(backend),
            Capability::Unavailable(reason) => Err(BackendError::Unavailable(reason)),
        });

        match probed {
            Ok(backend) => {
                self.install_backend(backend);
                self.state.lifecycle = Lifecycle::Ready;
                self.state.is_initialized = true;
                log::info!(
                    "[audio] initialized, context={:?}",
                    self.state.context_state
                );
                self.notify_state();
                Ok(())
            }
            Err(e) => {
                let err = e.into_audio_error();
                log::warn!("[audio] no output available, running silent");
                self.install_backend(Box::new(SilentBackend::new()));
                self.state.lifecycle = Lifecycle::Error;
                self.state.is_initialized = true;
                self.surface(err.clone());
                Err(err)
            }
        }
    }

    /// Start playback, initializing and resuming the context if needed.
    ///
    /// No-op while already playing. A context that cannot be resumed is
    /// reported as an error, but playback state still flips to playing.
    pub fn start(&mut self) -> Result<(), AudioError> {
        if self.settings.is_playing {
            return Ok(());
        }
        if self.backend.is_none() {
            if let Err(e) = self.initialize() {
                log::warn!("[audio] continuing without output: {e}");
            }
        }
        let resumed = self.resume_context();
        if let Err(e) = &resumed {
            self.surface(e.clone());
        }
        self.ensure_voices();
        self.schedule_all(FirstTone::Now);
        self.transport.start();
        self.settings.is_playing = true;
        self.state.is_playing = true;
        log::info!(
            "[audio] playing {} voices",
            self.transport.scheduled_count()
        );
        self.notify_settings();
        self.notify_state();
        resumed
    }

    /// Halt the transport and cut active tones. Safe to call at any time.
    pub fn stop(&mut self) {
        self.transport.stop();
        self.transport.clear();
        if let Some(backend) = self.backend.as_mut() {
            for voice in self.voices.values() {
                backend.silence(*voice);
            }
        }
        if self.settings.is_playing {
            self.settings.is_playing = false;
            self.state.is_playing = false;
            log::info!("[audio] stopped");
            self.notify_settings();
            self.notify_state();
        }
    }

    /// Release every synth and the output graph and return to `Uninitialized`.
    ///
    /// Subscribers get the reset state once and are then dropped.
    pub fn dispose(&mut self) {
        self.stop();
        self.release_backend();
        self.planet_states.clear();
        self.failed_voices.clear();
        self.transport = Transport::new();
        self.state = AudioState::default();
        log::info!("[audio] disposed");
        self.notify_state();
        self.state_listeners.clear();
        self.settings_listeners.clear();
        self.error_listeners.clear();
    }

    /// Manual recovery: rebuild the output graph and restore playback.
    ///
    /// Planet volumes and mutes are kept.
    pub fn retry(&mut self) -> Result<(), AudioError> {
        let was_playing = self.settings.is_playing;
        self.stop();
        self.release_backend();
        self.failed_voices.clear();
        self.state = AudioState::default();
        log::info!("[audio] retrying audio setup");
        let init = self.initialize();
        if was_playing {
            self.start()?;
        }
        init
    }

    // ---------------- Settings ----------------

    pub fn set_master_volume(&mut self, volume: f32) {
        self.settings.volume = clamp_unit(volume);
        self.apply_master_gain();
        self.notify_settings();
    }

    /// Set the tempo, clamped to 60–180 BPM; reschedules every voice.
    pub fn set_tempo(&mut self, bpm: f64) {
        let tempo = clamp_tempo(bpm);
        if tempo != self.settings.tempo {
            self.settings.tempo = tempo;
            self.reschedule();
        }
        self.notify_settings();
    }

    /// Set the time multiplier, clamped to 1–10000; reschedules every voice.
    pub fn set_time_multiplier(&mut self, multiplier: f64) {
        let m = clamp_time_multiplier(multiplier);
        if m != self.settings.time_multiplier {
            self.settings.time_multiplier = m;
            self.reschedule();
        }
        self.notify_settings();
    }

    /// Silent mode, usable before any output exists.
    pub fn set_global_mute(&mut self, muted: bool) {
        self.settings.global_mute = muted;
        self.apply_master_gain();
        self.notify_settings();
    }

    /// Returns false for an unknown planet id.
    pub fn set_planet_volume(&mut self, id: &str, volume: f32) -> bool {
        let Some(planet) = self.catalogue.get(id) else {
            return false;
        };
        let ps = self
            .planet_states
            .entry(id.to_string())
            .or_insert_with(|| PlanetAudioState::new(planet.frequency_hz(), planet.is_muted()));
        ps.volume = clamp_unit(volume);
        let gain = ps.effective_gain();
        if let (Some(backend), Some(voice)) = (self.backend.as_mut(), self.voices.get(id)) {
            backend.set_voice_gain(*voice, gain);
        }
        true
    }

    /// Mute or unmute one planet. Muting silences it at once; unmuting while
    /// playing puts it back on the transport. Returns false for an unknown id.
    pub fn set_planet_mute(&mut self, id: &str, muted: bool) -> bool {
        let Some(planet) = self.catalogue.get_mut(id) else {
            return false;
        };
        let was_muted = planet.is_muted();
        planet.set_muted(muted);
        let ps = self
            .planet_states
            .entry(id.to_string())
            .or_insert_with(|| PlanetAudioState::new(planet.frequency_hz(), muted));
        ps.is_muted = muted;
        let gain = ps.effective_gain();

        let voice = self.voices.get(id).copied();
        if let (Some(backend), Some(voice)) = (self.backend.as_mut(), voice) {
            backend.set_voice_gain(voice, gain);
            if muted {
                backend.silence(voice);
            }
        }
        if muted {
            self.transport.cancel(id);
        } else if was_muted
            && self.settings.is_playing
            && voice.is_some()
            && !self.transport.is_scheduled(id)
        {
            if let Some(ordinal) = self.catalogue.ordinal(id) {
                let interval = self.interval_for(ordinal);
                self.transport.schedule_repeat(id, interval, 0.0);
            }
        }
        log::debug!("[audio] {id} muted={muted}");
        true
    }

    // ---------------- Scheduling ----------------

    /// Advance the transport by `dt` and trigger due tones.
    ///
    /// Also picks up the outcome of an asynchronous context resume.
    pub fn tick(&mut self, dt: Duration) {
        self.poll_context(dt);
        if !self.settings.is_playing {
            return;
        }
        let mut fired = std::mem::take(&mut self.fired);
        fired.clear();
        self.transport.advance(dt, &mut fired);
        for ev in fired.iter() {
            self.fire(&ev.key);
        }
        fired.clear();
        self.fired = fired;
    }

    fn fire(&mut self, id: &str) {
        let Some(planet) = self.catalogue.get(id) else {
            return;
        };
        if planet.is_muted() {
            self.transport.cancel(id);
            return;
        }
        let (Some(voice), Some(backend)) = (self.voices.get(id).copied(), self.backend.as_mut())
        else {
            return;
        };
        let tone = Tone::from_params(&planet.voice_params(), TONE_SUSTAIN_SEC, TONE_VELOCITY);
        let retry = self.retry;
        if let Err(e) = retry.run("trigger", || backend.trigger(voice, &tone)) {
            log::warn!("[audio] dropping {id} from the schedule");
            self.transport.cancel(id);
            self.surface(e.into_audio_error());
        }
    }

    fn interval_for(&self, ordinal: usize) -> f64 {
        effective_interval(
            ordinal,
            self.settings.tempo,
            self.settings.time_multiplier,
        )
    }

    // Cancel everything, then schedule every unmuted voiced planet afresh.
    fn schedule_all(&mut self, first: FirstTone) {
        self.transport.clear();
        for (ordinal, planet) in self.catalogue.planets().iter().enumerate() {
            if planet.is_muted() || !self.voices.contains_key(planet.id()) {
                continue;
            }
            let interval = effective_interval(
                ordinal,
                self.settings.tempo,
                self.settings.time_multiplier,
            );
            let offset = match first {
                FirstTone::Now => 0.0,
                FirstTone::AfterInterval => interval,
            };
            self.transport.schedule_repeat(planet.id(), interval, offset);
        }
    }

    fn reschedule(&mut self) {
        if self.settings.is_playing {
            self.schedule_all(FirstTone::AfterInterval);
            log::debug!(
                "[audio] rescheduled at {} bpm, x{}",
                self.settings.tempo,
                self.settings.time_multiplier
            );
        }
    }

    // ---------------- Backend plumbing ----------------

    fn install_backend(&mut self, mut backend: Box<dyn AudioBackend>) {
        backend.set_master_gain(self.master_gain());
        self.state.context_state = backend.context_state();
        self.state.is_silent = backend.is_silent();
        self.backend = Some(backend);
    }

    fn release_backend(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            for (_, voice) in self.voices.drain() {
                backend.release_voice(voice);
            }
            backend.close();
        }
        self.voices.clear();
        self.resume_wait = None;
    }

    fn resume_context(&mut self) -> Result<(), AudioError> {
        let retry = self.retry;
        let Some(backend) = self.backend.as_mut() else {
            return Ok(());
        };
        if backend.context_state() != ContextState::Suspended {
            return Ok(());
        }
        let resumed = retry.run("resume context", || backend.resume());
        self.state.context_state = backend.context_state();
        let pending = resumed.is_ok() && self.state.context_state == ContextState::Suspended;
        self.resume_wait = pending.then_some(Duration::ZERO);
        resumed.map_err(BackendError::into_audio_error)
    }

    // Refresh the context state; a rejected resume, or one that has not
    // landed within RESUME_SETTLE_MS, is surfaced once as a context error.
    fn poll_context(&mut self, dt: Duration) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        let (context, rejected) = match backend.poll_context() {
            Ok(state) => (state, None),
            Err(e) => (backend.context_state(), Some(e)),
        };
        if context != self.state.context_state {
            log::info!(
                "[audio] context {:?} -> {:?}",
                self.state.context_state,
                context
            );
            self.state.context_state = context;
            self.notify_state();
        }

        let failure = match (rejected, self.resume_wait.as_mut()) {
            (Some(e), _) => Some(e),
            (None, Some(waited)) if context == ContextState::Suspended => {
                *waited += dt;
                (*waited >= Duration::from_millis(RESUME_SETTLE_MS))
                    .then(|| BackendError::Resume("context still suspended".into()))
            }
            _ => None,
        };
        if failure.is_some() || context != ContextState::Suspended {
            self.resume_wait = None;
        }
        if let Some(e) = failure {
            self.surface(e.into_audio_error());
        }
    }

    // Lazily create one synth per planet; a planet whose synth fails is
    // skipped for the life of this backend.
    fn ensure_voices(&mut self) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        for planet in self.catalogue.planets() {
            let id = planet.id();
            if self.voices.contains_key(id) || self.failed_voices.contains(id) {
                continue;
            }
            let ps = self
                .planet_states
                .entry(id.to_string())
                .or_insert_with(|| PlanetAudioState::new(planet.frequency_hz(), planet.is_muted()));
            match backend.create_voice(id, &planet.voice_params(), ps.effective_gain()) {
                Ok(voice) => {
                    self.voices.insert(id.to_string(), voice);
                }
                Err(e) => {
                    log::warn!("[audio] skipping {}: {e}", planet.name());
                    self.failed_voices.insert(id.to_string());
                }
            }
        }
    }

    fn master_gain(&self) -> f32 {
        if self.settings.global_mute {
            0.0
        } else {
            self.settings.volume
        }
    }

    fn apply_master_gain(&mut self) {
        let gain = self.master_gain();
        if let Some(backend) = self.backend.as_mut() {
            backend.set_master_gain(gain);
        }
    }

    fn surface(&mut self, err: AudioError) {
        log::error!("[audio] {err}");
        self.state.has_error = true;
        self.state.error = Some(err.clone());
        self.error_listeners.notify(&err);
        self.notify_state();
    }

    fn notify_state(&mut self) {
        self.state_listeners.notify(&self.state);
    }

    fn notify_settings(&mut self) {
        self.settings_listeners.notify(&self.settings);
    }

    // ---------------- Subscriptions ----------------

    pub fn on_state_change(&mut self, cb: impl FnMut(&AudioState) + 'static) -> ListenerToken {
        self.state_listeners.add(cb)
    }

    pub fn off_state_change(&mut self, token: ListenerToken) -> bool {
        self.state_listeners.remove(token)
    }

    pub fn on_settings_change(
        &mut self,
        cb: impl FnMut(&AudioSettings) + 'static,
    ) -> ListenerToken {
        self.settings_listeners.add(cb)
    }

    pub fn off_settings_change(&mut self, token: ListenerToken) -> bool {
        self.settings_listeners.remove(token)
    }

    pub fn on_error(&mut self, cb: impl FnMut(&AudioError) + 'static) -> ListenerToken {
        self.error_listeners.add(cb)
    }

    pub fn off_error(&mut self, token: ListenerToken) -> bool {
        self.error_listeners.remove(token)
    }

    // ---------------- Accessors ----------------

    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    pub fn state(&self) -> &AudioState {
        &self.state
    }

    pub fn is_playing(&self) -> bool {
        self.settings.is_playing
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn planets(&self) -> &[Planet] {
        self.catalogue.planets()
    }

    pub fn planet_state(&self, id: &str) -> Option<&PlanetAudioState> {
        self.planet_states.get(id)
    }

    pub fn has_voice(&self, id: &str) -> bool {
        self.voices.contains_key(id)
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn listener_count(&self) -> usize {
        self.state_listeners.len() + self.settings_listeners.len() + self.error_listeners.len()
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.release_backend();
    }
}
