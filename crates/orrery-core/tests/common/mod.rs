// Shared test doubles: a backend that records every call into a shared log,
// and drivers that hand it out (optionally after a number of failed probes).

#![allow(dead_code)]

use orrery_core::*;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct Log {
    pub probes: u32,
    pub resumes: u32,
    pub polls: u32,
    pub created: Vec<String>,
    pub released: usize,
    pub closed: u32,
    pub master_gain: f32,
    pub voice_gains: HashMap<String, f32>,
    /// Planet id per triggered tone, in order.
    pub triggers: Vec<String>,
    pub silenced: Vec<String>,
}

impl Log {
    pub fn triggers_of(&self, id: &str) -> usize {
        self.triggers.iter().filter(|t| t.as_str() == id).count()
    }
}

pub type SharedLog = Rc<RefCell<Log>>;

#[derive(Clone, Debug, Default)]
pub struct Faults {
    /// Planets whose synth cannot be created.
    pub bad_voices: Vec<String>,
    /// Every trigger fails with a playback error.
    pub trigger_fails: bool,
    /// Start out suspended; resume fails this many times first.
    pub suspended: bool,
    pub resume_failures: u32,
    /// Resume returns at once and settles later, as WebAudio does.
    pub deferred_resume: Option<Deferred>,
}

/// How a deferred resume settles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deferred {
    /// Running after this many further polls.
    RunsAfterPolls(u32),
    /// The next poll reports a rejection; the context stays suspended.
    Rejects,
    /// Never settles.
    Hangs,
}

pub struct MockBackend {
    log: SharedLog,
    faults: Faults,
    context: ContextState,
    pending: Option<Deferred>,
    voices: Vec<String>,
}

impl MockBackend {
    pub fn new(log: SharedLog, faults: Faults) -> Self {
        let context = if faults.suspended {
            ContextState::Suspended
        } else {
            ContextState::Running
        };
        Self {
            log,
            faults,
            context,
            pending: None,
            voices: Vec::new(),
        }
    }

    fn id_of(&self, voice: VoiceHandle) -> String {
        self.voices[voice.0 as usize].clone()
    }
}

impl AudioBackend for MockBackend {
    fn context_state(&self) -> ContextState {
        self.context
    }

    fn resume(&mut self) -> Result<(), BackendError> {
        self.log.borrow_mut().resumes += 1;
        if self.faults.resume_failures > 0 {
            self.faults.resume_failures -= 1;
            return Err(BackendError::Resume("still suspended".into()));
        }
        if let Some(deferred) = self.faults.deferred_resume {
            self.pending = Some(deferred);
            return Ok(());
        }
        self.context = ContextState::Running;
        Ok(())
    }

    fn poll_context(&mut self) -> Result<ContextState, BackendError> {
        self.log.borrow_mut().polls += 1;
        match self.pending.take() {
            Some(Deferred::RunsAfterPolls(0)) => self.context = ContextState::Running,
            Some(Deferred::RunsAfterPolls(n)) => {
                self.pending = Some(Deferred::RunsAfterPolls(n - 1));
            }
            Some(Deferred::Rejects) => {
                return Err(BackendError::Resume("resume rejected".into()));
            }
            Some(Deferred::Hangs) => self.pending = Some(Deferred::Hangs),
            None => {}
        }
        Ok(self.context)
    }

    fn set_master_gain(&mut self, gain: f32) {
        self.log.borrow_mut().master_gain = gain;
    }

    fn create_voice(
        &mut self,
        planet_id: &str,
        _params: &VoiceParams,
        gain: f32,
    ) -> Result<VoiceHandle, BackendError> {
        if self.faults.bad_voices.iter().any(|b| b == planet_id) {
            return Err(BackendError::Synth(format!("no synth for {planet_id}")));
        }
        let mut log = self.log.borrow_mut();
        log.created.push(planet_id.to_string());
        log.voice_gains.insert(planet_id.to_string(), gain);
        self.voices.push(planet_id.to_string());
        Ok(VoiceHandle(self.voices.len() as u32 - 1))
    }

    fn set_voice_gain(&mut self, voice: VoiceHandle, gain: f32) {
        let id = self.id_of(voice);
        self.log.borrow_mut().voice_gains.insert(id, gain);
    }

    fn trigger(&mut self, voice: VoiceHandle, _tone: &Tone) -> Result<(), BackendError> {
        if self.faults.trigger_fails {
            return Err(BackendError::Trigger("oscillator refused to start".into()));
        }
        let id = self.id_of(voice);
        self.log.borrow_mut().triggers.push(id);
        Ok(())
    }

    fn silence(&mut self, voice: VoiceHandle) {
        let id = self.id_of(voice);
        self.log.borrow_mut().silenced.push(id);
    }

    fn release_voice(&mut self, _voice: VoiceHandle) {
        self.log.borrow_mut().released += 1;
    }

    fn close(&mut self) {
        self.context = ContextState::Closed;
        self.log.borrow_mut().closed += 1;
    }
}

/// Driver that fails `failures` probes, then hands out a mock backend.
pub fn mock_driver(log: SharedLog, faults: Faults, failures: u32) -> impl FnMut() -> Capability {
    let mut remaining = failures;
    move || {
        log.borrow_mut().probes += 1;
        if remaining > 0 {
            remaining -= 1;
            return Capability::Unavailable("device busy".into());
        }
        Capability::Available(Box::new(MockBackend::new(log.clone(), faults.clone())))
    }
}

pub fn mock_engine() -> (AudioEngine, SharedLog) {
    mock_engine_with(Faults::default())
}

pub fn mock_engine_with(faults: Faults) -> (AudioEngine, SharedLog) {
    let log = SharedLog::default();
    let engine = AudioEngine::new(
        Catalogue::solar_system(),
        mock_driver(log.clone(), faults, 0),
    );
    (engine, log)
}

/// Tick the engine in 50 ms steps for `secs` seconds.
pub fn run_for(engine: &mut AudioEngine, secs: f64) {
    let steps = (secs / 0.05).round() as usize;
    for _ in 0..steps {
        engine.tick(std::time::Duration::from_millis(50));
    }
}
