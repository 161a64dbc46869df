// ---------------- WebAudio backend ----------------
//
// Graph: per tone `osc -> env -> trem -> voice gain -> panner -> master ->
// destination`, with an LFO driving the tremolo gain. The engine owns all
// timing; tones are one-shot nodes scheduled on the context clock.

use orrery_core::{
    AudioBackend, AudioDriver, BackendError, Capability, ContextState, Tone, VoiceHandle,
    VoiceParams,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

const TREMOLO_DEPTH: f32 = 0.3;
const SILENCE_FADE_SEC: f64 = 0.02;
const STEREO_SPREAD: f32 = 0.7;
/// Lead time so the first envelope point is never in the past.
const SCHEDULE_AHEAD_SEC: f64 = 0.01;

struct Sounding {
    osc: web::OscillatorNode,
    lfo: web::OscillatorNode,
    env: web::GainNode,
    ends_at: f64,
}

struct Voice {
    gain: web::GainNode,
    panner: web::StereoPannerNode,
    sounding: Vec<Sounding>,
}

pub struct WebAudioBackend {
    ctx: web::AudioContext,
    master: web::GainNode,
    voices: Vec<Option<Voice>>,
    closed: bool,
    /// Set by the resume future when the browser rejects it.
    resume_rejection: Rc<RefCell<Option<String>>>,
}

fn synth_err(e: JsValue) -> BackendError {
    BackendError::Synth(format!("{e:?}"))
}

fn trigger_err(e: JsValue) -> BackendError {
    BackendError::Trigger(format!("{e:?}"))
}

impl WebAudioBackend {
    pub fn new() -> Result<Self, JsValue> {
        let ctx = web::AudioContext::new()?;
        let master = web::GainNode::new(&ctx)?;
        master.gain().set_value(0.0);
        master.connect_with_audio_node(&ctx.destination())?;
        log::info!(
            "[audio] AudioContext @ {} Hz, state {:?}",
            ctx.sample_rate(),
            ctx.state()
        );
        Ok(Self {
            ctx,
            master,
            voices: Vec::new(),
            closed: false,
            resume_rejection: Rc::default(),
        })
    }

    fn voice_mut(&mut self, voice: VoiceHandle) -> Option<&mut Voice> {
        self.voices.get_mut(voice.0 as usize)?.as_mut()
    }

    fn start_tone(&self, voice: &Voice, tone: &Tone) -> Result<Sounding, JsValue> {
        let t0 = self.ctx.current_time() + tone.delay_sec.max(0.0) + SCHEDULE_AHEAD_SEC;
        let peak = tone.velocity.clamp(0.0, 1.0);
        let sustain_end = t0 + tone.attack_sec + tone.sustain_sec;
        let end = sustain_end + tone.release_sec;

        let osc = web::OscillatorNode::new(&self.ctx)?;
        osc.set_type(web::OscillatorType::Sine);
        osc.frequency().set_value(tone.frequency_hz as f32);

        let env = web::GainNode::new(&self.ctx)?;
        let g = env.gain();
        g.set_value(0.0);
        g.set_value_at_time(0.0, t0)?;
        g.linear_ramp_to_value_at_time(peak, t0 + tone.attack_sec)?;
        g.set_value_at_time(peak, sustain_end)?;
        g.linear_ramp_to_value_at_time(0.0, end)?;

        // trem gain swings around 1 - depth/2 by +-depth/2
        let trem = web::GainNode::new(&self.ctx)?;
        trem.gain().set_value(1.0 - TREMOLO_DEPTH * 0.5);
        let lfo = web::OscillatorNode::new(&self.ctx)?;
        lfo.frequency().set_value(tone.tremolo_hz as f32);
        let depth = web::GainNode::new(&self.ctx)?;
        depth.gain().set_value(TREMOLO_DEPTH * 0.5);
        lfo.connect_with_audio_node(&depth)?;
        depth.connect_with_audio_param(&trem.gain())?;

        osc.connect_with_audio_node(&env)?;
        env.connect_with_audio_node(&trem)?;
        trem.connect_with_audio_node(&voice.gain)?;

        osc.start_with_when(t0)?;
        lfo.start_with_when(t0)?;
        osc.stop_with_when(end + 0.02)?;
        lfo.stop_with_when(end + 0.02)?;
        Ok(Sounding {
            osc,
            lfo,
            env,
            ends_at: end + 0.02,
        })
    }

    fn fade_out(&self, sounding: &Sounding) {
        let now = self.ctx.current_time();
        let g = sounding.env.gain();
        let _ = g.cancel_scheduled_values(now);
        let _ = g.set_value_at_time(g.value(), now);
        let _ = g.linear_ramp_to_value_at_time(0.0, now + SILENCE_FADE_SEC);
        let stop_at = now + SILENCE_FADE_SEC + 0.01;
        let _ = sounding.osc.stop_with_when(stop_at);
        let _ = sounding.lfo.stop_with_when(stop_at);
    }
}

impl AudioBackend for WebAudioBackend {
    fn context_state(&self) -> ContextState {
        if self.closed {
            return ContextState::Closed;
        }
        match self.ctx.state() {
            web::AudioContextState::Suspended => ContextState::Suspended,
            web::AudioContextState::Running => ContextState::Running,
            web::AudioContextState::Closed => ContextState::Closed,
            _ => ContextState::None,
        }
    }

    fn resume(&mut self) -> Result<(), BackendError> {
        if self.closed {
            return Err(BackendError::Resume("context closed".into()));
        }
        let promise: js_sys::Promise = self
            .ctx
            .resume()
            .map_err(|e| BackendError::Resume(format!("{e:?}")))?;
        let rejection = self.resume_rejection.clone();
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("[audio] resume rejected: {:?}", e);
                *rejection.borrow_mut() = Some(format!("{e:?}"));
            }
        });
        Ok(())
    }

    fn poll_context(&mut self) -> Result<ContextState, BackendError> {
        if let Some(reason) = self.resume_rejection.borrow_mut().take() {
            return Err(BackendError::Resume(reason));
        }
        Ok(self.context_state())
    }

    fn set_master_gain(&mut self, gain: f32) {
        self.master.gain().set_value(gain);
    }

    fn create_voice(
        &mut self,
        planet_id: &str,
        _params: &VoiceParams,
        gain: f32,
    ) -> Result<VoiceHandle, BackendError> {
        let index = self.voices.len();
        let voice_gain = web::GainNode::new(&self.ctx).map_err(synth_err)?;
        voice_gain.gain().set_value(gain);
        let panner = web::StereoPannerNode::new(&self.ctx).map_err(synth_err)?;
        panner
            .pan()
            .set_value(((index % 8) as f32 / 7.0 * 2.0 - 1.0) * STEREO_SPREAD);
        voice_gain
            .connect_with_audio_node(&panner)
            .map_err(synth_err)?;
        panner
            .connect_with_audio_node(&self.master)
            .map_err(synth_err)?;
        self.voices.push(Some(Voice {
            gain: voice_gain,
            panner,
            sounding: Vec::new(),
        }));
        log::debug!("[audio] voice {index} for {planet_id}");
        Ok(VoiceHandle(index as u32))
    }

    fn set_voice_gain(&mut self, voice: VoiceHandle, gain: f32) {
        if let Some(v) = self.voice_mut(voice) {
            v.gain.gain().set_value(gain);
        }
    }

    fn trigger(&mut self, voice: VoiceHandle, tone: &Tone) -> Result<(), BackendError> {
        let now = self.ctx.current_time();
        let index = voice.0 as usize;
        let Some(Some(v)) = self.voices.get(index) else {
            return Err(BackendError::Trigger(format!("unknown voice {index}")));
        };
        let sounding = self.start_tone(v, tone).map_err(trigger_err)?;
        if let Some(v) = self.voice_mut(voice) {
            v.sounding.retain(|s| s.ends_at > now);
            v.sounding.push(sounding);
        }
        Ok(())
    }

    fn silence(&mut self, voice: VoiceHandle) {
        let Some(Some(v)) = self.voices.get(voice.0 as usize) else {
            return;
        };
        for s in &v.sounding {
            self.fade_out(s);
        }
        if let Some(v) = self.voice_mut(voice) {
            v.sounding.clear();
        }
    }

    fn release_voice(&mut self, voice: VoiceHandle) {
        self.silence(voice);
        if let Some(slot) = self.voices.get_mut(voice.0 as usize) {
            if let Some(v) = slot.take() {
                let _ = v.gain.disconnect();
                let _ = v.panner.disconnect();
            }
        }
    }

    fn close(&mut self) {
        for i in 0..self.voices.len() {
            self.release_voice(VoiceHandle(i as u32));
        }
        self.voices.clear();
        let _ = self.master.disconnect();
        self.closed = true;
        match self.ctx.close() {
            Ok(promise) => spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    log::warn!("[audio] close rejected: {:?}", e);
                }
            }),
            Err(e) => log::warn!("[audio] close failed: {:?}", e),
        }
    }
}

/// Creates a fresh AudioContext on each probe; must be probed from a user
/// gesture for the context to start running.
#[derive(Default)]
pub struct WebAudioDriver;

impl AudioDriver for WebAudioDriver {
    fn probe(&mut self) -> Capability {
        match WebAudioBackend::new() {
            Ok(backend) => Capability::Available(Box::new(backend)),
            Err(e) => Capability::Unavailable(format!("Web Audio unavailable: {e:?}")),
        }
    }
}
