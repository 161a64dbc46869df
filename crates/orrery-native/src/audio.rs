// ---------------- Native audio (cpal) ----------------
//
// The engine owns scheduling; this backend only renders the tones it is
// told to trigger. The cpal callback thread and the UI thread share the
// mixer behind a mutex.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use orrery_core::{
    AudioBackend, AudioDriver, BackendError, Capability, ContextState, Tone, VoiceHandle,
    VoiceParams,
};
use std::f32::consts::TAU;
use std::sync::{Arc, Mutex};

/// Peak-to-trough depth of the amplitude tremolo.
const TREMOLO_DEPTH: f32 = 0.3;
/// Fade applied when a voice is cut off, to avoid clicks.
const SILENCE_FADE_SEC: f32 = 0.02;
/// Width of the stereo spread across the planets, 0 (mono) to 1.
const STEREO_SPREAD: f32 = 0.7;

#[derive(Clone, Copy)]
struct VoiceSlot {
    gain: f32,
    left_gain: f32,
    right_gain: f32,
}

#[derive(Clone)]
struct ActiveTone {
    voice: usize,
    amplitude: f32,
    phase: f32,     // radians
    phase_inc: f32, // radians per sample
    trem_phase: f32,
    trem_inc: f32,
    delay_samples: u32,
    total_samples: u32,
    samples_emitted: u32,
    attack_samples: u32,
    release_samples: u32,
    // (remaining, total) samples of a cut-off fade
    fade: Option<(u32, u32)>,
}

struct Mixer {
    sample_rate: f32,
    master_gain: f32,
    voices: Vec<Option<VoiceSlot>>,
    tones: Vec<ActiveTone>,
}

impl Mixer {
    fn envelope(tone: &ActiveTone) -> f32 {
        let n = tone.samples_emitted;
        let release_start = tone.total_samples.saturating_sub(tone.release_samples);
        let env = if n < tone.attack_samples {
            n as f32 / tone.attack_samples.max(1) as f32
        } else if n > release_start {
            1.0 - (n - release_start) as f32 / tone.release_samples.max(1) as f32
        } else {
            1.0
        };
        match tone.fade {
            Some((left, total)) => env * left as f32 / total.max(1) as f32,
            None => env,
        }
    }

    fn mix_sample_stereo(&mut self) -> (f32, f32) {
        let mut left = 0.0f32;
        let mut right = 0.0f32;
        let mut i = 0usize;
        while i < self.tones.len() {
            let tone = &mut self.tones[i];
            if tone.delay_samples > 0 {
                tone.delay_samples -= 1;
                i += 1;
                continue;
            }
            let Some(slot) = self.voices.get(tone.voice).copied().flatten() else {
                self.tones.swap_remove(i);
                continue;
            };
            let tremolo = 1.0 - TREMOLO_DEPTH * (0.5 - 0.5 * tone.trem_phase.cos());
            let amp = tone.amplitude * Self::envelope(tone) * tremolo * slot.gain;
            let raw = tone.phase.sin() * amp;
            left += raw * slot.left_gain;
            right += raw * slot.right_gain;

            tone.phase = (tone.phase + tone.phase_inc) % TAU;
            tone.trem_phase = (tone.trem_phase + tone.trem_inc) % TAU;
            tone.samples_emitted += 1;
            let faded = match tone.fade.as_mut() {
                Some((remaining, _)) => {
                    *remaining = remaining.saturating_sub(1);
                    *remaining == 0
                }
                None => false,
            };
            if faded || tone.samples_emitted >= tone.total_samples {
                self.tones.swap_remove(i);
                continue;
            }
            i += 1;
        }
        let g = self.master_gain;
        ((left * g).tanh(), (right * g).tanh())
    }
}

pub struct CpalBackend {
    stream: Option<cpal::Stream>,
    playing: bool,
    mixer: Arc<Mutex<Mixer>>,
}

impl CpalBackend {
    fn with_mixer(&self, f: impl FnOnce(&mut Mixer)) {
        match self.mixer.lock() {
            Ok(mut guard) => f(&mut guard),
            Err(_) => log::error!("[audio] mixer lock poisoned"),
        }
    }
}

impl AudioBackend for CpalBackend {
    fn context_state(&self) -> ContextState {
        match (&self.stream, self.playing) {
            (None, _) => ContextState::Closed,
            (Some(_), true) => ContextState::Running,
            (Some(_), false) => ContextState::Suspended,
        }
    }

    fn resume(&mut self) -> Result<(), BackendError> {
        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| BackendError::Resume("stream closed".into()))?;
        stream
            .play()
            .map_err(|e| BackendError::Resume(e.to_string()))?;
        self.playing = true;
        Ok(())
    }

    fn set_master_gain(&mut self, gain: f32) {
        self.with_mixer(|m| m.master_gain = gain);
    }

    fn create_voice(
        &mut self,
        planet_id: &str,
        _params: &VoiceParams,
        gain: f32,
    ) -> Result<VoiceHandle, BackendError> {
        let mut guard = self
            .mixer
            .lock()
            .map_err(|_| BackendError::Synth(format!("mixer unavailable for {planet_id}")))?;
        // voices arrive in distance order; fan them out left to right
        let index = guard.voices.len();
        let pan = ((index % 8) as f32 / 7.0 * 2.0 - 1.0) * STEREO_SPREAD;
        let angle = (pan + 1.0) * std::f32::consts::FRAC_PI_4;
        guard.voices.push(Some(VoiceSlot {
            gain,
            left_gain: angle.cos(),
            right_gain: angle.sin(),
        }));
        log::debug!("[audio] voice {index} for {planet_id}");
        Ok(VoiceHandle(index as u32))
    }

    fn set_voice_gain(&mut self, voice: VoiceHandle, gain: f32) {
        self.with_mixer(|m| {
            if let Some(Some(slot)) = m.voices.get_mut(voice.0 as usize) {
                slot.gain = gain;
            }
        });
    }

    fn trigger(&mut self, voice: VoiceHandle, tone: &Tone) -> Result<(), BackendError> {
        let mut guard = self
            .mixer
            .lock()
            .map_err(|_| BackendError::Trigger("mixer lock poisoned".into()))?;
        let index = voice.0 as usize;
        if !matches!(guard.voices.get(index), Some(Some(_))) {
            return Err(BackendError::Trigger(format!("unknown voice {index}")));
        }
        let sr = guard.sample_rate;
        let total = (tone.duration_sec() as f32 * sr) as u32;
        guard.tones.push(ActiveTone {
            voice: index,
            amplitude: tone.velocity.min(1.0),
            phase: 0.0,
            phase_inc: TAU * tone.frequency_hz as f32 / sr,
            trem_phase: 0.0,
            trem_inc: TAU * tone.tremolo_hz as f32 / sr,
            delay_samples: (tone.delay_sec.max(0.0) as f32 * sr) as u32,
            total_samples: total.max(1),
            samples_emitted: 0,
            attack_samples: ((tone.attack_sec as f32 * sr) as u32).min(total),
            release_samples: ((tone.release_sec as f32 * sr) as u32).min(total),
            fade: None,
        });
        Ok(())
    }

    fn silence(&mut self, voice: VoiceHandle) {
        self.with_mixer(|m| {
            let fade = ((SILENCE_FADE_SEC * m.sample_rate) as u32).max(1);
            for tone in m.tones.iter_mut().filter(|t| t.voice == voice.0 as usize) {
                tone.fade.get_or_insert((fade, fade));
            }
        });
    }

    fn release_voice(&mut self, voice: VoiceHandle) {
        self.with_mixer(|m| {
            if let Some(slot) = m.voices.get_mut(voice.0 as usize) {
                *slot = None;
            }
        });
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                log::warn!("[audio] pause on close failed: {e}");
            }
        }
        self.playing = false;
        self.with_mixer(|m| {
            m.tones.clear();
            m.voices.clear();
        });
    }
}

/// Opens the default output device on each probe.
#[derive(Default)]
pub struct CpalDriver;

impl AudioDriver for CpalDriver {
    fn probe(&mut self) -> Capability {
        match open_output() {
            Ok(backend) => Capability::Available(Box::new(backend)),
            Err(reason) => Capability::Unavailable(reason),
        }
    }
}

fn open_output() -> Result<CpalBackend, String> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| "no output device".to_string())?;
    let config = device.default_output_config().map_err(|e| e.to_string())?;
    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;
    log::info!(
        "[audio] output {} @ {} Hz, {} ch, {:?}",
        device.name().unwrap_or_else(|_| "unknown".into()),
        sample_rate,
        channels,
        config.sample_format()
    );

    let mixer = Arc::new(Mutex::new(Mixer {
        sample_rate,
        master_gain: 0.0,
        voices: Vec::new(),
        tones: Vec::new(),
    }));

    let stream_config: cpal::StreamConfig = config.clone().into();
    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => {
            build_stream::<f32>(&device, &stream_config, channels, Arc::clone(&mixer))
        }
        cpal::SampleFormat::I16 => {
            build_stream::<i16>(&device, &stream_config, channels, Arc::clone(&mixer))
        }
        cpal::SampleFormat::U16 => {
            build_stream::<u16>(&device, &stream_config, channels, Arc::clone(&mixer))
        }
        other => return Err(format!("unsupported sample format {other:?}")),
    }
    .map_err(|e| e.to_string())?;

    stream.play().map_err(|e| e.to_string())?;
    Ok(CpalBackend {
        stream: Some(stream),
        playing: true,
        mixer,
    })
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    mixer: Arc<Mutex<Mixer>>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    let err_fn = |err: cpal::StreamError| log::error!("[audio] stream error: {err}");
    device.build_output_stream(
        config,
        move |data: &mut [T], _| {
            let Ok(mut guard) = mixer.lock() else {
                data.fill(T::EQUILIBRIUM);
                return;
            };
            for frame in data.chunks_mut(channels.max(1)) {
                let (l, r) = guard.mix_sample_stereo();
                match frame {
                    [mono] => *mono = T::from_sample(0.5 * (l + r)),
                    [left, right, rest @ ..] => {
                        *left = T::from_sample(l);
                        *right = T::from_sample(r);
                        rest.fill(T::EQUILIBRIUM);
                    }
                    [] => {}
                }
            }
        },
        err_fn,
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixer() -> Mixer {
        Mixer {
            sample_rate: 1000.0,
            master_gain: 1.0,
            voices: vec![Some(VoiceSlot {
                gain: 1.0,
                left_gain: 1.0,
                right_gain: 1.0,
            })],
            tones: Vec::new(),
        }
    }

    fn tone(total: u32) -> ActiveTone {
        ActiveTone {
            voice: 0,
            amplitude: 1.0,
            phase: 0.0,
            phase_inc: 0.3,
            trem_phase: 0.0,
            trem_inc: 0.0,
            delay_samples: 0,
            total_samples: total,
            samples_emitted: 0,
            attack_samples: 10,
            release_samples: 10,
            fade: None,
        }
    }

    #[test]
    fn tones_end_after_their_length() {
        let mut m = mixer();
        m.tones.push(tone(100));
        for _ in 0..100 {
            m.mix_sample_stereo();
        }
        assert!(m.tones.is_empty());
    }

    #[test]
    fn delayed_tones_wait() {
        let mut m = mixer();
        let mut t = tone(50);
        t.delay_samples = 20;
        m.tones.push(t);
        for _ in 0..20 {
            assert_eq!(m.mix_sample_stereo(), (0.0, 0.0));
        }
        assert_eq!(m.tones[0].samples_emitted, 0);
    }

    #[test]
    fn released_voice_drops_its_tones() {
        let mut m = mixer();
        m.tones.push(tone(100));
        m.voices[0] = None;
        m.mix_sample_stereo();
        assert!(m.tones.is_empty());
    }

    #[test]
    fn silenced_tones_fade_out_quickly() {
        let mut m = mixer();
        m.tones.push(tone(10_000));
        m.tones[0].fade = Some((20, 20));
        for _ in 0..20 {
            m.mix_sample_stereo();
        }
        assert!(m.tones.is_empty());
    }

    #[test]
    fn master_gain_zero_is_silent() {
        let mut m = mixer();
        m.master_gain = 0.0;
        m.tones.push(tone(100));
        for _ in 0..50 {
            assert_eq!(m.mix_sample_stereo(), (0.0, 0.0));
        }
    }
}
