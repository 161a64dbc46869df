//! Sonification mapping: planet physical data to audio parameters.
//!
//! Everything here is a pure function of static planet data and the global
//! tempo/time multiplier, so results are stable and can be used as fixtures.
//!
//! Pitch uses an inverse power law: `d^-0.5` normalised between the nearest
//! and farthest pinned distances and spread over 200–800 Hz. Closer planets
//! are higher, the curve is continuous and strictly decreasing inside the
//! band, and distances outside the pins clamp to the band edges.

use crate::constants::*;

/// Pentatonic note names used for planet note labels.
pub const PENTATONIC_NOTES: &[&str] = &["C", "D", "E", "G", "A"];

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Round to two decimal places.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Map a mean orbital distance (AU) to a tone frequency in Hz.
pub fn distance_to_frequency(distance_au: f64) -> f64 {
    let d = distance_au.clamp(NEAREST_DISTANCE_AU, FARTHEST_DISTANCE_AU);
    let near = NEAREST_DISTANCE_AU.powf(-FREQ_POWER);
    let far = FARTHEST_DISTANCE_AU.powf(-FREQ_POWER);
    let t = (d.powf(-FREQ_POWER) - far) / (near - far);
    round2(FREQ_MIN_HZ + (FREQ_MAX_HZ - FREQ_MIN_HZ) * t)
}

/// Simplified orbital velocity proxy, `1/sqrt(distance)`.
#[inline]
pub fn orbital_velocity(distance_au: f64) -> f64 {
    1.0 / distance_au.sqrt()
}

/// Envelope attack: faster movers get snappier attacks.
pub fn attack_time(distance_au: f64) -> f64 {
    (ATTACK_SCALE_SEC / orbital_velocity(distance_au)).max(ATTACK_FLOOR_SEC)
}

/// Envelope release: outer planets ring longer.
pub fn release_time(distance_au: f64) -> f64 {
    (RELEASE_BASE_SEC + RELEASE_SCALE_SEC * distance_au.sqrt()).max(RELEASE_FLOOR_SEC)
}

/// Amplitude tremolo rate, inversely proportional to the orbital period.
pub fn tremolo_rate(orbital_period_days: f64) -> f64 {
    let years = orbital_period_days / DAYS_PER_YEAR;
    (TREMOLO_PER_YEAR_HZ / years).clamp(TREMOLO_MIN_HZ, TREMOLO_MAX_HZ)
}

/// Seconds between two tones of the planet at `ordinal` (0 = closest).
///
/// The ordinal stands in for the literal period so that every planet stays
/// audible on human timescales.
pub fn schedule_interval(ordinal: usize, tempo_bpm: f64) -> f64 {
    let tempo = clamp_tempo(tempo_bpm);
    (ordinal as f64 + 1.0) * BASE_INTERVAL_SEC / (tempo / REFERENCE_BPM)
}

/// Rate factor the time multiplier applies to schedules: 1.0 at 1x, 2.0 at 10000x.
pub fn time_multiplier_rate(time_multiplier: f64) -> f64 {
    1.0 + clamp_time_multiplier(time_multiplier).log10() / 4.0
}

/// Interval actually used by the transport.
pub fn effective_interval(ordinal: usize, tempo_bpm: f64, time_multiplier: f64) -> f64 {
    schedule_interval(ordinal, tempo_bpm) / time_multiplier_rate(time_multiplier)
}

#[inline]
pub fn clamp_tempo(bpm: f64) -> f64 {
    if bpm.is_nan() {
        return DEFAULT_TEMPO_BPM;
    }
    bpm.clamp(TEMPO_MIN_BPM, TEMPO_MAX_BPM)
}

#[inline]
pub fn clamp_time_multiplier(m: f64) -> f64 {
    if m.is_nan() {
        return TIME_MULTIPLIER_MIN;
    }
    m.clamp(TIME_MULTIPLIER_MIN, TIME_MULTIPLIER_MAX)
}

#[inline]
pub fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 1.0)
}

/// UI speed (0.1–10) to engine time multiplier (1–10000).
pub fn speed_to_time_multiplier(ui_speed: f64) -> f64 {
    clamp_time_multiplier(ui_speed * UI_SPEED_TO_TIME_MULTIPLIER)
}

/// Convert a MIDI note number to Hertz (A4=440 Hz).
pub fn midi_to_hz(midi: f64) -> f64 {
    440.0 * 2.0_f64.powf((midi - 69.0) / 12.0)
}

/// Inverse of [`midi_to_hz`]; fractional for off-grid pitches.
pub fn hz_to_midi(hz: f64) -> f64 {
    69.0 + 12.0 * (hz / 440.0).log2()
}

/// Label (e.g. `"G5"`) of the scale note nearest to `hz`.
///
/// `scale` holds note names; unknown names are ignored and an empty or
/// fully unknown scale falls back to the chromatic name. Pitches outside
/// the MIDI range (including zero, negative and NaN input) pin to its ends.
pub fn nearest_scale_note(hz: f64, scale: &[&str]) -> String {
    let midi = hz_to_midi(hz);
    let midi = if midi.is_nan() { 0.0 } else { midi.clamp(0.0, 127.0) };
    let classes: Vec<usize> = scale
        .iter()
        .filter_map(|n| NOTE_NAMES.iter().position(|c| c == n))
        .collect();
    let center = midi.round() as i32;
    let best = (center - 6..=center + 6)
        .filter(|m| classes.is_empty() || classes.contains(&(m.rem_euclid(12) as usize)))
        .min_by(|a, b| {
            let da = (*a as f64 - midi).abs();
            let db = (*b as f64 - midi).abs();
            da.total_cmp(&db)
        })
        .unwrap_or(center);
    let octave = best.div_euclid(12) - 1;
    format!("{}{}", NOTE_NAMES[best.rem_euclid(12) as usize], octave)
}

/// Envelope and modulation for one planet's synthesizer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceParams {
    pub frequency_hz: f64,
    pub attack_sec: f64,
    pub release_sec: f64,
    pub tremolo_hz: f64,
}

impl VoiceParams {
    pub fn derive(distance_au: f64, orbital_period_days: f64) -> Self {
        Self {
            frequency_hz: distance_to_frequency(distance_au),
            attack_sec: attack_time(distance_au),
            release_sec: release_time(distance_au),
            tremolo_hz: tremolo_rate(orbital_period_days),
        }
    }

    /// Nominal length of one tone, attack to end of release.
    pub fn tone_length(&self) -> f64 {
        self.attack_sec + TONE_SUSTAIN_SEC + self.release_sec
    }
}
