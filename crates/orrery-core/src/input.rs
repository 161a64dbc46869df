//! Keyboard shortcuts shared by the front-ends.
//!
//! Keys are named the way `KeyboardEvent.key` reports them (" ", "ArrowUp",
//! "m", "1"); the native shell converts winit keys to the same names.

use crate::app::{Orrery, SwipeDirection};
use instant::Instant;

pub const TEMPO_STEP_BPM: f64 = 5.0;
pub const VOLUME_STEP: f32 = 0.1;
pub const ZOOM_STEP: f32 = 1.25;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    TogglePlay,
    SpeedUp,
    SpeedDown,
    TempoUp,
    TempoDown,
    VolumeUp,
    VolumeDown,
    ToggleGlobalMute,
    /// Toggle the mute of the planet at this ordinal (0 = closest).
    TogglePlanetMute(usize),
    ZoomIn,
    ZoomOut,
    RetryAudio,
}

pub fn command_for_key(key: &str) -> Option<Command> {
    let cmd = match key {
        " " => Command::TogglePlay,
        "+" | "=" | "ArrowRight" => Command::SpeedUp,
        "-" | "_" | "ArrowLeft" => Command::SpeedDown,
        "ArrowUp" => Command::TempoUp,
        "ArrowDown" => Command::TempoDown,
        "]" => Command::VolumeUp,
        "[" => Command::VolumeDown,
        "m" | "M" => Command::ToggleGlobalMute,
        "z" => Command::ZoomIn,
        "Z" | "x" => Command::ZoomOut,
        "r" | "R" => Command::RetryAudio,
        _ => {
            let mut chars = key.chars();
            let digit = chars.next()?.to_digit(10)?;
            if chars.next().is_some() || !(1..=9).contains(&digit) {
                return None;
            }
            Command::TogglePlanetMute(digit as usize - 1)
        }
    };
    Some(cmd)
}

impl Orrery {
    /// Run a discrete command. Slider-style values apply immediately.
    pub fn apply(&mut self, cmd: Command, now: Instant) {
        match cmd {
            Command::TogglePlay => {
                self.toggle_play(now);
            }
            Command::SpeedUp => self.swipe(SwipeDirection::Right, now),
            Command::SpeedDown => self.swipe(SwipeDirection::Left, now),
            Command::TempoUp | Command::TempoDown => {
                let step = if cmd == Command::TempoUp {
                    TEMPO_STEP_BPM
                } else {
                    -TEMPO_STEP_BPM
                };
                let tempo = self.engine().settings().tempo + step;
                self.engine_mut().set_tempo(tempo);
            }
            Command::VolumeUp | Command::VolumeDown => {
                let step = if cmd == Command::VolumeUp {
                    VOLUME_STEP
                } else {
                    -VOLUME_STEP
                };
                let volume = self.engine().settings().volume + step;
                self.engine_mut().set_master_volume(volume);
            }
            Command::ToggleGlobalMute => {
                let muted = !self.engine().settings().global_mute;
                self.mute_global(muted);
            }
            Command::TogglePlanetMute(ordinal) => {
                let Some(planet) = self.planets().get(ordinal) else {
                    return;
                };
                let id = planet.id().to_string();
                let muted = !planet.is_muted();
                self.mute_planet(&id, muted);
            }
            Command::ZoomIn => self.pinch(ZOOM_STEP),
            Command::ZoomOut => self.pinch(1.0 / ZOOM_STEP),
            Command::RetryAudio => {
                if let Err(e) = self.retry_audio() {
                    log::warn!("[input] audio retry failed: {e}");
                }
            }
        }
    }
}
