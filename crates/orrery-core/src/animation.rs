//! Per-visualization animation loop state.
//!
//! The host calls [`AnimationDriver::frame`] from its frame callback and only
//! re-arms the callback while [`AnimationDriver::wants_frame`] is true, so
//! pausing cancels any further computation or publishing.
//!
//! Resuming restarts the elapsed-time origin at "now": planets jump back to
//! their anchored start phase rather than continuing from where they paused.
//! Speed changes mid-run carry the time already travelled, so the orbit does
//! not jump when the speed slider moves.

use crate::constants::UI_SPEED_MAX;
use crate::observers::{ListenerToken, Listeners};
use crate::orbit::{compute_positions, OrbitLayout, PhaseAnchor, PositionMap};
use crate::planets::Planet;
use instant::Instant;

pub struct AnimationDriver {
    anchor: PhaseAnchor,
    layout: OrbitLayout,
    speed: f64,
    is_playing: bool,
    origin: Option<Instant>,
    // simulated seconds at unit speed travelled before the current origin
    carried_secs: f64,
    positions: PositionMap,
    frames: u64,
    listeners: Listeners<PositionMap>,
}

impl AnimationDriver {
    pub fn new(anchor: PhaseAnchor, layout: OrbitLayout, speed: f64) -> Self {
        Self {
            anchor,
            layout,
            speed: clamp_speed(speed),
            is_playing: false,
            origin: None,
            carried_secs: 0.0,
            positions: PositionMap::default(),
            frames: 0,
            listeners: Listeners::new(),
        }
    }

    /// Start or stop the frame loop.
    pub fn set_playing(&mut self, playing: bool, now: Instant) {
        if playing == self.is_playing {
            return;
        }
        self.is_playing = playing;
        if playing {
            self.origin = Some(now);
            self.carried_secs = 0.0;
        } else {
            self.origin = None;
        }
        log::debug!("[anim] playing={playing}");
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Whether the host should schedule another frame callback.
    pub fn wants_frame(&self) -> bool {
        self.is_playing
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Set the speed multiplier (0 freezes motion).
    pub fn set_speed(&mut self, speed: f64, now: Instant) {
        let speed = clamp_speed(speed);
        if let Some(origin) = self.origin {
            self.carried_secs += secs_between(origin, now) * self.speed;
            self.origin = Some(now);
        }
        self.speed = speed;
    }

    pub fn layout(&self) -> &OrbitLayout {
        &self.layout
    }

    pub fn set_layout(&mut self, layout: OrbitLayout) {
        self.layout = layout;
    }

    pub fn anchor(&self) -> PhaseAnchor {
        self.anchor
    }

    /// Simulated seconds (at unit speed) since the loop was last started.
    pub fn elapsed_unit_secs(&self, now: Instant) -> f64 {
        let running = self
            .origin
            .map(|o| secs_between(o, now) * self.speed)
            .unwrap_or(0.0);
        self.carried_secs + running
    }

    /// Compute and publish positions for this frame. Returns `None` while
    /// paused, without touching the last published set.
    pub fn frame(&mut self, now: Instant, planets: &[Planet]) -> Option<&PositionMap> {
        if !self.is_playing {
            return None;
        }
        let elapsed = self.elapsed_unit_secs(now);
        compute_positions(
            planets,
            self.anchor,
            elapsed,
            1.0,
            &self.layout,
            &mut self.positions,
        );
        self.frames += 1;
        self.listeners.notify(&self.positions);
        Some(&self.positions)
    }

    /// Start-phase positions, for drawing before the first play.
    pub fn rest_positions(&mut self, planets: &[Planet]) -> &PositionMap {
        compute_positions(
            planets,
            self.anchor,
            0.0,
            1.0,
            &self.layout,
            &mut self.positions,
        );
        &self.positions
    }

    /// Last published positions.
    pub fn positions(&self) -> &PositionMap {
        &self.positions
    }

    pub fn frames_published(&self) -> u64 {
        self.frames
    }

    pub fn on_positions(&mut self, cb: impl FnMut(&PositionMap) + 'static) -> ListenerToken {
        self.listeners.add(cb)
    }

    pub fn off_positions(&mut self, token: ListenerToken) -> bool {
        self.listeners.remove(token)
    }
}

fn clamp_speed(speed: f64) -> f64 {
    if speed > 0.0 {
        speed.min(UI_SPEED_MAX)
    } else {
        0.0
    }
}

fn secs_between(from: Instant, to: Instant) -> f64 {
    if to > from {
        (to - from).as_secs_f64()
    } else {
        0.0
    }
}
