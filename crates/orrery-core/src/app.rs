//! Command surface the UI shell drives.
//!
//! [`Orrery`] owns the one audio engine, the animation driver and the scene
//! for a running app. Front-ends translate keys, sliders and gestures into
//! these calls and call [`Orrery::frame`] once per display frame.

use crate::animation::AnimationDriver;
use crate::audio::{AudioDriver, AudioEngine};
use crate::config::OrreryConfig;
use crate::constants::*;
use crate::debounce::Debouncer;
use crate::error::AudioError;
use crate::mapping::speed_to_time_multiplier;
use crate::orbit::{OrbitLayout, PhaseAnchor};
use crate::planets::{Catalogue, Planet};
use crate::scene::{Scene, Target};
use glam::Vec2;
use instant::Instant;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
}

pub struct Orrery {
    engine: AudioEngine,
    driver: AnimationDriver,
    scene: Scene,
    zoom: f32,
    volume: Debouncer<f32>,
    tempo: Debouncer<f64>,
    last_frame: Option<Instant>,
}

impl Orrery {
    pub fn new(
        config: &OrreryConfig,
        audio: impl AudioDriver + 'static,
        width: f32,
        height: f32,
    ) -> Self {
        Self::with_catalogue(config, Catalogue::solar_system(), audio, width, height)
    }

    pub fn with_catalogue(
        config: &OrreryConfig,
        catalogue: Catalogue,
        audio: impl AudioDriver + 'static,
        width: f32,
        height: f32,
    ) -> Self {
        let anchor = if config.date_anchored {
            PhaseAnchor::now()
        } else {
            PhaseAnchor::Zero
        };
        let layout = OrbitLayout::new(width, height, catalogue.len());
        let engine = AudioEngine::with_config(catalogue, audio, config);
        let mut driver = AnimationDriver::new(anchor, layout, clamp_ui_speed(config.speed));
        let mut scene = Scene::new(engine.planets(), layout, config.star_count, config.star_seed);
        scene.update(driver.rest_positions(engine.planets()), engine.planets());
        log::info!(
            "[app] orrery ready: {} planets, {}x{}",
            engine.planets().len(),
            width,
            height
        );
        Self {
            engine,
            driver,
            scene,
            zoom: 1.0,
            volume: Debouncer::new(config.debounce),
            tempo: Debouncer::new(config.debounce),
            last_frame: None,
        }
    }

    /// Start or pause both sound and motion. Returns the new playing state.
    pub fn toggle_play(&mut self, now: Instant) -> bool {
        self.flush_pending();
        if self.engine.is_playing() {
            self.engine.stop();
            self.driver.set_playing(false, now);
            self.last_frame = None;
        } else {
            if let Err(e) = self.engine.start() {
                log::warn!("[app] playing with degraded audio: {e}");
            }
            self.driver.set_playing(true, now);
            self.last_frame = Some(now);
        }
        self.engine.is_playing()
    }

    pub fn is_playing(&self) -> bool {
        self.engine.is_playing()
    }

    /// Master volume, applied after the debounce window.
    pub fn set_volume(&mut self, volume: f32, now: Instant) {
        self.volume.push(volume, now);
    }

    /// Tempo in BPM, applied after the debounce window.
    pub fn set_tempo(&mut self, bpm: u32, now: Instant) {
        self.tempo.push(bpm as f64, now);
    }

    /// Apply debounced slider values whose window has passed.
    pub fn pump(&mut self, now: Instant) {
        if let Some(v) = self.volume.poll(now) {
            self.engine.set_master_volume(v);
        }
        if let Some(bpm) = self.tempo.poll(now) {
            self.engine.set_tempo(bpm);
        }
    }

    fn flush_pending(&mut self) {
        if let Some(v) = self.volume.flush() {
            self.engine.set_master_volume(v);
        }
        if let Some(bpm) = self.tempo.flush() {
            self.engine.set_tempo(bpm);
        }
    }

    /// UI speed in [0.1, 10]; drives the orbit speed and the audio time
    /// multiplier together.
    pub fn set_speed(&mut self, speed: f64, now: Instant) {
        let speed = clamp_ui_speed(speed);
        self.driver.set_speed(speed, now);
        self.engine.set_time_multiplier(speed_to_time_multiplier(speed));
    }

    pub fn speed(&self) -> f64 {
        self.driver.speed()
    }

    pub fn mute_global(&mut self, muted: bool) {
        self.engine.set_global_mute(muted);
    }

    /// Returns false for an unknown planet id.
    pub fn mute_planet(&mut self, id: &str, muted: bool) -> bool {
        if !self.engine.set_planet_mute(id, muted) {
            return false;
        }
        self.scene.update(self.driver.positions(), self.engine.planets());
        true
    }

    pub fn set_planet_volume(&mut self, id: &str, volume: f32) -> bool {
        self.engine.set_planet_volume(id, volume)
    }

    /// Highlight the planet with this id; `None` for an unknown id.
    pub fn select_planet(&mut self, id: &str) -> Option<&Planet> {
        let planet = self.engine.catalogue().get(id)?;
        self.scene.select(Some(Target::Planet(planet.id().to_string())));
        Some(planet)
    }

    /// Click targeting: selects whatever lies under `point`.
    pub fn select_at(&mut self, point: Vec2) -> Option<Target> {
        let target = self.scene.pick(point);
        self.scene.select(target.clone());
        if let Some(t) = &target {
            log::debug!("[app] selected {t:?}");
        }
        target
    }

    pub fn swipe(&mut self, direction: SwipeDirection, now: Instant) {
        let delta = match direction {
            SwipeDirection::Left => -UI_SPEED_STEP,
            SwipeDirection::Right => UI_SPEED_STEP,
        };
        self.set_speed(self.speed() + delta, now);
    }

    /// Multiply the view zoom by `factor`, clamped to [0.5, 3].
    pub fn pinch(&mut self, factor: f32) {
        if !(factor > 0.0) {
            return;
        }
        self.zoom = (self.zoom * factor).clamp(ZOOM_MIN, ZOOM_MAX);
        let layout = self.scene.layout().with_zoom(self.zoom);
        self.apply_layout(layout);
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        let layout =
            OrbitLayout::new(width, height, self.engine.planets().len()).with_zoom(self.zoom);
        self.apply_layout(layout);
    }

    fn apply_layout(&mut self, layout: OrbitLayout) {
        self.scene.resize(layout, self.engine.planets());
        self.driver.set_layout(layout);
    }

    /// Advance audio and motion to `now`. Returns true if the markers moved.
    pub fn frame(&mut self, now: Instant) -> bool {
        self.pump(now);
        if let Some(last) = self.last_frame {
            let dt = if now > last { now - last } else { Duration::ZERO };
            self.engine.tick(dt);
        }
        if self.driver.is_playing() {
            self.last_frame = Some(now);
        }
        match self.driver.frame(now, self.engine.planets()) {
            Some(positions) => {
                self.scene.update(positions, self.engine.planets());
                true
            }
            None => false,
        }
    }

    /// Whether the host should keep its frame callback armed: while the
    /// planets move, or a slider value is still waiting out its window.
    pub fn wants_frame(&self) -> bool {
        self.driver.wants_frame() || self.volume.is_pending() || self.tempo.is_pending()
    }

    /// Rebuild the audio output after an error.
    pub fn retry_audio(&mut self) -> Result<(), AudioError> {
        self.engine.retry()
    }

    /// Tear down audio and stop the frame loop.
    pub fn dispose(&mut self, now: Instant) {
        self.engine.dispose();
        self.driver.set_playing(false, now);
        self.last_frame = None;
    }

    pub fn engine(&self) -> &AudioEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut AudioEngine {
        &mut self.engine
    }

    pub fn animation(&self) -> &AnimationDriver {
        &self.driver
    }

    pub fn animation_mut(&mut self) -> &mut AnimationDriver {
        &mut self.driver
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn planets(&self) -> &[Planet] {
        self.engine.planets()
    }
}

fn clamp_ui_speed(speed: f64) -> f64 {
    if speed.is_nan() {
        return 1.0;
    }
    speed.clamp(UI_SPEED_MIN, UI_SPEED_MAX)
}
