//! Orbital model: (planet, elapsed time, speed) to angle and screen position.
//!
//! The model is date anchored. A planet starts at the phase implied by the
//! calendar date (fraction of the year elapsed divided by its period in
//! years, modulo one revolution) and then advances by
//! `scaled_years * VISUAL_SCALE / period_years` radians, where
//! `scaled_years = elapsed_secs / SECONDS_PER_YEAR * speed`.
//!
//! Orbit radii are ordinal, not metric: planet `i` (by distance) sits on
//! `sun_radius + spacing * (i + 1)` so that Mercury and Neptune stay visibly
//! separated whatever the container size.

use crate::constants::*;
use crate::planets::Planet;
use chrono::{DateTime, Datelike, Timelike, Utc};
use fnv::FnvHashMap;
use glam::Vec2;
use std::f64::consts::TAU;

/// Where each planet's phase starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PhaseAnchor {
    /// Start from the phase implied by this calendar date.
    Date(DateTime<Utc>),
    /// Every planet starts at angle 0; pure period-ratio motion.
    Zero,
}

impl PhaseAnchor {
    pub fn now() -> Self {
        PhaseAnchor::Date(Utc::now())
    }
}

/// Fraction of the calendar year elapsed at `date`, in [0, 1).
pub fn year_fraction(date: DateTime<Utc>) -> f64 {
    let days_in_year = if is_leap_year(date.year()) { 366.0 } else { 365.0 };
    let day = date.ordinal0() as f64 + date.num_seconds_from_midnight() as f64 / 86_400.0;
    (day / days_in_year).clamp(0.0, 1.0 - f64::EPSILON)
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Starting angle (radians) for a planet with the given period.
pub fn start_angle(orbital_period_days: f64, anchor: PhaseAnchor) -> f64 {
    match anchor {
        PhaseAnchor::Zero => 0.0,
        PhaseAnchor::Date(date) => {
            let period_years = orbital_period_days / DAYS_PER_YEAR;
            let revolutions = (year_fraction(date) / period_years).rem_euclid(1.0);
            revolutions * TAU
        }
    }
}

/// Simulated years elapsed after `elapsed_secs` of wall clock at `speed`.
///
/// Negative elapsed time and negative or NaN speeds count as zero.
#[inline]
pub fn scaled_elapsed_years(elapsed_secs: f64, speed: f64) -> f64 {
    let elapsed = if elapsed_secs > 0.0 { elapsed_secs } else { 0.0 };
    let speed = if speed > 0.0 { speed } else { 0.0 };
    elapsed / SECONDS_PER_YEAR * speed
}

/// Angle in [0, 2π) of a planet with `orbital_period_days` after
/// `elapsed_secs` at speed multiplier `speed`.
pub fn orbital_angle(
    orbital_period_days: f64,
    anchor: PhaseAnchor,
    elapsed_secs: f64,
    speed: f64,
) -> f64 {
    let period_years = orbital_period_days / DAYS_PER_YEAR;
    let advance = scaled_elapsed_years(elapsed_secs, speed) * VISUAL_SCALE / period_years;
    let angle = (start_angle(orbital_period_days, anchor) + advance).rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if angle >= TAU {
        0.0
    } else {
        angle
    }
}

/// Wall-clock seconds for one on-screen revolution, `None` when frozen.
pub fn visual_period_secs(orbital_period_days: f64, speed: f64) -> Option<f64> {
    if !(speed > 0.0) {
        return None;
    }
    let period_years = orbital_period_days / DAYS_PER_YEAR;
    Some(TAU * period_years * SECONDS_PER_YEAR / (VISUAL_SCALE * speed))
}

/// Screen-space position of one planet for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlanetPosition {
    pub x: f32,
    pub y: f32,
    pub angle: f64,
}

impl PlanetPosition {
    pub fn point(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Planet id to position for one tick.
pub type PositionMap = FnvHashMap<String, PlanetPosition>;

/// Orbit and marker geometry for a container of a given size.
///
/// Every length is a fixed fraction of the container radius, so resizing
/// rescales the whole layout proportionally and keeps the ordinal order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitLayout {
    pub width: f32,
    pub height: f32,
    pub zoom: f32,
    pub planet_count: usize,
}

impl OrbitLayout {
    pub fn new(width: f32, height: f32, planet_count: usize) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            zoom: 1.0,
            planet_count,
        }
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
        self
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Usable radius: half the short side, less the margin, times zoom.
    pub fn container_radius(&self) -> f32 {
        self.width.min(self.height) * 0.5 * (1.0 - CONTAINER_MARGIN) * self.zoom
    }

    pub fn sun_radius(&self) -> f32 {
        self.container_radius() * SUN_RADIUS_FRACTION
    }

    /// Distance between consecutive orbit rings.
    pub fn spacing(&self) -> f32 {
        let n = self.planet_count.max(1) as f32;
        (self.container_radius() - self.sun_radius()) / n
    }

    /// Ring radius for the planet at `ordinal` (0 = closest).
    pub fn orbit_radius(&self, ordinal: usize) -> f32 {
        self.sun_radius() + self.spacing() * (ordinal as f32 + 1.0)
    }

    /// Marker radius from relative planet size, `r^0.7` scaled to the container.
    pub fn marker_radius(&self, radius_earths: f64) -> f32 {
        let cr = self.container_radius();
        let size = (radius_earths.max(0.0) as f32).powf(MARKER_SIZE_EXPONENT);
        (cr * MARKER_SIZE_FRACTION * size).max(cr * MARKER_MIN_FRACTION)
    }

    pub fn point_on_orbit(&self, ordinal: usize, angle: f64) -> Vec2 {
        let r = self.orbit_radius(ordinal);
        let (s, c) = (angle as f32).sin_cos();
        self.center() + Vec2::new(c, s) * r
    }
}

/// All planet positions for one tick. Deterministic for equal inputs.
///
/// `planets` must be in distance order (as held by the catalogue); the
/// slice index is the ordinal.
pub fn compute_positions(
    planets: &[Planet],
    anchor: PhaseAnchor,
    elapsed_secs: f64,
    speed: f64,
    layout: &OrbitLayout,
    out: &mut PositionMap,
) {
    out.clear();
    for (ordinal, planet) in planets.iter().enumerate() {
        let angle = orbital_angle(planet.orbital_period_days(), anchor, elapsed_secs, speed);
        let p = layout.point_on_orbit(ordinal, angle);
        out.insert(
            planet.id().to_string(),
            PlanetPosition {
                x: p.x,
                y: p.y,
                angle,
            },
        );
    }
}
