//! Static planet reference data.

use crate::error::PlanetError;
use crate::mapping::{nearest_scale_note, VoiceParams, PENTATONIC_NOTES};

/// A planet: immutable astronomical data plus the shared mute flag.
///
/// The base frequency and note label are derived from the distance at
/// construction and cannot be set independently.
#[derive(Clone, Debug, PartialEq)]
pub struct Planet {
    id: String,
    name: String,
    distance_au: f64,
    orbital_period_days: f64,
    radius_earths: f64,
    color_rgb: [f32; 3],
    voice: VoiceParams,
    note: String,
    muted: bool,
}

impl Planet {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        distance_au: f64,
        orbital_period_days: f64,
        radius_earths: f64,
        color_rgb: [f32; 3],
    ) -> Result<Self, PlanetError> {
        let id = id.into();
        // `!(x > 0)` also rejects NaN
        if !(distance_au > 0.0) {
            return Err(PlanetError::Distance {
                id,
                value: distance_au,
            });
        }
        if !(orbital_period_days > 0.0) {
            return Err(PlanetError::Period {
                id,
                value: orbital_period_days,
            });
        }
        if !(radius_earths > 0.0) {
            return Err(PlanetError::Radius {
                id,
                value: radius_earths,
            });
        }
        let voice = VoiceParams::derive(distance_au, orbital_period_days);
        let note = nearest_scale_note(voice.frequency_hz, PENTATONIC_NOTES);
        Ok(Self {
            id,
            name: name.into(),
            distance_au,
            orbital_period_days,
            radius_earths,
            color_rgb,
            voice,
            note,
            muted: false,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Mean orbital radius in AU.
    pub fn distance_au(&self) -> f64 {
        self.distance_au
    }
    pub fn orbital_period_days(&self) -> f64 {
        self.orbital_period_days
    }
    pub fn orbital_period_years(&self) -> f64 {
        self.orbital_period_days / crate::constants::DAYS_PER_YEAR
    }
    /// Radius relative to Earth.
    pub fn radius_earths(&self) -> f64 {
        self.radius_earths
    }
    pub fn color_rgb(&self) -> [f32; 3] {
        self.color_rgb
    }
    pub fn frequency_hz(&self) -> f64 {
        self.voice.frequency_hz
    }
    pub fn voice_params(&self) -> VoiceParams {
        self.voice
    }
    pub fn note(&self) -> &str {
        &self.note
    }
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    // Only the audio engine flips this so UI and engine never disagree.
    pub(crate) fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}

/// Static facts about the Sun, which is a click target but not a voice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SunInfo {
    pub name: &'static str,
    pub radius_earths: f64,
    pub surface_temp_k: f64,
    pub color_rgb: [f32; 3],
}

pub const SUN: SunInfo = SunInfo {
    name: "Sun",
    radius_earths: 109.2,
    surface_temp_k: 5772.0,
    color_rgb: [1.0, 0.78, 0.25],
};

/// Planets ordered by distance from the sun, with unique ids.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalogue {
    planets: Vec<Planet>,
}

impl Catalogue {
    /// Validate ids and sort by distance. Equal distances keep input order.
    pub fn new(mut planets: Vec<Planet>) -> Result<Self, PlanetError> {
        for (i, p) in planets.iter().enumerate() {
            if planets[..i].iter().any(|q| q.id == p.id) {
                return Err(PlanetError::Duplicate(p.id.clone()));
            }
        }
        planets.sort_by(|a, b| a.distance_au.total_cmp(&b.distance_au));
        Ok(Self { planets })
    }

    /// The eight planets of the solar system.
    pub fn solar_system() -> Self {
        let planets = DEFAULT_PLANETS
            .iter()
            .filter_map(|&(id, name, dist, period, radius, color)| {
                match Planet::new(id, name, dist, period, radius, color) {
                    Ok(p) => Some(p),
                    Err(e) => {
                        log::error!("[catalogue] {e}");
                        None
                    }
                }
            })
            .collect();
        Self { planets }
    }

    pub fn planets(&self) -> &[Planet] {
        &self.planets
    }

    pub fn len(&self) -> usize {
        self.planets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planets.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Planet> {
        self.planets.iter().find(|p| p.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Planet> {
        self.planets.iter_mut().find(|p| p.id == id)
    }

    /// Position of the planet in distance order (0 = closest).
    pub fn ordinal(&self, id: &str) -> Option<usize> {
        self.planets.iter().position(|p| p.id == id)
    }
}

// id, name, distance (AU), period (days), radius (Earth = 1), colour
type PlanetRow = (&'static str, &'static str, f64, f64, f64, [f32; 3]);

const DEFAULT_PLANETS: [PlanetRow; 8] = [
    ("mercury", "Mercury", 0.39, 88.0, 0.38, [0.66, 0.64, 0.62]),
    ("venus", "Venus", 0.72, 224.7, 0.95, [0.93, 0.80, 0.55]),
    ("earth", "Earth", 1.0, 365.25, 1.0, [0.30, 0.55, 0.95]),
    ("mars", "Mars", 1.52, 687.0, 0.53, [0.85, 0.38, 0.22]),
    ("jupiter", "Jupiter", 5.2, 4331.0, 11.21, [0.85, 0.70, 0.52]),
    ("saturn", "Saturn", 9.54, 10747.0, 9.45, [0.92, 0.84, 0.62]),
    ("uranus", "Uranus", 19.19, 30589.0, 4.01, [0.55, 0.85, 0.90]),
    ("neptune", "Neptune", 30.07, 60190.0, 3.88, [0.30, 0.42, 0.92]),
];
