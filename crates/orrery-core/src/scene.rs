//! Retained scene graph for the orrery view.
//!
//! Static geometry (starfield, sun, orbit rings, marker sizes) is built once
//! per container size; per-tick updates only move planet markers and their
//! labels. Front-ends walk the nodes and draw them with whatever API they
//! have (Canvas2D, wgpu quads).

use crate::constants::*;
use crate::orbit::{OrbitLayout, PositionMap};
use crate::planets::{Planet, SUN};
use glam::Vec2;
use rand::prelude::*;

/// A background star in normalized container coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    pub uv: Vec2,
    /// Pixel radius at a 1000 px short side; scaled with the container.
    pub size: f32,
    pub brightness: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SunNode {
    pub center: Vec2,
    pub radius: f32,
    pub color_rgb: [f32; 3],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ring {
    pub center: Vec2,
    pub radius: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub id: String,
    pub label: String,
    pub center: Vec2,
    pub radius: f32,
    pub label_pos: Vec2,
    pub color_rgb: [f32; 3],
    pub muted: bool,
    pub selected: bool,
}

impl Marker {
    /// Colour after mute darkening and selection highlight.
    pub fn display_color(&self) -> [f32; 3] {
        let k = if self.muted {
            MUTE_DARKEN
        } else if self.selected {
            SELECT_BRIGHTEN
        } else {
            1.0
        };
        self.color_rgb.map(|c| (c * k).min(1.0))
    }
}

/// What a click landed on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Sun,
    Planet(String),
}

pub struct Scene {
    layout: OrbitLayout,
    stars: Vec<Star>,
    sun: SunNode,
    rings: Vec<Ring>,
    markers: Vec<Marker>,
    selected: Option<Target>,
    static_builds: u64,
}

impl Scene {
    /// Build the scene. `planets` must be in distance order.
    pub fn new(planets: &[Planet], layout: OrbitLayout, star_count: usize, seed: u64) -> Self {
        let mut scene = Self {
            layout,
            stars: generate_starfield(star_count, seed),
            sun: SunNode {
                center: layout.center(),
                radius: layout.sun_radius(),
                color_rgb: SUN.color_rgb,
            },
            rings: Vec::new(),
            markers: Vec::new(),
            selected: None,
            static_builds: 0,
        };
        scene.build_static(planets);
        scene
    }

    fn build_static(&mut self, planets: &[Planet]) {
        let layout = self.layout;
        let center = layout.center();
        self.sun.center = center;
        self.sun.radius = layout.sun_radius();
        self.rings = (0..planets.len())
            .map(|i| Ring {
                center,
                radius: layout.orbit_radius(i),
            })
            .collect();
        // Keep each marker's current angle so a resize does not reset the view
        let previous: Vec<(String, Vec2)> = self
            .markers
            .iter()
            .map(|m| (m.id.clone(), m.center))
            .collect();
        self.markers = planets
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let angle = previous
                    .iter()
                    .find(|(id, _)| id == p.id())
                    .map(|(_, c)| (c.y - center.y).atan2(c.x - center.x))
                    .unwrap_or(0.0);
                let pos = layout.point_on_orbit(i, angle as f64);
                let radius = layout.marker_radius(p.radius_earths());
                Marker {
                    id: p.id().to_string(),
                    label: p.name().to_string(),
                    center: pos,
                    radius,
                    label_pos: label_anchor(pos, radius, &layout),
                    color_rgb: p.color_rgb(),
                    muted: p.is_muted(),
                    selected: self.selected == Some(Target::Planet(p.id().to_string())),
                }
            })
            .collect();
        self.static_builds += 1;
    }

    /// Rebuild static geometry for a new container size or zoom.
    pub fn resize(&mut self, layout: OrbitLayout, planets: &[Planet]) {
        // markers keep their angle around the new centre
        let old_center = self.layout.center();
        let new_center = layout.center();
        for m in self.markers.iter_mut() {
            m.center = m.center - old_center + new_center;
        }
        self.layout = layout;
        self.build_static(planets);
        log::debug!(
            "[scene] resized to {}x{} zoom {}",
            layout.width,
            layout.height,
            layout.zoom
        );
    }

    /// Move markers to this tick's positions. Does not rebuild anything.
    pub fn update(&mut self, positions: &PositionMap, planets: &[Planet]) {
        for (marker, planet) in self.markers.iter_mut().zip(planets) {
            if let Some(pos) = positions.get(&marker.id) {
                marker.center = pos.point();
                marker.label_pos = label_anchor(marker.center, marker.radius, &self.layout);
            }
            marker.muted = planet.is_muted();
        }
    }

    /// Topmost node under `point`: planets first, then the sun.
    pub fn pick(&self, point: Vec2) -> Option<Target> {
        let slop = self.layout.container_radius() * PICK_SLOP_FRACTION;
        let hit = self
            .markers
            .iter()
            .filter_map(|m| {
                let d = m.center.distance(point);
                (d <= m.radius + slop).then_some((d, m))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0));
        if let Some((_, m)) = hit {
            return Some(Target::Planet(m.id.clone()));
        }
        if self.sun.center.distance(point) <= self.sun.radius + slop {
            return Some(Target::Sun);
        }
        None
    }

    pub fn select(&mut self, target: Option<Target>) {
        for m in self.markers.iter_mut() {
            m.selected = target == Some(Target::Planet(m.id.clone()));
        }
        self.selected = target;
    }

    pub fn selected(&self) -> Option<&Target> {
        self.selected.as_ref()
    }

    pub fn layout(&self) -> &OrbitLayout {
        &self.layout
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Pixel centre and radius of a star in the current container.
    pub fn star_px(&self, star: &Star) -> (Vec2, f32) {
        let short = self.layout.width.min(self.layout.height);
        (
            star.uv * Vec2::new(self.layout.width, self.layout.height),
            star.size * short / 1000.0,
        )
    }

    pub fn sun(&self) -> &SunNode {
        &self.sun
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, id: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    /// Number of times static geometry has been built.
    pub fn static_builds(&self) -> u64 {
        self.static_builds
    }
}

/// Seeded starfield; identical for identical `(count, seed)`.
pub fn generate_starfield(count: usize, seed: u64) -> Vec<Star> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| Star {
            uv: Vec2::new(rng.gen::<f32>(), rng.gen::<f32>()),
            size: 0.6 + rng.gen::<f32>() * 1.4,
            brightness: 0.3 + rng.gen::<f32>() * 0.7,
        })
        .collect()
}

fn label_anchor(center: Vec2, radius: f32, layout: &OrbitLayout) -> Vec2 {
    center + Vec2::new(0.0, radius + layout.container_radius() * LABEL_OFFSET_FRACTION)
}
