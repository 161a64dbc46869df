// Tests for the orbital model and the ordinal layout.

use chrono::{TimeZone, Utc};
use orrery_core::*;
use std::f64::consts::TAU;

// Distance between two angles on the circle.
fn circular_diff(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(TAU);
    d.min(TAU - d)
}

fn fixed_anchor() -> PhaseAnchor {
    PhaseAnchor::Date(Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap())
}

#[test]
fn angle_is_periodic_in_visual_period() {
    let catalogue = Catalogue::solar_system();
    for planet in catalogue.planets() {
        for speed in [0.1, 1.0, 3.5, 10.0] {
            let period = visual_period_secs(planet.orbital_period_days(), speed).unwrap();
            for k in 0..20 {
                let t = k as f64 * 37.3;
                let a = orbital_angle(planet.orbital_period_days(), fixed_anchor(), t, speed);
                let b = orbital_angle(
                    planet.orbital_period_days(),
                    fixed_anchor(),
                    t + period,
                    speed,
                );
                assert!(
                    circular_diff(a, b) < 1e-6,
                    "{} at t={t}, speed={speed}: {a} vs {b}",
                    planet.name()
                );
            }
        }
    }
}

#[test]
fn speed_scaling_equals_time_scaling() {
    let catalogue = Catalogue::solar_system();
    for planet in catalogue.planets() {
        for speed in [0.1, 0.5, 2.0, 7.0, 10.0] {
            for k in 0..10 {
                let t = k as f64 * 11.0;
                let scaled = orbital_angle(planet.orbital_period_days(), fixed_anchor(), t, speed);
                let stretched =
                    orbital_angle(planet.orbital_period_days(), fixed_anchor(), t * speed, 1.0);
                assert!(circular_diff(scaled, stretched) < 1e-9);
            }
        }
    }
}

#[test]
fn angle_stays_in_range() {
    for days in [88.0, 365.25, 60190.0] {
        for k in 0..200 {
            let a = orbital_angle(days, fixed_anchor(), k as f64 * 123.4, 4.0);
            assert!((0.0..TAU).contains(&a));
        }
    }
}

#[test]
fn zero_anchor_starts_at_zero() {
    assert_eq!(start_angle(687.0, PhaseAnchor::Zero), 0.0);
    assert_eq!(orbital_angle(687.0, PhaseAnchor::Zero, 0.0, 1.0), 0.0);
}

#[test]
fn negative_elapsed_or_speed_is_clamped() {
    let start = start_angle(365.25, fixed_anchor());
    assert_eq!(orbital_angle(365.25, fixed_anchor(), -50.0, 1.0), start);
    assert_eq!(orbital_angle(365.25, fixed_anchor(), 50.0, -2.0), start);
    assert_eq!(scaled_elapsed_years(100.0, f64::NAN), 0.0);
}

#[test]
fn frozen_speed_has_no_visual_period() {
    assert!(visual_period_secs(88.0, 0.0).is_none());
    assert!(visual_period_secs(88.0, -1.0).is_none());
    // inner planets lap faster
    let mercury = visual_period_secs(88.0, 1.0).unwrap();
    let neptune = visual_period_secs(60190.0, 1.0).unwrap();
    assert!(mercury < neptune);
}

#[test]
fn year_fraction_tracks_calendar() {
    let jan1 = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(year_fraction(jan1), 0.0);

    let mid = Utc.with_ymd_and_hms(2023, 7, 2, 12, 0, 0).unwrap();
    assert!((year_fraction(mid) - 0.5).abs() < 0.01);

    let last = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
    assert!(year_fraction(last) < 1.0);
}

#[test]
fn earth_start_phase_follows_date() {
    let date = Utc.with_ymd_and_hms(2023, 4, 1, 0, 0, 0).unwrap();
    let expected = year_fraction(date) * TAU;
    let got = start_angle(365.25, PhaseAnchor::Date(date));
    assert!((got - expected).abs() < 1e-9);
}

#[test]
fn orbit_radii_follow_ordinal_order() {
    let layout = OrbitLayout::new(900.0, 700.0, 8);
    assert!(layout.sun_radius() < layout.orbit_radius(0));
    for i in 1..8 {
        assert!(layout.orbit_radius(i - 1) < layout.orbit_radius(i));
    }
    assert!((layout.orbit_radius(7) - layout.container_radius()).abs() < 1e-3);
}

#[test]
fn resize_rescales_proportionally() {
    let catalogue = Catalogue::solar_system();
    let big = OrbitLayout::new(900.0, 700.0, 8);
    let small = OrbitLayout::new(400.0, 300.0, 8);
    let ratio = small.container_radius() / big.container_radius();

    for (i, planet) in catalogue.planets().iter().enumerate() {
        let orbit_ratio = small.orbit_radius(i) / big.orbit_radius(i);
        assert!((orbit_ratio - ratio).abs() < 1e-5, "{}", planet.name());

        let marker_ratio =
            small.marker_radius(planet.radius_earths()) / big.marker_radius(planet.radius_earths());
        assert!((marker_ratio - ratio).abs() < 1e-5, "{}", planet.name());
    }
    for layout in [big, small] {
        for i in 1..8 {
            assert!(layout.orbit_radius(i - 1) < layout.orbit_radius(i));
        }
    }
}

#[test]
fn small_planets_get_a_minimum_marker() {
    let layout = OrbitLayout::new(800.0, 800.0, 8);
    let floor = layout.container_radius() * 0.008;
    assert!(layout.marker_radius(0.01) >= floor);
    assert!(layout.marker_radius(11.21) > layout.marker_radius(1.0));
}

#[test]
fn zoom_is_clamped() {
    let layout = OrbitLayout::new(500.0, 500.0, 8);
    assert_eq!(layout.with_zoom(10.0).zoom, 3.0);
    assert_eq!(layout.with_zoom(0.1).zoom, 0.5);
    let zoomed = layout.with_zoom(2.0);
    assert!((zoomed.container_radius() - 2.0 * layout.container_radius()).abs() < 1e-3);
}

#[test]
fn positions_sit_on_their_rings() {
    let catalogue = Catalogue::solar_system();
    let layout = OrbitLayout::new(640.0, 480.0, catalogue.len());
    let mut out = PositionMap::default();
    compute_positions(
        catalogue.planets(),
        fixed_anchor(),
        42.0,
        2.0,
        &layout,
        &mut out,
    );
    assert_eq!(out.len(), 8);
    for (i, planet) in catalogue.planets().iter().enumerate() {
        let pos = out[planet.id()];
        let r = pos.point().distance(layout.center());
        assert!((r - layout.orbit_radius(i)).abs() < 1e-2);
    }

    // same inputs, same output
    let mut again = PositionMap::default();
    compute_positions(
        catalogue.planets(),
        fixed_anchor(),
        42.0,
        2.0,
        &layout,
        &mut again,
    );
    assert_eq!(out, again);
}
