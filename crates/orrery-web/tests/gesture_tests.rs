// Host-side tests for pointer gesture recognition.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod gesture {
    include!("../src/gesture.rs");
}

use gesture::*;
use glam::Vec2;
use orrery_core::SwipeDirection;

#[test]
fn short_press_is_a_tap_at_release_point() {
    let mut t = GestureTracker::new();
    t.pointer_down(1, Vec2::new(100.0, 100.0), 0.0);
    let g = t.pointer_up(1, Vec2::new(103.0, 101.0), 120.0);
    assert_eq!(g, Some(Gesture::Tap(Vec2::new(103.0, 101.0))));
}

#[test]
fn fast_horizontal_drag_is_a_swipe() {
    let mut t = GestureTracker::new();
    t.pointer_down(1, Vec2::new(300.0, 200.0), 0.0);
    assert_eq!(
        t.pointer_up(1, Vec2::new(200.0, 210.0), 250.0),
        Some(Gesture::Swipe(SwipeDirection::Left))
    );

    t.pointer_down(2, Vec2::new(100.0, 200.0), 1000.0);
    assert_eq!(
        t.pointer_up(2, Vec2::new(180.0, 190.0), 1200.0),
        Some(Gesture::Swipe(SwipeDirection::Right))
    );
}

#[test]
fn slow_or_vertical_drags_are_ignored() {
    let mut t = GestureTracker::new();
    t.pointer_down(1, Vec2::new(100.0, 100.0), 0.0);
    assert_eq!(t.pointer_up(1, Vec2::new(300.0, 100.0), 2000.0), None);

    t.pointer_down(1, Vec2::new(100.0, 100.0), 0.0);
    assert_eq!(t.pointer_up(1, Vec2::new(170.0, 180.0), 100.0), None);

    // too short to be a swipe, too long to be a tap
    t.pointer_down(1, Vec2::new(100.0, 100.0), 0.0);
    assert_eq!(t.pointer_up(1, Vec2::new(130.0, 100.0), 100.0), None);
}

#[test]
fn two_pointers_pinch_by_distance_ratio() {
    let mut t = GestureTracker::new();
    t.pointer_down(1, Vec2::new(100.0, 100.0), 0.0);
    t.pointer_down(2, Vec2::new(200.0, 100.0), 10.0);

    let f = t.pointer_move(2, Vec2::new(300.0, 100.0)).unwrap();
    assert!((f - 2.0).abs() < 1e-6);
    // factors are relative to the previous move
    let f = t.pointer_move(1, Vec2::new(200.0, 100.0)).unwrap();
    assert!((f - 0.5).abs() < 1e-6);

    // lifting a finger after a pinch is not a tap
    assert_eq!(t.pointer_up(2, Vec2::new(300.0, 100.0), 500.0), None);
    assert_eq!(t.pointer_up(1, Vec2::new(200.0, 100.0), 510.0), None);
}

#[test]
fn single_pointer_moves_do_not_pinch() {
    let mut t = GestureTracker::new();
    t.pointer_down(1, Vec2::new(10.0, 10.0), 0.0);
    assert_eq!(t.pointer_move(1, Vec2::new(50.0, 10.0)), None);
    assert_eq!(t.pointer_move(7, Vec2::new(50.0, 10.0)), None);
}

#[test]
fn cancel_forgets_the_press() {
    let mut t = GestureTracker::new();
    t.pointer_down(1, Vec2::new(10.0, 10.0), 0.0);
    t.pointer_cancel(1);
    assert_eq!(t.pointer_up(1, Vec2::new(10.0, 10.0), 50.0), None);
}

#[test]
fn wheel_scroll_up_zooms_in() {
    assert!(wheel_zoom_factor(-100.0) > 1.0);
    assert!(wheel_zoom_factor(100.0) < 1.0);
    assert_eq!(wheel_zoom_factor(0.0), 1.0);
    assert!((wheel_zoom_factor(-100.0) - WHEEL_ZOOM_BASE).abs() < 1e-6);
}
