// Pointer gesture recognition for the canvas. Pure logic so it can be
// exercised on the host; the DOM glue feeds it pointer ids, canvas
// positions and event timestamps.

use glam::Vec2;
use orrery_core::SwipeDirection;

/// Horizontal travel needed before a drag counts as a swipe.
pub const SWIPE_MIN_PX: f32 = 60.0;
/// Slower drags are ignored rather than treated as swipes.
pub const SWIPE_MAX_MS: f64 = 600.0;
/// Movement below this is still a tap.
pub const TAP_SLOP_PX: f32 = 8.0;
/// Zoom factor per 100 px of wheel travel.
pub const WHEEL_ZOOM_BASE: f32 = 1.1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    Tap(Vec2),
    Swipe(SwipeDirection),
}

#[derive(Clone, Copy, Debug)]
struct Press {
    id: i32,
    start: Vec2,
    time_ms: f64,
}

#[derive(Default, Debug)]
pub struct GestureTracker {
    pointers: Vec<(i32, Vec2)>,
    press: Option<Press>,
    pinch_dist: Option<f32>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_down(&mut self, id: i32, pos: Vec2, time_ms: f64) {
        match self.pointers.iter_mut().find(|(p, _)| *p == id) {
            Some(entry) => entry.1 = pos,
            None => self.pointers.push((id, pos)),
        }
        if self.pointers.len() == 1 {
            self.press = Some(Press {
                id,
                start: pos,
                time_ms,
            });
        } else {
            // a second finger turns the gesture into a pinch
            self.press = None;
            self.pinch_dist = self.span();
        }
    }

    /// Returns a zoom factor while two pointers are pinching.
    pub fn pointer_move(&mut self, id: i32, pos: Vec2) -> Option<f32> {
        let entry = self.pointers.iter_mut().find(|(p, _)| *p == id)?;
        entry.1 = pos;
        let before = self.pinch_dist?;
        let now = self.span()?;
        self.pinch_dist = Some(now);
        (before > 0.0 && now > 0.0).then(|| now / before)
    }

    pub fn pointer_up(&mut self, id: i32, pos: Vec2, time_ms: f64) -> Option<Gesture> {
        self.pointers.retain(|(p, _)| *p != id);
        if self.pointers.len() < 2 {
            self.pinch_dist = None;
        }
        let press = self.press.filter(|p| p.id == id)?;
        self.press = None;
        classify(press.start, pos, time_ms - press.time_ms)
    }

    pub fn pointer_cancel(&mut self, id: i32) {
        self.pointers.retain(|(p, _)| *p != id);
        if self.press.is_some_and(|p| p.id == id) {
            self.press = None;
        }
        if self.pointers.len() < 2 {
            self.pinch_dist = None;
        }
    }

    fn span(&self) -> Option<f32> {
        match self.pointers.as_slice() {
            [(_, a), (_, b), ..] => Some(a.distance(*b)),
            _ => None,
        }
    }
}

fn classify(start: Vec2, end: Vec2, elapsed_ms: f64) -> Option<Gesture> {
    let d = end - start;
    if d.length() <= TAP_SLOP_PX {
        return Some(Gesture::Tap(end));
    }
    let horizontal = d.x.abs() >= SWIPE_MIN_PX && d.x.abs() > 2.0 * d.y.abs();
    if !horizontal || elapsed_ms > SWIPE_MAX_MS {
        return None;
    }
    Some(Gesture::Swipe(if d.x > 0.0 {
        SwipeDirection::Right
    } else {
        SwipeDirection::Left
    }))
}

/// Wheel delta (pixels, positive = scroll down) to a zoom factor.
pub fn wheel_zoom_factor(delta_y: f64) -> f32 {
    WHEEL_ZOOM_BASE.powf(-(delta_y as f32) / 100.0)
}
