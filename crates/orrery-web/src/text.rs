// Text shown in the page's status and info elements.

use orrery_core::{AudioState, Planet, SUN};

pub fn status_text(state: &AudioState) -> String {
    match (&state.error, state.is_silent, state.is_playing) {
        (Some(e), _, _) => format!("Audio error: {} (press R to retry)", e.message),
        (None, true, true) => "Playing (no audio output)".to_string(),
        (None, false, true) => "Playing".to_string(),
        (None, _, false) => "Paused (space to play)".to_string(),
    }
}

pub fn planet_summary(p: &Planet) -> String {
    format!(
        "{}: {:.2} AU, {:.0} day orbit, {:.0} Hz ({}){}",
        p.name(),
        p.distance_au(),
        p.orbital_period_days(),
        p.frequency_hz(),
        p.note(),
        if p.is_muted() { ", muted" } else { "" }
    )
}

pub fn sun_summary() -> String {
    format!(
        "{}: {:.1} Earth radii, {:.0} K surface",
        SUN.name, SUN.radius_earths, SUN.surface_temp_k
    )
}

pub fn speed_text(speed: f64) -> String {
    format!("{speed:.1}x")
}
