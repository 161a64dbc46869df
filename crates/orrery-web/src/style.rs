// Canvas styling helpers shared by the 2D painter.

/// `rgba(r, g, b, a)` from linear 0..1 channels.
pub fn css_rgba(rgb: [f32; 3], alpha: f32) -> String {
    let [r, g, b] = rgb.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    format!("rgba({r}, {g}, {b}, {:.3})", alpha.clamp(0.0, 1.0))
}

/// Backing-store size for a canvas laid out at `css_w`×`css_h`.
pub fn backing_size(css_w: f64, css_h: f64, dpr: f64) -> (u32, u32) {
    let dpr = if dpr > 0.0 { dpr } else { 1.0 };
    (
        ((css_w * dpr) as u32).max(1),
        ((css_h * dpr) as u32).max(1),
    )
}

/// Label font scaled with the container, never below a readable floor.
pub fn label_font(container_radius: f32) -> String {
    let px = (container_radius * 0.035).round().max(10.0);
    format!("{px}px sans-serif")
}
