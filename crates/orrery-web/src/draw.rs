use crate::style::{css_rgba, label_font};
use orrery_core::{Scene, Target};
use std::f64::consts::TAU;
use web_sys as web;

const BACKGROUND: &str = "#030308";
const RING_STROKE: &str = "rgba(140, 153, 191, 0.25)";
const SELECT_STROKE: &str = "rgba(255, 255, 255, 0.8)";
const LABEL_FILL: &str = "rgba(220, 225, 240, 0.85)";

/// Paints the scene graph onto a 2D canvas context.
pub struct Painter {
    ctx: web::CanvasRenderingContext2d,
}

impl Painter {
    pub fn new(ctx: web::CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    fn disc(&self, x: f64, y: f64, r: f64) {
        self.ctx.begin_path();
        let _ = self.ctx.arc(x, y, r.max(0.0), 0.0, TAU);
        self.ctx.fill();
    }

    fn circle(&self, x: f64, y: f64, r: f64) {
        self.ctx.begin_path();
        let _ = self.ctx.arc(x, y, r.max(0.0), 0.0, TAU);
        self.ctx.stroke();
    }

    pub fn draw(&self, scene: &Scene) {
        let ctx = &self.ctx;
        let layout = scene.layout();
        ctx.set_fill_style_str(BACKGROUND);
        ctx.fill_rect(0.0, 0.0, layout.width as f64, layout.height as f64);

        for star in scene.stars() {
            let (p, r) = scene.star_px(star);
            ctx.set_fill_style_str(&css_rgba([0.9, 0.92, 1.0], star.brightness));
            self.disc(p.x as f64, p.y as f64, r as f64);
        }

        ctx.set_line_width(1.0);
        ctx.set_stroke_style_str(RING_STROKE);
        for ring in scene.rings() {
            self.circle(ring.center.x as f64, ring.center.y as f64, ring.radius as f64);
        }

        let sun = scene.sun();
        let (sx, sy, sr) = (sun.center.x as f64, sun.center.y as f64, sun.radius as f64);
        ctx.set_fill_style_str(&css_rgba(sun.color_rgb, 0.15));
        self.disc(sx, sy, sr * 1.8);
        ctx.set_fill_style_str(&css_rgba(sun.color_rgb, 1.0));
        self.disc(sx, sy, sr);
        if scene.selected() == Some(&Target::Sun) {
            ctx.set_line_width(1.5);
            ctx.set_stroke_style_str(SELECT_STROKE);
            self.circle(sx, sy, sr + 4.0);
        }

        ctx.set_font(&label_font(layout.container_radius()));
        ctx.set_text_align("center");
        ctx.set_text_baseline("top");
        for m in scene.markers() {
            let (x, y) = (m.center.x as f64, m.center.y as f64);
            if m.selected {
                ctx.set_line_width(1.5);
                ctx.set_stroke_style_str(SELECT_STROKE);
                self.circle(x, y, m.radius as f64 + 4.0);
            }
            ctx.set_fill_style_str(&css_rgba(m.display_color(), 1.0));
            self.disc(x, y, m.radius as f64);

            ctx.set_fill_style_str(LABEL_FILL);
            let _ = ctx.fill_text(&m.label, m.label_pos.x as f64, m.label_pos.y as f64);
        }
    }
}
