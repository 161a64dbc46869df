// DOM wiring: keyboard, pointer gestures, wheel, resize and the optional
// page controls, all translated into calls on the shared `Orrery`.

use crate::dom;
use crate::frame::FrameLoop;
use crate::gesture::{wheel_zoom_factor, Gesture, GestureTracker};
use crate::text;
use instant::Instant;
use orrery_core::{command_for_key, Command, Orrery, Target};
use std::cell::RefCell;
use std::rc::Rc;
use web_sys as web;

pub const INFO_ID: &str = "orrery-info";
pub const SPEED_ID: &str = "orrery-speed-value";
pub const PLAY_ID: &str = "orrery-play";
pub const VOLUME_ID: &str = "orrery-volume";
pub const TEMPO_ID: &str = "orrery-tempo";
pub const SPEED_SLIDER_ID: &str = "orrery-speed";
pub const MUTE_ID: &str = "orrery-mute";

#[derive(Clone)]
pub struct Shared {
    pub app: Rc<RefCell<Orrery>>,
    pub frames: Rc<FrameLoop>,
    pub document: web::Document,
}

impl Shared {
    fn refresh_controls(&self) {
        let app = self.app.borrow();
        dom::set_text(&self.document, SPEED_ID, &text::speed_text(app.speed()));
        dom::set_text(
            &self.document,
            PLAY_ID,
            if app.is_playing() { "Pause" } else { "Play" },
        );
        if let Some(slider) = dom::input_by_id(&self.document, SPEED_SLIDER_ID) {
            slider.set_value_as_number(app.speed());
        }
    }

    fn show_target(&self, target: Option<&Target>) {
        let app = self.app.borrow();
        let info = match target {
            Some(Target::Sun) => text::sun_summary(),
            Some(Target::Planet(id)) => match app.engine().catalogue().get(id) {
                Some(p) => text::planet_summary(p),
                None => String::new(),
            },
            None => String::new(),
        };
        dom::set_text(&self.document, INFO_ID, &info);
    }

    fn after_command(&self) {
        self.refresh_controls();
        self.frames.kick();
    }
}

pub fn wire_keys(shared: Shared) {
    let Some(window) = web::window() else {
        return;
    };
    dom::listen(&window, "keydown", move |ev: web::KeyboardEvent| {
        if ev.repeat() {
            return;
        }
        let Some(cmd) = command_for_key(&ev.key()) else {
            return;
        };
        ev.prevent_default();
        shared.app.borrow_mut().apply(cmd, Instant::now());
        if let Command::TogglePlanetMute(_) = cmd {
            let selected = shared.app.borrow().scene().selected().cloned();
            shared.show_target(selected.as_ref());
        }
        shared.after_command();
    });
}

pub fn wire_pointer(shared: Shared, canvas: web::HtmlCanvasElement) {
    let tracker = Rc::new(RefCell::new(GestureTracker::new()));

    {
        let tracker = tracker.clone();
        let c = canvas.clone();
        dom::listen(&canvas, "pointerdown", move |ev: web::PointerEvent| {
            let pos = dom::client_to_canvas_px(&c, ev.client_x() as f64, ev.client_y() as f64);
            tracker
                .borrow_mut()
                .pointer_down(ev.pointer_id(), pos, ev.time_stamp());
        });
    }
    {
        let tracker = tracker.clone();
        let c = canvas.clone();
        let shared = shared.clone();
        dom::listen(&canvas, "pointermove", move |ev: web::PointerEvent| {
            let pos = dom::client_to_canvas_px(&c, ev.client_x() as f64, ev.client_y() as f64);
            let pinch = tracker.borrow_mut().pointer_move(ev.pointer_id(), pos);
            if let Some(factor) = pinch {
                shared.app.borrow_mut().pinch(factor);
                shared.frames.kick();
            }
        });
    }
    {
        let tracker = tracker.clone();
        let c = canvas.clone();
        dom::listen(&canvas, "pointerup", move |ev: web::PointerEvent| {
            let pos = dom::client_to_canvas_px(&c, ev.client_x() as f64, ev.client_y() as f64);
            let gesture = tracker
                .borrow_mut()
                .pointer_up(ev.pointer_id(), pos, ev.time_stamp());
            match gesture {
                Some(Gesture::Tap(p)) => {
                    let target = shared.app.borrow_mut().select_at(p);
                    shared.show_target(target.as_ref());
                }
                Some(Gesture::Swipe(dir)) => {
                    shared.app.borrow_mut().swipe(dir, Instant::now());
                }
                None => return,
            }
            shared.after_command();
        });
    }
    dom::listen(&canvas, "pointercancel", move |ev: web::PointerEvent| {
        tracker.borrow_mut().pointer_cancel(ev.pointer_id());
    });
}

pub fn wire_wheel(shared: Shared, canvas: &web::HtmlCanvasElement) {
    dom::listen(canvas, "wheel", move |ev: web::WheelEvent| {
        ev.prevent_default();
        shared.app.borrow_mut().pinch(wheel_zoom_factor(ev.delta_y()));
        shared.frames.kick();
    });
}

pub fn wire_resize(shared: Shared, canvas: web::HtmlCanvasElement) {
    let Some(window) = web::window() else {
        return;
    };
    dom::listen(&window, "resize", move |_: web::Event| {
        let (w, h) = dom::sync_canvas_backing_size(&canvas);
        shared.app.borrow_mut().resize(w as f32, h as f32);
        shared.frames.kick();
    });
}

/// Page controls are optional; missing elements are skipped.
pub fn wire_controls(shared: Shared) {
    let document = shared.document.clone();

    if let Some(button) = document.get_element_by_id(PLAY_ID) {
        let shared = shared.clone();
        dom::listen(&button, "click", move |_: web::Event| {
            shared.app.borrow_mut().toggle_play(Instant::now());
            shared.after_command();
        });
    }
    if let Some(slider) = dom::input_by_id(&document, VOLUME_ID) {
        let shared = shared.clone();
        let s = slider.clone();
        dom::listen(&slider, "input", move |_: web::Event| {
            let v = s.value_as_number();
            if v.is_finite() {
                shared.app.borrow_mut().set_volume(v as f32, Instant::now());
                shared.frames.kick();
            }
        });
    }
    if let Some(slider) = dom::input_by_id(&document, TEMPO_ID) {
        let shared = shared.clone();
        let s = slider.clone();
        dom::listen(&slider, "input", move |_: web::Event| {
            let v = s.value_as_number();
            if v.is_finite() && v >= 0.0 {
                shared
                    .app
                    .borrow_mut()
                    .set_tempo(v.round() as u32, Instant::now());
                shared.frames.kick();
            }
        });
    }
    if let Some(slider) = dom::input_by_id(&document, SPEED_SLIDER_ID) {
        let shared = shared.clone();
        let s = slider.clone();
        dom::listen(&slider, "input", move |_: web::Event| {
            let v = s.value_as_number();
            if v.is_finite() {
                shared.app.borrow_mut().set_speed(v, Instant::now());
                shared.after_command();
            }
        });
    }
    if let Some(checkbox) = dom::input_by_id(&document, MUTE_ID) {
        let shared = shared.clone();
        let c = checkbox.clone();
        dom::listen(&checkbox, "change", move |_: web::Event| {
            shared.app.borrow_mut().mute_global(c.checked());
        });
    }
    shared.refresh_controls();
}
