use crate::draw::Painter;
use instant::Instant;
use orrery_core::Orrery;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// requestAnimationFrame loop. Armed only while the app wants frames;
/// input handlers call [`FrameLoop::kick`] after every command.
pub struct FrameLoop {
    app: Rc<RefCell<Orrery>>,
    painter: Painter,
    armed: Cell<bool>,
    callback: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl FrameLoop {
    pub fn new(app: Rc<RefCell<Orrery>>, painter: Painter) -> Rc<Self> {
        let this = Rc::new(Self {
            app,
            painter,
            armed: Cell::new(false),
            callback: RefCell::new(None),
        });
        let weak: Weak<Self> = Rc::downgrade(&this);
        let tick = Closure::wrap(Box::new(move || {
            if let Some(frames) = weak.upgrade() {
                frames.on_frame();
            }
        }) as Box<dyn FnMut()>);
        *this.callback.borrow_mut() = Some(tick);
        this
    }

    fn on_frame(&self) {
        self.armed.set(false);
        self.app.borrow_mut().frame(Instant::now());
        self.redraw();
        if self.app.borrow().wants_frame() {
            self.arm();
        }
    }

    fn arm(&self) {
        if self.armed.get() {
            return;
        }
        let Some(w) = web::window() else {
            return;
        };
        if let Some(cb) = self.callback.borrow().as_ref() {
            match w.request_animation_frame(cb.as_ref().unchecked_ref()) {
                Ok(_) => self.armed.set(true),
                Err(e) => log::warn!("[frame] requestAnimationFrame failed: {e:?}"),
            }
        }
    }

    /// Repaint now and re-arm the loop if anything is moving.
    pub fn kick(&self) {
        self.redraw();
        if self.app.borrow().wants_frame() {
            self.arm();
        }
    }

    pub fn redraw(&self) {
        self.painter.draw(self.app.borrow().scene());
    }
}
