#![cfg(target_arch = "wasm32")]
use orrery_core::{AudioState, Orrery, OrreryConfig};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

mod audio;
mod dom;
mod draw;
mod events;
mod frame;
mod gesture;
mod style;
mod text;

use audio::WebAudioDriver;
use draw::Painter;
use events::Shared;
use frame::FrameLoop;

const CANVAS_ID: &str = "orrery-canvas";
const STATUS_ID: &str = "orrery-status";

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("orrery-web starting");

    if let Err(e) = init() {
        log::error!("init error: {:?}", e);
    }
    Ok(())
}

fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{CANVAS_ID}"))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    let ctx = canvas
        .get_context("2d")
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?
        .ok_or_else(|| anyhow::anyhow!("no 2d context"))?
        .dyn_into::<web::CanvasRenderingContext2d>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    let (w, h) = dom::sync_canvas_backing_size(&canvas);
    // The AudioContext is only created on the first play, from a user gesture.
    let mut orrery = Orrery::new(&OrreryConfig::default(), WebAudioDriver, w as f32, h as f32);
    {
        let document = document.clone();
        orrery.engine_mut().on_state_change(move |state: &AudioState| {
            dom::set_text(&document, STATUS_ID, &text::status_text(state));
        });
    }
    dom::set_text(&document, STATUS_ID, &text::status_text(orrery.engine().state()));

    let app = Rc::new(RefCell::new(orrery));
    let frames = FrameLoop::new(app.clone(), Painter::new(ctx));
    let shared = Shared {
        app,
        frames: frames.clone(),
        document,
    };

    events::wire_keys(shared.clone());
    events::wire_pointer(shared.clone(), canvas.clone());
    events::wire_wheel(shared.clone(), &canvas);
    events::wire_resize(shared.clone(), canvas);
    events::wire_controls(shared);

    frames.redraw();
    log::info!("orrery-web ready; press space or the play button to start");
    Ok(())
}
