use std::time::Instant;
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

use glam::Vec2;
use orrery_core::{command_for_key, AudioError, Orrery, OrreryConfig, Target, SUN};

mod audio;
mod render;

use audio::CpalDriver;
use render::GpuState;

// Name a winit key the way the browser's `KeyboardEvent.key` would.
fn key_name(key: &Key) -> Option<&str> {
    match key {
        Key::Named(NamedKey::Space) => Some(" "),
        Key::Named(NamedKey::ArrowUp) => Some("ArrowUp"),
        Key::Named(NamedKey::ArrowDown) => Some("ArrowDown"),
        Key::Named(NamedKey::ArrowLeft) => Some("ArrowLeft"),
        Key::Named(NamedKey::ArrowRight) => Some("ArrowRight"),
        Key::Character(s) => Some(s.as_str()),
        _ => None,
    }
}

fn describe(app: &Orrery, target: &Target) {
    match target {
        Target::Sun => log::info!(
            "{}: radius {} Earths, surface {} K",
            SUN.name,
            SUN.radius_earths,
            SUN.surface_temp_k
        ),
        Target::Planet(id) => {
            if let Some(p) = app.engine().catalogue().get(id) {
                log::info!(
                    "{}: {} AU, period {} days, tone {} Hz ({}){}",
                    p.name(),
                    p.distance_au(),
                    p.orbital_period_days(),
                    p.frequency_hz(),
                    p.note(),
                    if p.is_muted() { ", muted" } else { "" }
                );
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Orrery")
        .build(&event_loop)?;

    let mut gpu = pollster::block_on(GpuState::new(&window))?;
    let size = window.inner_size();
    let mut app = Orrery::new(
        &OrreryConfig::default(),
        CpalDriver,
        size.width as f32,
        size.height as f32,
    );
    app.engine_mut().on_error(|e: &AudioError| {
        log::warn!("audio error ({}); press R to retry", e.kind);
    });
    log::info!("space: play/pause  +/-: speed  up/down: tempo  [/]: volume  m: mute  1-8: planets  z/x: zoom  r: retry audio");

    let mut cursor = Vec2::ZERO;
    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => {
                app.dispose(Instant::now());
                elwt.exit();
            }
            WindowEvent::Resized(size) => {
                gpu.resize(size);
                app.resize(size.width as f32, size.height as f32);
                gpu.window.request_redraw();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(cmd) = key_name(&logical_key).and_then(command_for_key) {
                    app.apply(cmd, Instant::now());
                    gpu.window.request_redraw();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                cursor = Vec2::new(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                if let Some(target) = app.select_at(cursor) {
                    describe(&app, &target);
                }
                gpu.window.request_redraw();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 40.0,
                };
                app.pinch(1.1f32.powf(lines));
                gpu.window.request_redraw();
            }
            WindowEvent::RedrawRequested => match gpu.render(app.scene()) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => gpu.resize(gpu.window.inner_size()),
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(e) => log::warn!("surface error: {e:?}"),
            },
            _ => {}
        },
        Event::AboutToWait => {
            if app.frame(Instant::now()) {
                gpu.window.request_redraw();
            }
            // keep polling only while something is moving
            elwt.set_control_flow(if app.wants_frame() {
                ControlFlow::Poll
            } else {
                ControlFlow::Wait
            });
        }
        _ => {}
    })?;
    Ok(())
}
