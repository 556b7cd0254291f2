//! Glacier - Main Entry Point
//!
//! Opens a window, builds the demo scene, and drives the render loop with
//! first-person camera controls.

use anyhow::Result;
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

use glacier_core::Timer;
use glacier_platform::{InputState, KeyCode, Window};
use glacier_render::{build_demo_scene, Renderer};
use glacier_scene::{FirstPersonController, MoveIntent};

/// Fraction of the window width that counts as the turn zone on each side.
const EDGE_TURN_ZONE: f32 = 0.1;

struct App {
    window: Option<Window>,
    renderer: Option<Renderer>,
    input: InputState,
    controller: FirstPersonController,
    timer: Timer,
}

impl App {
    fn new() -> Self {
        Self {
            window: None,
            renderer: None,
            input: InputState::new(),
            controller: FirstPersonController::default(),
            timer: Timer::new(),
        }
    }

    /// Translates current input into one frame's movement intent.
    ///
    /// WASD moves, arrow keys look, and holding the pointer against the
    /// left or right edge of the window turns.
    fn move_intent(&self) -> MoveIntent {
        let mut intent = MoveIntent::default();

        if self.input.is_key_pressed(KeyCode::KeyW) {
            intent.forward += 1.0;
        }
        if self.input.is_key_pressed(KeyCode::KeyS) {
            intent.forward -= 1.0;
        }
        if self.input.is_key_pressed(KeyCode::KeyD) {
            intent.strafe += 1.0;
        }
        if self.input.is_key_pressed(KeyCode::KeyA) {
            intent.strafe -= 1.0;
        }

        if self.input.is_key_pressed(KeyCode::ArrowRight) {
            intent.turn += 1.0;
        }
        if self.input.is_key_pressed(KeyCode::ArrowLeft) {
            intent.turn -= 1.0;
        }
        if self.input.is_key_pressed(KeyCode::ArrowUp) {
            intent.look += 1.0;
        }
        if self.input.is_key_pressed(KeyCode::ArrowDown) {
            intent.look -= 1.0;
        }

        if let Some(ref window) = self.window {
            let (x, _) = self.input.pointer_position();
            let width = window.width() as f32;
            if width > 0.0 {
                if x < width * EDGE_TURN_ZONE {
                    intent.turn -= 1.0;
                } else if x > width * (1.0 - EDGE_TURN_ZONE) {
                    intent.turn += 1.0;
                }
            }
        }

        intent
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            match Window::new(event_loop, 1700, 900, "Glacier") {
                Ok(window) => match Renderer::new(&window) {
                    Ok(mut renderer) => {
                        if let Err(e) = build_demo_scene(&mut renderer) {
                            error!("Failed to build demo scene: {:?}", e);
                            event_loop.exit();
                            return;
                        }
                        info!("Initialization complete, entering main loop");
                        self.renderer = Some(renderer);
                        self.window = Some(window);
                    }
                    Err(e) => {
                        error!("Failed to create renderer: {:?}", e);
                        event_loop.exit();
                    }
                },
                Err(e) => {
                    error!("Failed to create window: {}", e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                info!("Window resized to {}x{}", size.width, size.height);
                if let Some(ref mut window) = self.window {
                    window.resize(size.width, size.height);
                }
                if let Some(ref mut renderer) = self.renderer {
                    renderer.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let delta = self.timer.delta_secs();
                let intent = self.move_intent();

                if let Some(ref mut renderer) = self.renderer {
                    self.controller
                        .update(renderer.camera_mut(), intent, delta);
                    if let Err(e) = renderer.render_frame() {
                        if e.is_fatal() {
                            error!("Fatal render error: {:?}", e);
                            event_loop.exit();
                        } else {
                            warn!("Render error, skipping frame: {:?}", e);
                        }
                    }
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                use winit::keyboard::PhysicalKey;
                if let PhysicalKey::Code(key) = event.physical_key {
                    if event.state.is_pressed() {
                        self.input.on_key_pressed(key);
                    } else {
                        self.input.on_key_released(key);
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input
                    .on_pointer_moved(position.x as f32, position.y as f32);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.input.begin_frame();
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    glacier_core::init_logging();
    info!("Starting Glacier");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app)?;

    Ok(())
}
