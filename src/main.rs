//! Plaque Gallery - Main Entry Point
//!
//! Usage: `plaque-gallery [GALLERY_XML]`
//!
//! Left-drag orbits, right-drag pans, the wheel zooms and Escape quits.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use glam::Vec2;
use plaque_gallery::scheduler::Pacing;
use plaque_gallery::settings::GallerySettings;
use plaque_gallery::telemetry::{init_logging, LogConfig};
use plaque_gallery::GalleryApp;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{WindowAttributes, WindowId};

const WINDOW_TITLE: &str = "Plaque Gallery";

/// Application state
enum AppState {
    /// Before the window is created
    Uninitialized { settings: GallerySettings },
    /// Window and graphics context are ready
    Running { app: Box<GalleryApp> },
    /// Startup failed; the loop is exiting
    Stopped,
}

struct GalleryHandler {
    state: AppState,
    /// Set when window or GPU setup fails, reported by `main`
    startup_error: Option<anyhow::Error>,
}

impl GalleryHandler {
    fn new(settings: GallerySettings) -> Self {
        Self {
            state: AppState::Uninitialized { settings },
            startup_error: None,
        }
    }

    fn start(event_loop: &ActiveEventLoop, settings: &GallerySettings) -> anyhow::Result<GalleryApp> {
        tracing::info!("Creating window...");
        let window_attributes = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(settings.window_width, settings.window_height));
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("Failed to create window")?,
        );
        tracing::info!(
            "Window created: {}x{}",
            window.inner_size().width,
            window.inner_size().height
        );

        tracing::info!("Initializing wgpu and egui...");
        pollster::block_on(GalleryApp::new(window, settings, WINDOW_TITLE))
    }
}

impl ApplicationHandler for GalleryHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let AppState::Uninitialized { settings } = &self.state else {
            return;
        };

        match Self::start(event_loop, settings) {
            Ok(app) => {
                app.window().request_redraw();
                self.state = AppState::Running { app: Box::new(app) };
            }
            Err(e) => {
                tracing::error!("Startup failed: {:#}", e);
                self.startup_error = Some(e);
                self.state = AppState::Stopped;
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let AppState::Running { app } = &mut self.state else {
            return;
        };

        let consumed = app.handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                app.resize(new_size);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                {
                    tracing::info!("Escape pressed, shutting down");
                    event_loop.exit();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                app.on_cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                app.on_cursor_left();
            }
            WindowEvent::MouseInput { state, button, .. } if !consumed => {
                app.on_mouse_button(button, state);
            }
            WindowEvent::MouseWheel { delta, .. } if !consumed => {
                let scroll_amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / 50.0) as f32,
                };
                if scroll_amount.abs() > 0.001 {
                    app.on_scroll(scroll_amount);
                }
            }
            WindowEvent::RedrawRequested => match app.render() {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    tracing::warn!("Surface lost, reconfiguring...");
                    app.recover_surface();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    tracing::error!("Out of GPU memory!");
                    event_loop.exit();
                }
                Err(e) => {
                    tracing::warn!("Surface error: {:?}", e);
                }
            },
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let AppState::Running { app } = &mut self.state else {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        };

        match app.scheduler_mut().pace(Instant::now()) {
            // VSYNC: the Fifo present mode sets the pace
            Pacing::Continuous => {
                app.window().request_redraw();
                event_loop.set_control_flow(ControlFlow::Poll);
            }
            Pacing::Wait { wake_at } => {
                event_loop.set_control_flow(ControlFlow::WaitUntil(wake_at));
            }
            Pacing::Redraw { not_before, wake_at } => {
                // Spin-wait the final microseconds
                if let Some(deadline) = not_before {
                    while Instant::now() < deadline {
                        std::hint::spin_loop();
                    }
                }
                app.window().request_redraw();
                event_loop.set_control_flow(ControlFlow::WaitUntil(wake_at));
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Keep the guard alive for the program duration
    let _log_guard = match init_logging(&LogConfig::from_env()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("Plaque Gallery v{}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = GallerySettings::resolve(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("Failed to load gallery {}", path.display()),
        None => "Failed to load gallery configuration".to_string(),
    })?;

    tracing::info!(
        plaques = settings.plaques.len(),
        vsync = settings.vsync_enabled,
        target_fps = settings.target_fps,
        "Gallery configuration loaded"
    );

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    // Default to sleeping; redraws are scheduled in `about_to_wait`
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut handler = GalleryHandler::new(settings);
    event_loop.run_app(&mut handler).context("Event loop error")?;

    match handler.startup_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
