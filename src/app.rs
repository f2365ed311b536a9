//! Application state for the gallery window
//!
//! Ties the GPU context, renderer, media and egui to a `GallerySession`.
//! Frame pacing is driven by the winit event loop (see `main.rs`); each
//! redraw advances orbit damping, uploads new video frames and renders.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use glam::Vec2;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::window::Window;

use crate::gpu_context::GpuContext;
use crate::media::{EnvironmentImage, EnvironmentTexture, MediaLibrary};
use crate::render::GalleryRenderer;
use crate::scene::{RenderOutput, ViewportSize};
use crate::scheduler::FrameScheduler;
use crate::session::GallerySession;
use crate::settings::GallerySettings;
use crate::ui::LabelOverlayView;

/// Frames between window title FPS refreshes
const TITLE_UPDATE_INTERVAL_FRAMES: u64 = 60;

/// Mouse drag in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    Orbit,
    Pan,
}

pub struct GalleryApp {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: GalleryRenderer,
    /// Kept alive for the renderer's bind group
    _environment: EnvironmentTexture,
    media: MediaLibrary,
    session: GallerySession,
    scheduler: FrameScheduler,
    started_at: Instant,

    // Pointer
    cursor: Option<Vec2>,
    drag: Option<Drag>,

    // egui integration
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    caption: LabelOverlayView,

    title: String,
}

impl GalleryApp {
    /// Set up GPU, media and the scene for `window`
    pub async fn new(window: Arc<Window>, settings: &GallerySettings, title: &str) -> anyhow::Result<Self> {
        let gpu = GpuContext::new(window.clone(), settings.vsync_enabled).await?;

        let environment_path = settings.environment_path();
        let environment_image = EnvironmentImage::load_or_gradient(&environment_path);
        let environment = EnvironmentTexture::new(&gpu.device, &gpu.queue, &environment_image);

        let mut media = MediaLibrary::new(&settings.media_root);
        let session = GallerySession::new(&settings.plaques, &settings.camera, &mut media, gpu.size())
            .context("Failed to build gallery scene")?;
        tracing::info!(plaques = session.registry().len(), textures = media.len(), "Media ready");

        let renderer = GalleryRenderer::new(&gpu.device, gpu.surface_format(), &environment, settings.exposure);

        let egui_ctx = egui::Context::default();
        let mut style = (*egui_ctx.style()).clone();
        style.visuals.window_shadow = egui::epaint::Shadow::NONE;
        egui_ctx.set_style(style);

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&gpu.device, gpu.surface_format(), None, 1, false);

        let now = Instant::now();
        Ok(Self {
            window,
            gpu,
            renderer,
            _environment: environment,
            media,
            session,
            scheduler: FrameScheduler::new(settings.vsync_enabled, settings.target_fps, now),
            started_at: now,
            cursor: None,
            drag: None,
            egui_ctx,
            egui_state,
            egui_renderer,
            caption: LabelOverlayView::new(),
            title: title.to_string(),
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn scheduler_mut(&mut self) -> &mut FrameScheduler {
        &mut self.scheduler
    }

    /// Forward an event to egui; true if egui consumed it
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.egui_state.on_window_event(&self.window, event).consumed
    }

    /// Keep camera aspect and surface size together
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.session.resize(ViewportSize::from(new_size), &mut self.gpu);
    }

    /// Reconfigure after the surface was lost or outdated
    pub fn recover_surface(&mut self) {
        self.gpu.reconfigure();
    }

    /// Pointer moved to `position` (physical pixels).
    ///
    /// Applies any drag, then runs the hover cycle for the new position.
    pub fn on_cursor_moved(&mut self, position: Vec2) {
        if let (Some(drag), Some(last)) = (self.drag, self.cursor) {
            let delta = position - last;
            match drag {
                Drag::Orbit => self.session.orbit(delta),
                Drag::Pan => self.session.pan(delta),
            }
        }
        self.cursor = Some(position);
        self.session.pointer_moved(position);
    }

    pub fn on_cursor_left(&mut self) {
        self.cursor = None;
        self.drag = None;
    }

    pub fn on_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        let drag = match button {
            MouseButton::Left => Drag::Orbit,
            MouseButton::Right => Drag::Pan,
            _ => return,
        };
        match state {
            ElementState::Pressed => self.drag = Some(drag),
            ElementState::Released if self.drag == Some(drag) => self.drag = None,
            ElementState::Released => {}
        }
    }

    /// Wheel; positive zooms in
    pub fn on_scroll(&mut self, amount: f32) {
        self.session.zoom(amount);
    }

    /// Render one frame: damping, video upload, scene, caption
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.session.tick();

        let recreated = self
            .media
            .update(&self.gpu.device, &self.gpu.queue, self.started_at.elapsed());
        self.renderer.prepare(
            &self.gpu.device,
            &self.gpu.queue,
            self.session.camera(),
            self.session.registry(),
            &self.media,
            &recreated,
        );

        // Caption
        let raw_input = self.egui_state.take_egui_input(&self.window);
        self.egui_ctx.begin_pass(raw_input);
        self.caption.show(&self.egui_ctx, self.session.overlay());
        let full_output = self.egui_ctx.end_pass();
        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);
        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let output = self.gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Gallery Encoder"),
            });

        self.renderer.render(&mut encoder, &view, self.gpu.depth_view());

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.gpu.device, &self.gpu.queue, *id, image_delta);
        }
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.config.width, self.gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };
        let egui_commands = self.egui_renderer.update_buffers(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.gpu
            .queue
            .submit(egui_commands.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();

        self.scheduler.record_frame(Instant::now());
        self.update_title();
        Ok(())
    }

    fn update_title(&self) {
        let stats = self.scheduler.stats();
        if stats.frame_count() % TITLE_UPDATE_INTERVAL_FRAMES == 0 {
            self.window
                .set_title(&format!("{} ({:.0} fps)", self.title, stats.fps()));
        }
    }
}
