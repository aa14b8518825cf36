//! Preview session state and the per-tick drain, input and draw cycle.

use crate::{
    camera::CameraController, config::Config, gfx::GfxContext, surface::DisplaySurface, ui,
};
use anyhow::Result;
use engine_api::{FrameBuffer, FrameChannel, RenderEngine};
use std::sync::Arc;
use winit::{event::WindowEvent, window::Window};

/// Background clear color, as linear values for the sRGB swap chain.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.913,
    g: 0.913,
    b: 0.913,
    a: 1.0,
};

/// Empties the channel, returning only the newest frame.
///
/// Intermediate frames are dropped so a backlog shows up as a jump to
/// the newest image instead of a growing display lag.
fn take_latest(channel: &FrameChannel) -> Option<FrameBuffer> {
    let mut latest = None;
    while let Some(frame) = channel.drain_one() {
        latest = Some(frame);
    }
    latest
}

pub struct App {
    pub gfx: GfxContext,
    pub surface: DisplaySurface,
    pub controller: CameraController,
    pub channel: Arc<FrameChannel>,
    pub engine: Option<Arc<dyn RenderEngine>>,
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
}

impl App {
    pub async fn new(
        window: Arc<Window>,
        config: &Config,
        channel: Arc<FrameChannel>,
        engine: Option<Arc<dyn RenderEngine>>,
    ) -> Result<Self> {
        let gfx = GfxContext::new(window.clone()).await?;
        let surface =
            DisplaySurface::new(&gfx.device, gfx.config.format, gfx.size.width, gfx.size.height);
        let controller = CameraController::new(config.orbit_speed, config.pan_speed);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &*window,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&gfx.device, gfx.config.format, None, 1);

        Ok(Self {
            gfx,
            surface,
            controller,
            channel,
            engine,
            egui_ctx,
            egui_state,
            egui_renderer,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gfx.resize(new_size);
            self.surface.resize(new_size.width, new_size.height);
        }
    }

    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        if response.consumed {
            // The overlay may keep presses and motion, but never a
            // button-up; a swallowed release wedges the drag gesture.
            self.controller.handle_release_edges(event);
            return true;
        }

        self.controller.handle_event(event);

        if let WindowEvent::Resized(physical_size) = event {
            self.resize(*physical_size);
        }

        false
    }

    /// Uploads the newest queued frame, if any arrived since last tick.
    ///
    /// A refused frame is logged and skipped; whatever was on screen
    /// stays there.
    fn drain_frames(&mut self) {
        let Some(frame) = take_latest(&self.channel) else {
            return;
        };
        if let Err(err) = self.surface.upload(
            &self.gfx.device,
            &self.gfx.queue,
            &frame,
            self.gfx.max_texture_dimension(),
        ) {
            log::warn!("Skipping {}x{} frame: {}", frame.width(), frame.height(), err);
        }
    }

    fn draw_overlay(&self) {
        match self.surface.frame_size() {
            Some(size) => ui::draw_hud(
                &self.egui_ctx,
                size,
                self.surface.scale(),
                self.channel.len(),
                self.controller.mode_label(),
            ),
            None => ui::draw_waiting(&self.egui_ctx),
        }
    }

    /// Runs one session tick: drain frames, apply input, draw, present.
    pub fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        self.drain_frames();
        self.controller.tick(self.engine.as_deref());

        let frame = self.gfx.surface.get_current_texture()?;
        let swap_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let egui_input = self.egui_state.take_egui_input(window);
        self.egui_ctx.begin_frame(egui_input);

        self.draw_overlay();

        let egui_output = self.egui_ctx.end_frame();
        let shapes = self
            .egui_ctx
            .tessellate(egui_output.shapes, self.egui_ctx.pixels_per_point());

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gfx.config.width, self.gfx.config.height],
            pixels_per_point: self.egui_ctx.pixels_per_point(),
        };

        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Preview Encoder"),
            });

        for (id, delta) in &egui_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.gfx.device, &self.gfx.queue, *id, delta);
        }

        self.egui_renderer.update_buffers(
            &self.gfx.device,
            &self.gfx.queue,
            &mut encoder,
            &shapes,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.surface.draw(&self.gfx.queue, &mut render_pass);
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("EGUI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.egui_renderer
                .render(&mut render_pass, &shapes, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }

    /// Releases the live texture and discards any still-queued frames.
    pub fn shutdown(&mut self) {
        self.surface.release_frame();
        self.channel.clear();
    }
}
