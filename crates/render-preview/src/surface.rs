//! Owns the on-screen frame texture and its fit-to-window placement.
//!
//! Frames come in as 1-, 3- or 4-channel byte buffers and are expanded
//! to RGBA before upload. At most one texture is live at a time; each
//! consumed frame replaces it. The cached scale factor is re-derived on
//! every upload and every window resize, never in between.

use engine_api::FrameBuffer;
use thiserror::Error;
use wgpu::util::DeviceExt;

/// Window border kept around the image when fitting, in pixels per axis.
const FIT_MARGIN_PX: f32 = 40.0;

/// Bytes per pixel after expansion.
const DISPLAY_BPP: u32 = 4;

/// Unit quad; the shader stretches it over the destination rect.
const UNIT_QUAD: [[f32; 2]; 6] = [
    [0.0, 0.0],
    [1.0, 0.0],
    [1.0, 1.0],
    [0.0, 0.0],
    [1.0, 1.0],
    [0.0, 1.0],
];

/// Why an upload was refused. The previously displayed frame stays.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("cannot display {0}-channel frames")]
    UnsupportedChannelCount(u8),

    #[error("frame {width}x{height} exceeds the device texture limit of {limit}")]
    TextureTooLarge { width: u32, height: u32, limit: u32 },
}

/// Expands a frame's pixels to tightly packed RGBA bytes.
///
/// 4-channel input is copied unchanged; 3-channel input gets an opaque
/// alpha appended per pixel; 1-channel input is broadcast to R, G and B
/// with opaque alpha. Anything else is refused.
pub fn expand_to_rgba(frame: &FrameBuffer) -> Result<Vec<u8>, UploadError> {
    let src = frame.bytes();
    let mut out = Vec::with_capacity(frame.pixel_count() * DISPLAY_BPP as usize);

    match frame.channels() {
        4 => out.extend_from_slice(src),
        3 => {
            for rgb in src.chunks_exact(3) {
                out.extend_from_slice(rgb);
                out.push(u8::MAX);
            }
        }
        1 => {
            for &lum in src {
                out.extend_from_slice(&[lum, lum, lum, u8::MAX]);
            }
        }
        other => return Err(UploadError::UnsupportedChannelCount(other)),
    }

    Ok(out)
}

/// Validation and conversion that runs ahead of any GPU work. The
/// dimension limit is checked first, so an oversized frame is refused
/// before the RGBA expansion allocates.
fn prepare_rgba(frame: &FrameBuffer, max_dim: u32) -> Result<Vec<u8>, UploadError> {
    let (width, height) = (frame.width(), frame.height());
    if width > max_dim || height > max_dim {
        return Err(UploadError::TextureTooLarge {
            width,
            height,
            limit: max_dim,
        });
    }

    expand_to_rgba(frame)
}

/// Uniform scale fitting a texture inside a window with the fixed margin.
///
/// Takes the smaller of the two per-axis ratios, so the whole image fits
/// on both axes. The raw ratio is returned even when the window is
/// smaller than the margin; the draw path clamps the resulting quad.
pub fn fit_scale(tex_w: u32, tex_h: u32, win_w: u32, win_h: u32) -> f32 {
    let sx = (win_w as f32 - FIT_MARGIN_PX) / tex_w as f32;
    let sy = (win_h as f32 - FIT_MARGIN_PX) / tex_h as f32;
    sx.min(sy)
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Default)]
struct QuadUniform {
    window_size: [f32; 2],
    dest_origin: [f32; 2],
    dest_size: [f32; 2],
    _pad: [f32; 2],
}

/// One uploaded frame and its bind group.
struct FrameTexture {
    bind: wgpu::BindGroup,
    width: u32,
    height: u32,
    _texture: wgpu::Texture,
}

/// Draws the most recent engine frame centered and scaled in the window.
pub struct DisplaySurface {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    quad_vb: wgpu::Buffer,
    ubo: wgpu::Buffer,
    frame: Option<FrameTexture>,
    scale: f32,
    win_w: u32,
    win_h: u32,
}

impl DisplaySurface {
    pub fn new(
        device: &wgpu::Device,
        surface_fmt: wgpu::TextureFormat,
        win_w: u32,
        win_h: u32,
    ) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Preview Quad Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<QuadUniform>() as u64,
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shaders/preview_quad.wgsl"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("../shaders/preview_quad.wgsl").into(),
            ),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Preview Quad PipelineLayout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Preview Quad Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        shader_location: 0,
                        offset: 0,
                        format: wgpu::VertexFormat::Float32x2,
                    }],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_fmt,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Preview Quad Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Preview Quad VB"),
            contents: bytemuck::cast_slice(&UNIT_QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Preview Quad UBO"),
            size: std::mem::size_of::<QuadUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            layout,
            sampler,
            quad_vb,
            ubo,
            frame: None,
            scale: 1.0,
            win_w,
            win_h,
        }
    }

    /// Replaces the displayed frame with a freshly uploaded texture.
    ///
    /// Runs every fallible step before touching the live texture, so a
    /// refused upload leaves the previous frame on screen.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame: &FrameBuffer,
        max_dim: u32,
    ) -> Result<(), UploadError> {
        let rgba = prepare_rgba(frame, max_dim)?;
        let (width, height) = (frame.width(), frame.height());

        // Release the previous texture, then create and fill the new one.
        self.frame = None;
        self.frame = Some(self.create_frame_texture(device, queue, &rgba, width, height));
        self.scale = fit_scale(width, height, self.win_w, self.win_h);
        Ok(())
    }

    fn create_frame_texture(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> FrameTexture {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Preview Frame"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(width * DISPLAY_BPP),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Preview Frame Bind"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        FrameTexture {
            bind,
            width,
            height,
            _texture: texture,
        }
    }

    /// Re-derives the cached scale for the new window dimensions.
    pub fn resize(&mut self, win_w: u32, win_h: u32) {
        self.win_w = win_w;
        self.win_h = win_h;
        if let Some(frame) = &self.frame {
            self.scale = fit_scale(frame.width, frame.height, win_w, win_h);
        }
    }

    /// Records the centered quad draw, if a frame is loaded.
    pub fn draw<'a>(&'a self, queue: &wgpu::Queue, rpass: &mut wgpu::RenderPass<'a>) {
        let Some(frame) = &self.frame else {
            return;
        };

        let dest_w = (frame.width as f32 * self.scale).max(0.0);
        let dest_h = (frame.height as f32 * self.scale).max(0.0);
        queue.write_buffer(
            &self.ubo,
            0,
            bytemuck::bytes_of(&QuadUniform {
                window_size: [self.win_w as f32, self.win_h as f32],
                dest_origin: [
                    (self.win_w as f32 - dest_w) / 2.0,
                    (self.win_h as f32 - dest_h) / 2.0,
                ],
                dest_size: [dest_w, dest_h],
                _pad: [0.0; 2],
            }),
        );

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &frame.bind, &[]);
        rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
        rpass.draw(0..6, 0..1);
    }

    /// Drops the live texture. Used at session teardown.
    pub fn release_frame(&mut self) {
        self.frame = None;
    }

    /// Dimensions of the displayed frame, if one is loaded.
    pub fn frame_size(&self) -> Option<(u32, u32)> {
        self.frame.as_ref().map(|frame| (frame.width, frame.height))
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}
