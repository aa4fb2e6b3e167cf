use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::debug;
use tunnel::{check_linkage, CylinderMesh, Wormhole};
use winit::dpi::PhysicalSize;

use crate::types::{Antialiasing, ColorSpaceMode};

use super::context::GpuContext;
use super::mesh::MeshBuffers;
use super::pipeline::{PipelineLayouts, WormholePipeline, DEPTH_FORMAT};
use super::uniforms::WormholeUniforms;

/// Owns every GPU resource needed to present a frame of the tunnel.
///
/// ```text
///   Window ─▶ Surface ─▶ Device ─▶ Queue
///                          │
///                          ├─▶ WormholePipeline (GLSL, cull front, depth, blend)
///                          ├─▶ MeshBuffers (cylinder vertices + u16 indices)
///                          ├─▶ uniform buffer ◀── WormholeUniforms::from_wormhole
///                          └─▶ depth / MSAA targets (rebuilt on resize)
/// ```
pub(crate) struct GpuState {
    context: GpuContext,
    _layouts: PipelineLayouts,
    pipeline: WormholePipeline,
    mesh: MeshBuffers,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    multisample_target: Option<RenderTarget>,
    depth_target: RenderTarget,
    stats: FrameStats,
}

struct RenderTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl RenderTarget {
    fn new(
        device: &wgpu::Device,
        label: &str,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

struct FrameStats {
    frames: u64,
    frames_since_update: u32,
    last_update: Instant,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frames: 0,
            frames_since_update: 0,
            last_update: Instant::now(),
        }
    }

    fn record(&mut self, now: Instant, uniforms: &WormholeUniforms) {
        self.frames += 1;
        self.frames_since_update += 1;
        let elapsed = now.saturating_duration_since(self.last_update);
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames_since_update as f32 / elapsed.as_secs_f32();
            debug!(
                fps = fps.round(),
                frames = self.frames,
                time = uniforms.time,
                uv_offset = uniforms.uv_offset,
                "render stats"
            );
            self.frames_since_update = 0;
            self.last_update = now;
        }
    }
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        antialiasing: Antialiasing,
        color_space: ColorSpaceMode,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size, antialiasing, color_space)?;
        let layouts = PipelineLayouts::new(&context.device);
        let pipeline = WormholePipeline::new(
            &context.device,
            &layouts,
            context.surface_format,
            context.sample_count,
        )
        .context("failed to build wormhole shader pipeline")?;

        let mesh = MeshBuffers::new(&context.device, &CylinderMesh::default());
        check_linkage(mesh.index_count > 0, true);

        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform buffer"),
            size: std::mem::size_of::<WormholeUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("uniform bind group"),
                layout: &layouts.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        let (multisample_target, depth_target) = Self::build_targets(&context);
        debug!(
            color_space = ?context.color_space,
            sample_count = context.sample_count,
            "GPU state ready"
        );

        Ok(Self {
            context,
            _layouts: layouts,
            pipeline,
            mesh,
            uniform_buffer,
            uniform_bind_group,
            multisample_target,
            depth_target,
            stats: FrameStats::new(),
        })
    }

    fn build_targets(context: &GpuContext) -> (Option<RenderTarget>, RenderTarget) {
        let multisample = (context.sample_count > 1).then(|| {
            RenderTarget::new(
                &context.device,
                "msaa color target",
                context.surface_format,
                context.size,
                context.sample_count,
            )
        });
        let depth = RenderTarget::new(
            &context.device,
            "depth target",
            DEPTH_FORMAT,
            context.size,
            context.sample_count,
        );
        (multisample, depth)
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        let (multisample_target, depth_target) = Self::build_targets(&self.context);
        self.multisample_target = multisample_target;
        self.depth_target = depth_target;
    }

    /// Uploads this frame's uniforms, draws the tunnel and presents.
    pub(crate) fn render(&mut self, wormhole: &Wormhole) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;
        let uniforms = WormholeUniforms::from_wormhole(wormhole);
        self.stats.record(Instant::now(), &uniforms);
        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });
        self.encode_draw(&mut encoder, &view);
        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn encode_draw(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let (attachment_view, resolve_target) = match self.multisample_target.as_ref() {
            Some(msaa) => (&msaa.view, Some(view)),
            None => (view, None),
        };
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("wormhole pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: attachment_view,
                depth_slice: None,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_target.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_pipeline(&self.pipeline.pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..self.mesh.index_count, 0, 0..1);
    }
}
