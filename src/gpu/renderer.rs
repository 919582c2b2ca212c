//! Headless scene renderer: draws the wavy text mesh, runs post-processing and
//! reads the frame back as RGBA8.

use wgpu::{BindGroup, BindGroupLayout, Buffer, Device, RenderPipeline};

use super::context::{GpuContext, GpuError};
use super::layouts::create_wave_layout;
use super::pipelines::{create_pipeline_layout, RenderPipelineBuilder};
use super::postprocess::PostProcessPipeline;
use super::textures::{ReadbackBuffer, RenderTarget, SampledTexture, COLOR_FORMAT, DEPTH_FORMAT};
use crate::app::App;
use crate::frame_loop::FrameTarget;
use crate::material::WaveUniforms;
use crate::text::{TextNode, TextVertex};

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
    wgpu::VertexAttribute {
        offset: 0,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x3,
    },
    wgpu::VertexAttribute {
        offset: 12,
        shader_location: 1,
        format: wgpu::VertexFormat::Float32x2,
    },
    wgpu::VertexAttribute {
        offset: 20,
        shader_location: 2,
        format: wgpu::VertexFormat::Float32,
    },
];

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<TextVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

/// Text mesh uploaded to the GPU.
struct MeshBuffers {
    vertices: Buffer,
    indices: Buffer,
    index_count: u32,
    revision: u64,
}

impl MeshBuffers {
    fn upload(ctx: &GpuContext, text: &TextNode) -> Option<Self> {
        let geometry = text.geometry();
        if geometry.indices.is_empty() {
            return None;
        }

        let vertices = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("text_vertices"),
            size: std::mem::size_of_val(geometry.vertices.as_slice()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        ctx.queue
            .write_buffer(&vertices, 0, bytemuck::cast_slice(&geometry.vertices));

        let indices = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("text_indices"),
            size: std::mem::size_of_val(geometry.indices.as_slice()) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        ctx.queue
            .write_buffer(&indices, 0, bytemuck::cast_slice(&geometry.indices));

        Some(Self {
            vertices,
            indices,
            index_count: geometry.indices.len() as u32,
            revision: text.revision(),
        })
    }
}

/// Textures and bind group of the wave material.
struct MaterialBinding {
    generation: u64,
    atlas_revision: u64,
    noise: SampledTexture,
    // Owned here so the texture lives as long as the bind group.
    _atlas: SampledTexture,
    bind_group: BindGroup,
}

/// Headless renderer for the wavy text scene.
pub struct SceneRenderer {
    ctx: GpuContext,
    wave_pipeline: RenderPipeline,
    wave_layout: BindGroupLayout,
    uniform_buffer: Buffer,
    postprocess: PostProcessPipeline,
    scene: RenderTarget,
    depth: RenderTarget,
    readback: ReadbackBuffer,
    mesh: Option<MeshBuffers>,
    binding: Option<MaterialBinding>,
    width: u32,
    height: u32,
    last_frame: Option<Vec<u8>>,
}

impl SceneRenderer {
    /// Create a renderer on a fresh GPU context.
    pub async fn new(width: u32, height: u32) -> Result<Self, GpuError> {
        let ctx = GpuContext::new().await?;
        Ok(Self::with_context(ctx, width, height))
    }

    pub fn with_context(ctx: GpuContext, width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let device = &ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("wave_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/wave.wgsl").into()),
        });
        let wave_layout = create_wave_layout(device);
        let pipeline_layout = create_pipeline_layout(device, "wave_pipeline_layout", &[&wave_layout]);

        // No culling: the material is double-sided.
        let wave_pipeline = RenderPipelineBuilder::new("wave_pipeline", &shader)
            .layout(&pipeline_layout)
            .vertex_buffers(vec![vertex_layout()])
            .format(COLOR_FORMAT)
            .depth(DEPTH_FORMAT)
            .build(device);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("wave_uniforms"),
            size: std::mem::size_of::<WaveUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let postprocess = PostProcessPipeline::new(device, width, height);
        let (scene, depth, readback) = Self::create_targets(device, width, height);

        Self {
            ctx,
            wave_pipeline,
            wave_layout,
            uniform_buffer,
            postprocess,
            scene,
            depth,
            readback,
            mesh: None,
            binding: None,
            width,
            height,
            last_frame: None,
        }
    }

    fn create_targets(device: &Device, width: u32, height: u32) -> (RenderTarget, RenderTarget, ReadbackBuffer) {
        (
            RenderTarget::output(device, "scene_target", width, height),
            RenderTarget::depth(device, width, height),
            ReadbackBuffer::new(device, width, height),
        )
    }

    /// Reallocate size-dependent targets. No-op if the size is unchanged.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (self.width, self.height) == (width, height) {
            return;
        }
        let (scene, depth, readback) = Self::create_targets(&self.ctx.device, width, height);
        self.scene = scene;
        self.depth = depth;
        self.readback = readback;
        self.postprocess.resize(&self.ctx.device, width, height);
        self.width = width;
        self.height = height;
        log::debug!("Renderer targets reallocated at {}x{}", width, height);
    }

    /// Bring GPU-side mesh and textures up to date with the app.
    fn sync_resources(&mut self, app: &App) {
        let (Some(text), Some(material)) = (app.text(), app.material()) else {
            self.mesh = None;
            self.binding = None;
            return;
        };

        let generation = app.asset_generation();
        let stale_mesh = self
            .mesh
            .as_ref()
            .map_or(true, |m| m.revision != text.revision())
            || self.binding.as_ref().map_or(true, |b| b.generation != generation);
        if stale_mesh {
            self.mesh = MeshBuffers::upload(&self.ctx, text);
        }

        let stale_binding = self
            .binding
            .as_ref()
            .map_or(true, |b| {
                b.generation != generation || b.atlas_revision != text.atlas_revision()
            });
        if stale_binding {
            let device = &self.ctx.device;
            let noise = match self.binding.take() {
                Some(old) if old.generation == generation => old.noise,
                _ => SampledTexture::from_noise(device, &self.ctx.queue, material.noise()),
            };
            let atlas = SampledTexture::from_atlas(device, &self.ctx.queue, text.atlas());
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("wave_bind_group"),
                layout: &self.wave_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: self.uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(atlas.view()),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(atlas.sampler()),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::TextureView(noise.view()),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: wgpu::BindingResource::Sampler(noise.sampler()),
                    },
                ],
            });
            self.binding = Some(MaterialBinding {
                generation,
                atlas_revision: text.atlas_revision(),
                noise,
                _atlas: atlas,
                bind_group,
            });
        }
    }

    /// Render one frame of `app`. Returns tightly packed RGBA8 pixels.
    ///
    /// Before assets are attached this produces a frame cleared to the
    /// render pass clear color with post-processing applied.
    pub fn render(&mut self, app: &App) -> Result<Vec<u8>, GpuError> {
        let surface = app.surface();
        self.resize(surface.width, surface.height);
        self.sync_resources(app);

        let view_proj = app.camera().view_projection_matrix();
        let time = app.material().map_or(0.0, |m| m.time);
        if let Some(material) = app.material() {
            let uniforms = material.to_uniforms(view_proj);
            self.ctx
                .queue
                .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        }

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });

        let [r, g, b] = app.passes().render.clear_color;
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.scene.view(),
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.depth.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let (Some(mesh), Some(binding)) = (&self.mesh, &self.binding) {
                pass.set_pipeline(&self.wave_pipeline);
                pass.set_bind_group(0, &binding.bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertices.slice(..));
                pass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        let result = self.postprocess.apply(
            &self.ctx.device,
            &self.ctx.queue,
            &mut encoder,
            app.passes(),
            self.scene.view(),
            time,
        );
        let final_target = result.unwrap_or(&self.scene);
        self.readback.copy_from(&mut encoder, final_target.texture());

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        self.readback.read_pixels(&self.ctx.device)
    }

    /// Pixels of the last frame drawn through [`FrameTarget::draw_frame`].
    pub fn last_frame(&self) -> Option<&[u8]> {
        self.last_frame.as_deref()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get GPU adapter info.
    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.ctx.adapter_info()
    }
}

impl FrameTarget for SceneRenderer {
    type Error = GpuError;

    fn draw_frame(&mut self, app: &App) -> Result<(), GpuError> {
        let pixels = self.render(app)?;
        self.last_frame = Some(pixels);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        SceneRenderer::resize(self, width, height);
    }
}
