//! Post-processing pipeline: bloom and film grain.
//!
//! Runs the enabled passes of a [`PassChain`] over the rendered scene:
//! 1. Bloom: extract bright areas, blur them (horizontal + vertical, ping-pong),
//!    add the result back onto the scene
//! 2. Film: animated grain, optionally grayscale
//!
//! Disabled passes are skipped; the returned target is whichever pass ran last.

use wgpu::{BindGroupLayout, Buffer, Device, Queue, RenderPipeline, Sampler, TextureView};

use super::layouts::{create_bloom_layout, create_blur_layout, create_film_layout};
use super::pipelines::{create_fullscreen_pipeline, create_pipeline_layout};
use super::textures::{RenderTarget, COLOR_FORMAT};
use crate::postprocess::{BloomPass, FilmPass, PassChain, PassKind};

/// Horizontal + vertical blur iterations per frame.
const BLUR_ITERATIONS: u32 = 2;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct BlurUniforms {
    direction: [f32; 2],
    texel_size: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct BloomUniforms {
    threshold: f32,
    strength: f32,
    _padding: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct FilmUniforms {
    time: f32,
    intensity: f32,
    grayscale: u32,
    _padding: f32,
}

/// Size-dependent targets, recreated on resize.
struct Targets {
    width: u32,
    height: u32,
    bloom_a: RenderTarget,
    bloom_b: RenderTarget,
    bloom_out: RenderTarget,
    film_out: RenderTarget,
}

impl Targets {
    fn new(device: &Device, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bloom_a: RenderTarget::intermediate(device, "bloom_a", width, height),
            bloom_b: RenderTarget::intermediate(device, "bloom_b", width, height),
            bloom_out: RenderTarget::output(device, "bloom_out", width, height),
            film_out: RenderTarget::output(device, "film_out", width, height),
        }
    }
}

/// GPU side of the post-processing pass chain.
pub struct PostProcessPipeline {
    blur_pipeline: RenderPipeline,
    extract_pipeline: RenderPipeline,
    composite_pipeline: RenderPipeline,
    film_pipeline: RenderPipeline,

    blur_layout: BindGroupLayout,
    bloom_layout: BindGroupLayout,
    film_layout: BindGroupLayout,

    // One buffer per blur direction; both are written before the encoder is submitted.
    blur_h_uniforms: Buffer,
    blur_v_uniforms: Buffer,
    bloom_uniforms: Buffer,
    film_uniforms: Buffer,

    sampler: Sampler,
    targets: Targets,
}

impl PostProcessPipeline {
    pub fn new(device: &Device, width: u32, height: u32) -> Self {
        let blur_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blur_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/blur.wgsl").into()),
        });
        let bloom_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("bloom_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/bloom.wgsl").into()),
        });
        let film_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("film_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/film.wgsl").into()),
        });

        let blur_layout = create_blur_layout(device);
        let bloom_layout = create_bloom_layout(device);
        let film_layout = create_film_layout(device);

        let blur_pipeline_layout = create_pipeline_layout(device, "blur_pipeline_layout", &[&blur_layout]);
        let bloom_pipeline_layout = create_pipeline_layout(device, "bloom_pipeline_layout", &[&bloom_layout]);
        let film_pipeline_layout = create_pipeline_layout(device, "film_pipeline_layout", &[&film_layout]);

        let blur_pipeline = create_fullscreen_pipeline(
            device,
            "blur_pipeline",
            &blur_pipeline_layout,
            &blur_shader,
            "fs_main",
            COLOR_FORMAT,
        );
        let extract_pipeline = create_fullscreen_pipeline(
            device,
            "bloom_extract_pipeline",
            &bloom_pipeline_layout,
            &bloom_shader,
            "fs_extract",
            COLOR_FORMAT,
        );
        let composite_pipeline = create_fullscreen_pipeline(
            device,
            "bloom_composite_pipeline",
            &bloom_pipeline_layout,
            &bloom_shader,
            "fs_composite",
            COLOR_FORMAT,
        );
        let film_pipeline = create_fullscreen_pipeline(
            device,
            "film_pipeline",
            &film_pipeline_layout,
            &film_shader,
            "fs_main",
            COLOR_FORMAT,
        );

        let uniform_buffer = |label: &'static str, size: usize| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: size as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let blur_h_uniforms = uniform_buffer("blur_h_uniforms", std::mem::size_of::<BlurUniforms>());
        let blur_v_uniforms = uniform_buffer("blur_v_uniforms", std::mem::size_of::<BlurUniforms>());
        let bloom_uniforms = uniform_buffer("bloom_uniforms", std::mem::size_of::<BloomUniforms>());
        let film_uniforms = uniform_buffer("film_uniforms", std::mem::size_of::<FilmUniforms>());

        // Linear filtering for smooth blur
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("postprocess_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        Self {
            blur_pipeline,
            extract_pipeline,
            composite_pipeline,
            film_pipeline,
            blur_layout,
            bloom_layout,
            film_layout,
            blur_h_uniforms,
            blur_v_uniforms,
            bloom_uniforms,
            film_uniforms,
            sampler,
            targets: Targets::new(device, width, height),
        }
    }

    /// Reallocate the intermediate targets if the size changed.
    pub fn resize(&mut self, device: &Device, width: u32, height: u32) {
        if (self.targets.width, self.targets.height) != (width, height) {
            self.targets = Targets::new(device, width, height);
        }
    }

    /// Encode the enabled passes of `chain` over `scene`.
    ///
    /// Returns the target holding the final image, or `None` when neither
    /// bloom nor film ran and `scene` is already the result.
    pub fn apply(
        &self,
        device: &Device,
        queue: &Queue,
        encoder: &mut wgpu::CommandEncoder,
        chain: &PassChain,
        scene: &TextureView,
        time: f32,
    ) -> Option<&RenderTarget> {
        let mut current: Option<&RenderTarget> = None;

        for kind in chain.passes() {
            let input = current.map_or(scene, |t| t.view());
            current = match kind {
                PassKind::Render => continue,
                PassKind::Bloom => Some(self.bloom(device, queue, encoder, &chain.bloom, input)),
                PassKind::Film => Some(self.film(device, queue, encoder, &chain.film, input, time)),
            };
        }

        current
    }

    fn bloom(
        &self,
        device: &Device,
        queue: &Queue,
        encoder: &mut wgpu::CommandEncoder,
        pass: &BloomPass,
        input: &TextureView,
    ) -> &RenderTarget {
        let uniforms = BloomUniforms {
            threshold: pass.threshold,
            strength: pass.strength,
            _padding: [0.0; 2],
        };
        queue.write_buffer(&self.bloom_uniforms, 0, bytemuck::bytes_of(&uniforms));

        // Larger radius spreads the blur taps further apart.
        let spread = 1.0 + pass.radius;
        let texel_size = [
            spread / self.targets.width.max(1) as f32,
            spread / self.targets.height.max(1) as f32,
        ];
        let horizontal = BlurUniforms {
            direction: [1.0, 0.0],
            texel_size,
        };
        let vertical = BlurUniforms {
            direction: [0.0, 1.0],
            texel_size,
        };
        queue.write_buffer(&self.blur_h_uniforms, 0, bytemuck::bytes_of(&horizontal));
        queue.write_buffer(&self.blur_v_uniforms, 0, bytemuck::bytes_of(&vertical));

        // Extract bright areas -> bloom_a
        let extract_bind_group = self.bloom_bind_group(device, "bloom_extract_bind_group", input, input);
        fullscreen_pass(
            encoder,
            "bloom_extract_pass",
            self.targets.bloom_a.view(),
            &self.extract_pipeline,
            &extract_bind_group,
        );

        // Blur a -> b -> a
        for _ in 0..BLUR_ITERATIONS {
            self.blur(device, encoder, &self.blur_h_uniforms, &self.targets.bloom_a, &self.targets.bloom_b);
            self.blur(device, encoder, &self.blur_v_uniforms, &self.targets.bloom_b, &self.targets.bloom_a);
        }

        // Composite scene + bloom -> bloom_out
        let composite_bind_group = self.bloom_bind_group(
            device,
            "bloom_composite_bind_group",
            input,
            self.targets.bloom_a.view(),
        );
        fullscreen_pass(
            encoder,
            "bloom_composite_pass",
            self.targets.bloom_out.view(),
            &self.composite_pipeline,
            &composite_bind_group,
        );

        &self.targets.bloom_out
    }

    fn blur(
        &self,
        device: &Device,
        encoder: &mut wgpu::CommandEncoder,
        uniforms: &Buffer,
        input: &RenderTarget,
        output: &RenderTarget,
    ) {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blur_bind_group"),
            layout: &self.blur_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(input.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        fullscreen_pass(encoder, "blur_pass", output.view(), &self.blur_pipeline, &bind_group);
    }

    fn film(
        &self,
        device: &Device,
        queue: &Queue,
        encoder: &mut wgpu::CommandEncoder,
        pass: &FilmPass,
        input: &TextureView,
        time: f32,
    ) -> &RenderTarget {
        let uniforms = FilmUniforms {
            time,
            intensity: pass.noise_intensity,
            grayscale: u32::from(pass.grayscale),
            _padding: 0.0,
        };
        queue.write_buffer(&self.film_uniforms, 0, bytemuck::bytes_of(&uniforms));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("film_bind_group"),
            layout: &self.film_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.film_uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(input),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        fullscreen_pass(
            encoder,
            "film_pass",
            self.targets.film_out.view(),
            &self.film_pipeline,
            &bind_group,
        );

        &self.targets.film_out
    }

    fn bloom_bind_group(
        &self,
        device: &Device,
        label: &'static str,
        scene: &TextureView,
        bloom: &TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.bloom_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.bloom_uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(scene),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(bloom),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}

fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &'static str,
    output: &TextureView,
    pipeline: &RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: output,
            resolve_target: None,
            depth_slice: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });

    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::GpuContext;

    #[tokio::test]
    async fn test_postprocess_pipeline_creation() {
        let ctx = match GpuContext::new().await {
            Ok(ctx) => ctx,
            Err(_) => {
                eprintln!("Skipping test - GPU not available");
                return;
            }
        };

        let mut pipeline = PostProcessPipeline::new(&ctx.device, 256, 256);
        pipeline.resize(&ctx.device, 128, 64);
        assert_eq!((pipeline.targets.width, pipeline.targets.height), (128, 64));
    }
}
