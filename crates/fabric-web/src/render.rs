//! wgpu implementation of the four render passes.

mod grid;
mod helpers;
mod mesh;
mod post;
mod targets;

use fabric_core::constants::GRID_MULTIPLIER;
use fabric_core::{
    projection_matrix, Background, BloomParams, BloomUniforms, BlurParams, BlurUniforms,
    FadeUniforms, Globals, GridFrame, GridUniforms, MeshFrame, PassIo, RenderBackend, TargetId,
};
use web_sys as web;

use grid::GridPass;
use mesh::MeshPass;
use post::PostResources;
use targets::RenderTargets;

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    render_format: wgpu::TextureFormat,
    targets: RenderTargets,
    linear_sampler: wgpu::Sampler,
    mesh: MeshPass,
    grid: GridPass,
    post: PostResources,
    bg_blur: wgpu::BindGroup,  // samples frequencies
    bg_bloom: wgpu::BindGroup, // samples accumulation
    encoder: Option<wgpu::CommandEncoder>,
}

impl<'a> GpuState<'a> {
    pub async fn new(canvas: &'a web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU/WebGL adapter"))?;
        let info = adapter.get_info();
        log::info!("[gpu] adapter backend={:?} name={}", info.backend, info.name);
        let required_limits = if info.backend == wgpu::Backend::Gl {
            wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits())
        } else {
            wgpu::Limits::default()
        };
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits,
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let formats = crate::surface::choose(&caps.formats)
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: formats.surface,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: formats.view_formats(),
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let targets = RenderTargets::new(&device, width, height);
        let linear_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let mesh = MeshPass::new(&device);
        let grid = GridPass::new(&device, &targets.frequency_map_view, &linear_sampler)?;
        let post = post::create_post_resources(&device, formats.render)?;
        let bg_blur = helpers::sampled_pass_bind_group(
            &device,
            "bg_blur",
            &post.sampled_bgl,
            &targets.frequencies_view,
            &linear_sampler,
            &post.blur_uniforms,
        );
        let bg_bloom = helpers::sampled_pass_bind_group(
            &device,
            "bg_bloom",
            &post.sampled_bgl,
            &targets.accumulation_view,
            &linear_sampler,
            &post.bloom_uniforms,
        );
        log::info!(
            "[gpu] ready {}x{} surface={:?} render={:?}",
            width,
            height,
            formats.surface,
            formats.render
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            render_format: formats.render,
            targets,
            linear_sampler,
            mesh,
            grid,
            post,
            bg_blur,
            bg_bloom,
            encoder: None,
        })
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.config.width || height != self.config.height {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.targets.resize_accumulation(&self.device, width, height);
            self.bg_bloom = helpers::sampled_pass_bind_group(
                &self.device,
                "bg_bloom",
                &self.post.sampled_bgl,
                &self.targets.accumulation_view,
                &self.linear_sampler,
                &self.post.bloom_uniforms,
            );
            log::info!("[gpu] resized to {}x{}", width, height);
        }
    }

    /// Recover from a lost or outdated surface.
    pub fn reconfigure(&mut self) {
        self.encoder = None;
        self.surface.configure(&self.device, &self.config);
    }

    fn take_encoder(&mut self) -> wgpu::CommandEncoder {
        self.encoder.take().unwrap_or_else(|| {
            self.device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("frame") })
        })
    }
}

fn offscreen(targets: &RenderTargets, id: TargetId) -> anyhow::Result<&wgpu::TextureView> {
    targets
        .view(id)
        .ok_or_else(|| anyhow::anyhow!("{:?} is not an offscreen target", id))
}

impl RenderBackend for GpuState<'_> {
    type Error = anyhow::Error;

    fn rasterize(&mut self, io: PassIo, mesh: &MeshFrame<'_>) -> anyhow::Result<()> {
        let mut encoder = self.take_encoder();
        let target = offscreen(&self.targets, io.writes)?;
        self.mesh
            .encode(&self.device, &self.queue, &mut encoder, target, mesh);
        self.encoder = Some(encoder);
        Ok(())
    }

    fn directional_blur(&mut self, io: PassIo, params: &BlurParams) -> anyhow::Result<()> {
        debug_assert_eq!(io.reads, Some(TargetId::Frequencies));
        let u = BlurUniforms {
            direction: params.direction,
            resolution: self.targets.size(TargetId::Frequencies),
        };
        self.queue
            .write_buffer(&self.post.blur_uniforms, 0, bytemuck::bytes_of(&u));
        let mut encoder = self.take_encoder();
        post::blit(
            &mut encoder,
            "directional_blur",
            offscreen(&self.targets, io.writes)?,
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            &self.post.blur_pipeline,
            &self.bg_blur,
        );
        self.encoder = Some(encoder);
        Ok(())
    }

    fn composite(
        &mut self,
        io: PassIo,
        background: &Background,
        grid: &GridFrame<'_>,
    ) -> anyhow::Result<()> {
        debug_assert_eq!(io.reads, Some(TargetId::FrequencyMap));
        let globals = Globals {
            projection: projection_matrix(self.config.width, self.config.height).to_cols_array_2d(),
            view: grid.view,
            time: grid.time,
            _pad: [0.0; 3],
        };
        let uniforms = GridUniforms {
            color_offset: grid.color_offset,
            max_height: grid.max_height,
            multiplier: GRID_MULTIPLIER,
            basic_opacity: grid.basic_opacity,
            segments: grid.segments,
        };
        self.queue
            .write_buffer(&self.grid.globals, 0, bytemuck::bytes_of(&globals));
        self.queue
            .write_buffer(&self.grid.uniforms, 0, bytemuck::bytes_of(&uniforms));
        self.grid.upload(&self.device, &self.queue, grid.vertices);

        let load = match *background {
            Background::Clear([r, g, b, a]) => wgpu::LoadOp::Clear(wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: a as f64,
            }),
            Background::Fade { rgb: [r, g, b], alpha } => {
                let fade = FadeUniforms {
                    color: [r, g, b, alpha],
                };
                self.queue
                    .write_buffer(&self.post.fade_uniforms, 0, bytemuck::bytes_of(&fade));
                wgpu::LoadOp::Load
            }
        };

        let mut encoder = self.take_encoder();
        {
            let target = offscreen(&self.targets, io.writes)?;
            let mut rpass = helpers::begin_pass(&mut encoder, "composite", target, load);
            if matches!(background, Background::Fade { .. }) {
                rpass.set_pipeline(&self.post.fade_pipeline);
                rpass.set_bind_group(0, &self.post.fade_bind_group, &[]);
                rpass.draw(0..3, 0..1);
            }
            self.grid.draw(&mut rpass, grid.vertex_count);
        }
        self.encoder = Some(encoder);
        Ok(())
    }

    fn bloom(&mut self, io: PassIo, params: &BloomParams) -> anyhow::Result<()> {
        debug_assert_eq!(io.writes, TargetId::Screen);
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(e) => {
                self.encoder = None;
                return Err(e.into());
            }
        };
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.render_format),
            ..Default::default()
        });
        let u = BloomUniforms {
            params: [params.radius, params.blur_weight, params.original_weight, 0.0],
            resolution: self.targets.size(TargetId::Accumulation),
            _pad: [0.0; 2],
        };
        self.queue
            .write_buffer(&self.post.bloom_uniforms, 0, bytemuck::bytes_of(&u));
        let mut encoder = self.take_encoder();
        post::blit(
            &mut encoder,
            "bloom",
            &view,
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            &self.post.bloom_pipeline,
            &self.bg_bloom,
        );
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}
