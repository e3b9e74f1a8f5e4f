use super::helpers::{self, DynamicVertexBuffer, OFFSCREEN_FORMAT};
use fabric_core::{Globals, GridUniforms, GLOBALS_BLOCK, GRID_BLOCK, GRID_WGSL};

const VERTEX_STRIDE: u64 = 2 * 4;

/// Grid lines drawn into the accumulation target, displaced by the
/// frequency map.
pub(crate) struct GridPass {
    pipeline: wgpu::RenderPipeline,
    pub(crate) globals: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    pub(crate) uniforms: wgpu::Buffer,
    grid_bind_group: wgpu::BindGroup,
    vertices: DynamicVertexBuffer,
}

impl GridPass {
    pub(crate) fn new(
        device: &wgpu::Device,
        frequency_map: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> anyhow::Result<Self> {
        let vs_fs = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("grid_shader"),
            source: wgpu::ShaderSource::Wgsl(GRID_WGSL.into()),
        });
        let globals = helpers::create_uniform_buffer::<Globals>(
            device,
            "globals",
            &GLOBALS_BLOCK,
            GRID_WGSL,
        )?;
        let uniforms = helpers::create_uniform_buffer::<GridUniforms>(
            device,
            "grid_uniforms",
            &GRID_BLOCK,
            GRID_WGSL,
        )?;

        let globals_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bgl"),
            entries: &[helpers::uniform_entry(0, vs_fs)],
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bg"),
            layout: &globals_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals.as_entire_binding(),
            }],
        });
        // the frequency map is read in the vertex stage for displacement
        let grid_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("grid_bgl"),
            entries: &[
                helpers::uniform_entry(0, vs_fs),
                helpers::texture_entry(1, vs_fs),
                helpers::sampler_entry(2, vs_fs),
            ],
        });
        let grid_bind_group =
            Self::grid_bind_group(device, &grid_bgl, &uniforms, frequency_map, sampler);

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("grid_pl"),
            bind_group_layouts: &[&globals_bgl, &grid_bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("grid_pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_grid"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: VERTEX_STRIDE,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_grid"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: OFFSCREEN_FORMAT,
                    blend: Some(helpers::ACCUMULATE_BLEND),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        Ok(Self {
            pipeline,
            globals,
            globals_bind_group,
            uniforms,
            grid_bind_group,
            vertices: DynamicVertexBuffer::new(device, "grid_vertices"),
        })
    }

    fn grid_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniforms: &wgpu::Buffer,
        frequency_map: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("grid_bg"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(frequency_map),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    pub(crate) fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, vertices: &[f32]) {
        self.vertices.upload(device, queue, vertices);
    }

    /// Draw into an already-open pass on the accumulation target.
    pub(crate) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, vertex_count: u32) {
        if vertex_count == 0 {
            return;
        }
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.globals_bind_group, &[]);
        rpass.set_bind_group(1, &self.grid_bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertices.slice(vertex_count as u64 * VERTEX_STRIDE));
        rpass.draw(0..vertex_count, 0..1);
    }
}
