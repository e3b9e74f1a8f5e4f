use super::helpers::{self, DynamicVertexBuffer, OFFSCREEN_FORMAT};
use fabric_core::MeshFrame;

const VERTEX_STRIDE: u64 = 3 * 4;

/// Rasterizes the triangulated height field as grayscale.
pub(crate) struct MeshPass {
    pipeline: wgpu::RenderPipeline,
    vertices: DynamicVertexBuffer,
}

impl MeshPass {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(fabric_core::MESH_WGSL.into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pl"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh_pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_mesh"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: VERTEX_STRIDE,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_mesh"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: OFFSCREEN_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });
        Self {
            pipeline,
            vertices: DynamicVertexBuffer::new(device, "mesh_vertices"),
        }
    }

    pub(crate) fn encode(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        mesh: &MeshFrame<'_>,
    ) {
        if mesh.dirty {
            self.vertices.upload(device, queue, mesh.positions);
        }
        let mut rpass = helpers::begin_pass(
            encoder,
            "rasterize_frequencies",
            target,
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
        );
        if mesh.vertex_count == 0 {
            return;
        }
        rpass.set_pipeline(&self.pipeline);
        rpass.set_vertex_buffer(0, self.vertices.slice(mesh.vertex_count as u64 * VERTEX_STRIDE));
        rpass.draw(0..mesh.vertex_count, 0..1);
    }
}
