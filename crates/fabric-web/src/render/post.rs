//! Full-screen passes: directional blur, motion-blur fade and bloom.

use super::helpers::{self, OFFSCREEN_FORMAT};
use fabric_core::{
    BloomUniforms, BlurUniforms, FadeUniforms, BLOOM_BLOCK, BLOOM_WGSL, BLUR_BLOCK, BLUR_WGSL,
    FADE_BLOCK, FADE_WGSL,
};

pub(crate) struct PostResources {
    pub(crate) sampled_bgl: wgpu::BindGroupLayout, // tex+sampler+uniform
    pub(crate) blur_uniforms: wgpu::Buffer,
    pub(crate) blur_pipeline: wgpu::RenderPipeline,
    pub(crate) fade_uniforms: wgpu::Buffer,
    pub(crate) fade_bind_group: wgpu::BindGroup,
    pub(crate) fade_pipeline: wgpu::RenderPipeline,
    pub(crate) bloom_uniforms: wgpu::Buffer,
    pub(crate) bloom_pipeline: wgpu::RenderPipeline,
}

pub(crate) fn create_post_resources(
    device: &wgpu::Device,
    swap_format: wgpu::TextureFormat,
) -> anyhow::Result<PostResources> {
    let sampled_bgl = helpers::sampled_pass_layout(device, "sampled_bgl");
    let sampled_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("sampled_pl"),
        bind_group_layouts: &[&sampled_bgl],
        push_constant_ranges: &[],
    });

    let blur_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("blur_shader"),
        source: wgpu::ShaderSource::Wgsl(BLUR_WGSL.into()),
    });
    let blur_uniforms = helpers::create_uniform_buffer::<BlurUniforms>(
        device,
        "blur_uniforms",
        &BLUR_BLOCK,
        BLUR_WGSL,
    )?;
    let blur_pipeline = helpers::make_fullscreen_pipeline(
        device,
        "blur_pipeline",
        &sampled_pl,
        &blur_shader,
        "fs_blur",
        OFFSCREEN_FORMAT,
        None,
    );

    let fade_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fade_shader"),
        source: wgpu::ShaderSource::Wgsl(FADE_WGSL.into()),
    });
    let fade_uniforms = helpers::create_uniform_buffer::<FadeUniforms>(
        device,
        "fade_uniforms",
        &FADE_BLOCK,
        FADE_WGSL,
    )?;
    let fade_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("fade_bgl"),
        entries: &[helpers::uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
    });
    let fade_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("fade_bg"),
        layout: &fade_bgl,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: fade_uniforms.as_entire_binding(),
        }],
    });
    let fade_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("fade_pl"),
        bind_group_layouts: &[&fade_bgl],
        push_constant_ranges: &[],
    });
    let fade_pipeline = helpers::make_fullscreen_pipeline(
        device,
        "fade_pipeline",
        &fade_pl,
        &fade_shader,
        "fs_fade",
        OFFSCREEN_FORMAT,
        Some(helpers::ACCUMULATE_BLEND),
    );

    let bloom_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("bloom_shader"),
        source: wgpu::ShaderSource::Wgsl(BLOOM_WGSL.into()),
    });
    let bloom_uniforms = helpers::create_uniform_buffer::<BloomUniforms>(
        device,
        "bloom_uniforms",
        &BLOOM_BLOCK,
        BLOOM_WGSL,
    )?;
    let bloom_pipeline = helpers::make_fullscreen_pipeline(
        device,
        "bloom_pipeline",
        &sampled_pl,
        &bloom_shader,
        "fs_bloom",
        swap_format,
        None,
    );

    Ok(PostResources {
        sampled_bgl,
        blur_uniforms,
        blur_pipeline,
        fade_uniforms,
        fade_bind_group,
        fade_pipeline,
        bloom_uniforms,
        bloom_pipeline,
    })
}

pub(crate) fn blit(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    load: wgpu::LoadOp<wgpu::Color>,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut r = helpers::begin_pass(encoder, label, target, load);
    r.set_pipeline(pipeline);
    r.set_bind_group(0, bind_group, &[]);
    r.draw(0..3, 0..1);
}
