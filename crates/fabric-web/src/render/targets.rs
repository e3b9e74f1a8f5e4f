use super::helpers::{self, OFFSCREEN_FORMAT};
use fabric_core::constants::FREQUENCY_TARGET_SIZE;
use fabric_core::TargetId;

/// Offscreen color targets for the four passes.
///
/// - `frequencies` holds the grayscale height raster (fixed size).
/// - `frequency_map` holds its directional blur, sampled by the grid (fixed size).
/// - `accumulation` is canvas-sized and never cleared while motion blur is on.
pub(crate) struct RenderTargets {
    pub(crate) frequencies: wgpu::Texture,
    pub(crate) frequencies_view: wgpu::TextureView,
    pub(crate) frequency_map: wgpu::Texture,
    pub(crate) frequency_map_view: wgpu::TextureView,
    pub(crate) accumulation: wgpu::Texture,
    pub(crate) accumulation_view: wgpu::TextureView,
}

impl RenderTargets {
    pub(crate) fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let size = FREQUENCY_TARGET_SIZE;
        let (frequencies, frequencies_view) =
            helpers::create_color_texture(device, "frequencies", size, size, OFFSCREEN_FORMAT);
        let (frequency_map, frequency_map_view) =
            helpers::create_color_texture(device, "frequency_map", size, size, OFFSCREEN_FORMAT);
        let (accumulation, accumulation_view) =
            helpers::create_color_texture(device, "accumulation", width, height, OFFSCREEN_FORMAT);
        Self {
            frequencies,
            frequencies_view,
            frequency_map,
            frequency_map_view,
            accumulation,
            accumulation_view,
        }
    }

    /// Only the canvas-sized target follows the canvas.
    pub(crate) fn resize_accumulation(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        (self.accumulation, self.accumulation_view) =
            helpers::create_color_texture(device, "accumulation", width, height, OFFSCREEN_FORMAT);
    }

    pub(crate) fn view(&self, id: TargetId) -> Option<&wgpu::TextureView> {
        match id {
            TargetId::Frequencies => Some(&self.frequencies_view),
            TargetId::FrequencyMap => Some(&self.frequency_map_view),
            TargetId::Accumulation => Some(&self.accumulation_view),
            TargetId::Screen => None,
        }
    }

    pub(crate) fn size(&self, id: TargetId) -> [f32; 2] {
        let tex = match id {
            TargetId::Frequencies => &self.frequencies,
            TargetId::FrequencyMap => &self.frequency_map,
            // the canvas tracks the accumulation size
            TargetId::Accumulation | TargetId::Screen => &self.accumulation,
        };
        [tex.width() as f32, tex.height() as f32]
    }
}
