//! Swapchain format choice.
//!
//! The offscreen targets are plain `Rgba8Unorm` and the bloom pass writes its
//! weighted sum straight to the canvas, so the view we render into must not
//! apply an sRGB encode on store.

use wgpu::TextureFormat;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceFormats {
    /// Format the surface is configured with.
    pub surface: TextureFormat,
    /// Format of the views the bloom pass renders into.
    pub render: TextureFormat,
}

impl SurfaceFormats {
    /// Extra view formats the surface must allow.
    pub fn view_formats(&self) -> Vec<TextureFormat> {
        if self.render == self.surface {
            Vec::new()
        } else {
            vec![self.render]
        }
    }
}

/// Pick from the formats a surface reports, preferring a non-sRGB one. An
/// sRGB-only surface is rendered through a view with the suffix stripped.
pub fn choose(formats: &[TextureFormat]) -> Option<SurfaceFormats> {
    if let Some(&linear) = formats.iter().find(|f| !f.is_srgb()) {
        return Some(SurfaceFormats {
            surface: linear,
            render: linear,
        });
    }
    formats.first().map(|&surface| SurfaceFormats {
        surface,
        render: surface.remove_srgb_suffix(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_a_non_srgb_format() {
        let picked = choose(&[TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm]).unwrap();
        assert_eq!(picked.surface, TextureFormat::Bgra8Unorm);
        assert_eq!(picked.render, TextureFormat::Bgra8Unorm);
        assert!(picked.view_formats().is_empty());
    }

    #[test]
    fn srgb_only_surface_renders_through_stripped_view() {
        let picked = choose(&[TextureFormat::Rgba8UnormSrgb]).unwrap();
        assert_eq!(picked.surface, TextureFormat::Rgba8UnormSrgb);
        assert_eq!(picked.render, TextureFormat::Rgba8Unorm);
        assert!(!picked.render.is_srgb());
        assert_eq!(picked.view_formats(), vec![TextureFormat::Rgba8Unorm]);
    }

    #[test]
    fn empty_capabilities_yield_nothing() {
        assert_eq!(choose(&[]), None);
    }
}
