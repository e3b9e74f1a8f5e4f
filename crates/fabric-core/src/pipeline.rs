//! Ordered render passes for one frame.
//!
//! The four passes form a strict chain: each reads the target the previous
//! one wrote. [`Frame`] encodes that chain as a typestate so a pass can only
//! be issued once its input exists:
//!
//! ```text
//! Frame::begin -> rasterize -> Rasterized -> blur -> Blurred
//!              -> composite -> Composited -> bloom -> Presented
//! ```
//!
//! The GPU implementation and the test stubs both sit behind
//! [`RenderBackend`].

/// Render destinations, in pipeline order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetId {
    /// 512x512 grayscale height raster.
    Frequencies,
    /// 512x512 directionally blurred raster sampled by the grid.
    FrequencyMap,
    /// Canvas-sized target that motion blur accumulates into.
    Accumulation,
    /// Visible canvas.
    Screen,
}

/// What a pass reads and where it writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassIo {
    pub reads: Option<TargetId>,
    pub writes: TargetId,
}

/// Vertex stream of the triangulated height field.
#[derive(Clone, Copy, Debug)]
pub struct MeshFrame<'a> {
    pub positions: &'a [f32],
    pub vertex_count: u32,
    /// Whether `positions` changed since the last upload.
    pub dirty: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlurParams {
    pub direction: [f32; 2],
}

/// How the accumulation target is prepared before the grid is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Background {
    Clear([f32; 4]),
    /// Blend the background color over the previous contents with this alpha.
    Fade { rgb: [f32; 3], alpha: f32 },
}

impl Background {
    pub fn new(rgba: [f32; 4], motion_blur: bool, amount: f32) -> Self {
        if motion_blur {
            Self::Fade {
                rgb: [rgba[0], rgba[1], rgba[2]],
                alpha: amount,
            }
        } else {
            Self::Clear(rgba)
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GridFrame<'a> {
    pub vertices: &'a [f32],
    pub vertex_count: u32,
    pub view: [[f32; 4]; 4],
    pub time: f32,
    pub color_offset: [f32; 4],
    pub max_height: f32,
    pub basic_opacity: f32,
    pub segments: i32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BloomParams {
    pub radius: f32,
    pub blur_weight: f32,
    pub original_weight: f32,
}

pub const RASTER_IO: PassIo = PassIo {
    reads: None,
    writes: TargetId::Frequencies,
};
pub const BLUR_IO: PassIo = PassIo {
    reads: Some(TargetId::Frequencies),
    writes: TargetId::FrequencyMap,
};
pub const COMPOSITE_IO: PassIo = PassIo {
    reads: Some(TargetId::FrequencyMap),
    writes: TargetId::Accumulation,
};
pub const BLOOM_IO: PassIo = PassIo {
    reads: Some(TargetId::Accumulation),
    writes: TargetId::Screen,
};

/// One implementation per execution environment: wgpu in the browser,
/// recording stubs in tests.
pub trait RenderBackend {
    type Error;

    fn rasterize(&mut self, io: PassIo, mesh: &MeshFrame<'_>) -> Result<(), Self::Error>;
    fn directional_blur(&mut self, io: PassIo, params: &BlurParams) -> Result<(), Self::Error>;
    fn composite(
        &mut self,
        io: PassIo,
        background: &Background,
        grid: &GridFrame<'_>,
    ) -> Result<(), Self::Error>;
    fn bloom(&mut self, io: PassIo, params: &BloomParams) -> Result<(), Self::Error>;
}

/// Start of a frame; nothing has been drawn yet.
pub struct Frame<'b, B: RenderBackend> {
    backend: &'b mut B,
}

/// The height raster is in [`TargetId::Frequencies`].
pub struct Rasterized<'b, B: RenderBackend> {
    backend: &'b mut B,
}

/// The frequency map is in [`TargetId::FrequencyMap`].
pub struct Blurred<'b, B: RenderBackend> {
    backend: &'b mut B,
}

/// Background and grid are in [`TargetId::Accumulation`].
pub struct Composited<'b, B: RenderBackend> {
    backend: &'b mut B,
}

/// The frame has reached the screen.
#[derive(Debug)]
pub struct Presented;

impl<'b, B: RenderBackend> Frame<'b, B> {
    pub fn begin(backend: &'b mut B) -> Self {
        Self { backend }
    }

    pub fn rasterize(self, mesh: &MeshFrame<'_>) -> Result<Rasterized<'b, B>, B::Error> {
        self.backend.rasterize(RASTER_IO, mesh)?;
        Ok(Rasterized {
            backend: self.backend,
        })
    }
}

impl<'b, B: RenderBackend> Rasterized<'b, B> {
    pub fn blur(self, params: &BlurParams) -> Result<Blurred<'b, B>, B::Error> {
        self.backend.directional_blur(BLUR_IO, params)?;
        Ok(Blurred {
            backend: self.backend,
        })
    }
}

impl<'b, B: RenderBackend> Blurred<'b, B> {
    pub fn composite(
        self,
        background: &Background,
        grid: &GridFrame<'_>,
    ) -> Result<Composited<'b, B>, B::Error> {
        self.backend.composite(COMPOSITE_IO, background, grid)?;
        Ok(Composited {
            backend: self.backend,
        })
    }
}

impl<'b, B: RenderBackend> Composited<'b, B> {
    pub fn bloom(self, params: &BloomParams) -> Result<Presented, B::Error> {
        self.backend.bloom(BLOOM_IO, params)?;
        Ok(Presented)
    }
}

/// CPU reference of the accumulation blend:
/// color `src * a_src + dst * (1 - a_src)`, alpha `a_src + a_dst`.
///
/// The GPU blend state in the web renderer is built from the same factors.
#[inline]
pub fn blend_over(dst: [f32; 4], src: [f32; 4]) -> [f32; 4] {
    let a = src[3];
    [
        src[0] * a + dst[0] * (1.0 - a),
        src[1] * a + dst[1] * (1.0 - a),
        src[2] * a + dst[2] * (1.0 - a),
        (a + dst[3]).min(1.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_chain_links_each_write_to_next_read() {
        let chain = [RASTER_IO, BLUR_IO, COMPOSITE_IO, BLOOM_IO];
        for pair in chain.windows(2) {
            assert_eq!(pair[1].reads, Some(pair[0].writes));
        }
        assert_eq!(chain[0].reads, None);
        assert_eq!(chain[3].writes, TargetId::Screen);
    }

    #[test]
    fn motion_blur_selects_fade() {
        let bg = Background::new([0.2, 0.3, 0.4, 1.0], true, 0.45);
        assert_eq!(
            bg,
            Background::Fade {
                rgb: [0.2, 0.3, 0.4],
                alpha: 0.45
            }
        );
        let bg = Background::new([0.2, 0.3, 0.4, 1.0], false, 0.45);
        assert_eq!(bg, Background::Clear([0.2, 0.3, 0.4, 1.0]));
    }

    #[test]
    fn opaque_source_replaces_destination() {
        let out = blend_over([0.9, 0.1, 0.5, 0.0], [0.2, 0.3, 0.4, 1.0]);
        assert_eq!(out, [0.2, 0.3, 0.4, 1.0]);
    }
}
