//! Host-side uniform layouts and the descriptors that tie them to WGSL.
//!
//! Every uniform struct the renderer uploads has a static [`UniformBlock`]
//! naming its fields, their WGSL types and how often they change. Pipelines
//! call [`UniformBlock::validate`] when they are built, so a shader edit that
//! drifts from the host struct fails at construction rather than drawing
//! garbage.

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformKind {
    F32,
    I32,
    Vec2,
    Vec4,
    Mat4,
}

impl UniformKind {
    pub fn wgsl(self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::I32 => "i32",
            Self::Vec2 => "vec2<f32>",
            Self::Vec4 => "vec4<f32>",
            Self::Mat4 => "mat4x4<f32>",
        }
    }

    pub fn size(self) -> usize {
        match self {
            Self::F32 | Self::I32 => 4,
            Self::Vec2 => 8,
            Self::Vec4 => 16,
            Self::Mat4 => 64,
        }
    }

    pub fn align(self) -> usize {
        match self {
            Self::F32 | Self::I32 => 4,
            Self::Vec2 => 8,
            Self::Vec4 | Self::Mat4 => 16,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateRate {
    PerFrame,
    OnSettingsChange,
    OnResize,
}

#[derive(Clone, Copy, Debug)]
pub struct UniformField {
    pub name: &'static str,
    pub kind: UniformKind,
    pub rate: UpdateRate,
}

const fn field(name: &'static str, kind: UniformKind, rate: UpdateRate) -> UniformField {
    UniformField { name, kind, rate }
}

#[derive(Clone, Copy, Debug)]
pub struct UniformBlock {
    pub wgsl_struct: &'static str,
    pub fields: &'static [UniformField],
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShaderLayoutError {
    #[error("struct `{0}` not found in shader source")]
    MissingStruct(&'static str),
    #[error("struct `{block}` field {index}: expected `{expected}`, found `{found}`")]
    FieldMismatch {
        block: &'static str,
        index: usize,
        expected: String,
        found: String,
    },
    #[error("struct `{block}` has {found} fields, descriptor lists {expected}")]
    FieldCount {
        block: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("struct `{block}` is {gpu} bytes on the GPU but {host} bytes on the host")]
    SizeMismatch {
        block: &'static str,
        gpu: usize,
        host: usize,
    },
}

#[inline]
fn round_up(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}

impl UniformBlock {
    /// Byte size under WGSL uniform address-space layout rules.
    pub fn byte_size(&self) -> usize {
        let mut offset = 0;
        let mut max_align = 1;
        for f in self.fields {
            offset = round_up(offset, f.kind.align()) + f.kind.size();
            max_align = max_align.max(f.kind.align());
        }
        round_up(offset, max_align.max(16))
    }

    pub fn fields_updated(&self, rate: UpdateRate) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter(move |f| f.rate == rate).map(|f| f.name)
    }

    /// Check the WGSL struct matches this descriptor field by field and that
    /// the host struct occupies exactly the GPU layout size.
    pub fn validate(&self, source: &str, host_size: usize) -> Result<(), ShaderLayoutError> {
        let declared = parse_struct(source, self.wgsl_struct)
            .ok_or(ShaderLayoutError::MissingStruct(self.wgsl_struct))?;
        if declared.len() != self.fields.len() {
            return Err(ShaderLayoutError::FieldCount {
                block: self.wgsl_struct,
                expected: self.fields.len(),
                found: declared.len(),
            });
        }
        for (index, (f, (name, ty))) in self.fields.iter().zip(&declared).enumerate() {
            if f.name != name || f.kind.wgsl() != ty {
                return Err(ShaderLayoutError::FieldMismatch {
                    block: self.wgsl_struct,
                    index,
                    expected: format!("{}: {}", f.name, f.kind.wgsl()),
                    found: format!("{name}: {ty}"),
                });
            }
        }
        let gpu = self.byte_size();
        if gpu != host_size {
            return Err(ShaderLayoutError::SizeMismatch {
                block: self.wgsl_struct,
                gpu,
                host: host_size,
            });
        }
        Ok(())
    }
}

/// Extract `(name, type)` pairs of a WGSL struct, whitespace-insensitive.
fn parse_struct(source: &str, name: &str) -> Option<Vec<(String, String)>> {
    let header = format!("struct {name}");
    let start = source.match_indices(&header).find_map(|(i, _)| {
        let rest = &source[i + header.len()..];
        rest.trim_start().starts_with('{').then_some(i + header.len())
    })?;
    let body_start = start + source[start..].find('{')? + 1;
    let body_end = body_start + source[body_start..].find('}')?;
    let fields = source[body_start..body_end]
        .lines()
        .map(|l| l.split("//").next().unwrap_or(""))
        .collect::<Vec<_>>()
        .join(" ")
        .split(',')
        .filter_map(|decl| {
            let (n, t) = decl.split_once(':')?;
            let ty: String = t.chars().filter(|c| !c.is_whitespace()).collect();
            Some((n.trim().to_string(), ty))
        })
        .collect();
    Some(fields)
}

use UniformKind::*;
use UpdateRate::*;

pub const BLUR_BLOCK: UniformBlock = UniformBlock {
    wgsl_struct: "BlurUniforms",
    fields: &[
        field("direction", Vec2, OnSettingsChange),
        field("resolution", Vec2, OnResize),
    ],
};

pub const GLOBALS_BLOCK: UniformBlock = UniformBlock {
    wgsl_struct: "Globals",
    fields: &[
        field("projection", Mat4, OnResize),
        field("view", Mat4, PerFrame),
        field("time", F32, PerFrame),
    ],
};

pub const GRID_BLOCK: UniformBlock = UniformBlock {
    wgsl_struct: "GridUniforms",
    fields: &[
        field("color_offset", Vec4, OnSettingsChange),
        field("max_height", F32, OnSettingsChange),
        field("multiplier", F32, OnSettingsChange),
        field("basic_opacity", F32, OnSettingsChange),
        field("segments", I32, OnSettingsChange),
    ],
};

pub const FADE_BLOCK: UniformBlock = UniformBlock {
    wgsl_struct: "FadeUniforms",
    fields: &[field("color", Vec4, OnSettingsChange)],
};

pub const BLOOM_BLOCK: UniformBlock = UniformBlock {
    wgsl_struct: "BloomUniforms",
    fields: &[
        field("params", Vec4, OnSettingsChange), // radius, blur weight, original weight, unused
        field("resolution", Vec2, OnResize),
    ],
};

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlurUniforms {
    pub direction: [f32; 2],
    pub resolution: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Globals {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub time: f32,
    pub _pad: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GridUniforms {
    pub color_offset: [f32; 4],
    pub max_height: f32,
    pub multiplier: f32,
    pub basic_opacity: f32,
    pub segments: i32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FadeUniforms {
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BloomUniforms {
    pub params: [f32; 4],
    pub resolution: [f32; 2],
    pub _pad: [f32; 2],
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn layout_sizes_follow_wgsl_rules() {
        assert_eq!(BLUR_BLOCK.byte_size(), 16);
        assert_eq!(GLOBALS_BLOCK.byte_size(), 144);
        assert_eq!(GRID_BLOCK.byte_size(), 32);
        assert_eq!(FADE_BLOCK.byte_size(), 16);
        assert_eq!(BLOOM_BLOCK.byte_size(), 32);
    }

    #[test]
    fn host_structs_match_descriptors() {
        assert_eq!(size_of::<BlurUniforms>(), BLUR_BLOCK.byte_size());
        assert_eq!(size_of::<Globals>(), GLOBALS_BLOCK.byte_size());
        assert_eq!(size_of::<GridUniforms>(), GRID_BLOCK.byte_size());
        assert_eq!(size_of::<FadeUniforms>(), FADE_BLOCK.byte_size());
        assert_eq!(size_of::<BloomUniforms>(), BLOOM_BLOCK.byte_size());
    }

    #[test]
    fn parse_ignores_comments_and_spacing() {
        let src = "struct Foo {\n  a : vec2< f32 >, // note\n  b: f32,\n};";
        let fields = parse_struct(src, "Foo").unwrap();
        assert_eq!(
            fields,
            vec![("a".to_string(), "vec2<f32>".to_string()), ("b".to_string(), "f32".to_string())]
        );
        assert!(parse_struct(src, "Fo").is_none());
    }

    #[test]
    fn mismatched_field_is_reported() {
        let src = "struct FadeUniforms { colour: vec4<f32> };";
        let err = FADE_BLOCK.validate(src, 16).unwrap_err();
        assert!(matches!(err, ShaderLayoutError::FieldMismatch { index: 0, .. }));
    }

    #[test]
    fn host_size_drift_is_reported() {
        let src = "struct FadeUniforms { color: vec4<f32> };";
        assert_eq!(
            FADE_BLOCK.validate(src, 32),
            Err(ShaderLayoutError::SizeMismatch {
                block: "FadeUniforms",
                gpu: 16,
                host: 32
            })
        );
    }

    #[test]
    fn per_frame_fields_are_listed() {
        let names: Vec<_> = GLOBALS_BLOCK.fields_updated(UpdateRate::PerFrame).collect();
        assert_eq!(names, vec!["view", "time"]);
    }
}
