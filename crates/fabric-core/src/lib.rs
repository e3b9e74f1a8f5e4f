pub mod audio;
pub mod camera;
pub mod constants;
pub mod delaunay;
pub mod error;
pub mod field;
pub mod graph;
pub mod grid;
pub mod pipeline;
pub mod scene;
pub mod settings;
pub mod spring;
pub mod uniforms;

pub static MESH_WGSL: &str = include_str!("../shaders/mesh.wgsl");
pub static BLUR_WGSL: &str = include_str!("../shaders/blur.wgsl");
pub static FADE_WGSL: &str = include_str!("../shaders/fade.wgsl");
pub static GRID_WGSL: &str = include_str!("../shaders/grid.wgsl");
pub static BLOOM_WGSL: &str = include_str!("../shaders/bloom.wgsl");

pub use audio::{FrequencySource, Silence};
pub use camera::{projection_matrix, OrbitCamera};
pub use error::BuildError;
pub use field::{FieldParams, FrequencyField};
pub use graph::{Graph, GraphParams, Point, Triangulation};
pub use grid::{Axis, GridLines, RetargetScheduler, RetargetStrategy};
pub use pipeline::*;
pub use scene::Scene;
pub use settings::{Change, SettingKey, SettingValue, Settings, SettingsError, SettingsStore};
pub use spring::Spring;
pub use uniforms::*;
