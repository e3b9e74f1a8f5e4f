//! Browser front-end: WebAudio analyser in, WebGPU/WebGL fabric out.

pub mod frame_slot;
pub mod surface;

#[cfg(target_arch = "wasm32")]
mod audio;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod frame;
#[cfg(target_arch = "wasm32")]
mod render;
#[cfg(target_arch = "wasm32")]
mod schedule;
#[cfg(target_arch = "wasm32")]
mod visualizer;

#[cfg(target_arch = "wasm32")]
pub use visualizer::{start, LoopHandle, Visualizer};
