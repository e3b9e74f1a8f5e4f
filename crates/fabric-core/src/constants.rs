use glam::Vec3;

// Shared tuning constants used by the core and the web front-end.

// Analyser
pub const FFT_SIZE: u32 = 2048; // yields FFT_SIZE / 2 frequency bins
pub const FREQUENCY_BIN_COUNT: usize = (FFT_SIZE / 2) as usize;
pub const ANALYSER_MIN_DECIBELS: f64 = -75.0;
pub const ANALYSER_MAX_DECIBELS: f64 = -30.0;
pub const ANALYSER_SMOOTHING: f64 = 0.5;
pub const BYTE_MAX: f32 = 255.0;

// Graph placement
pub const FREQUENCY_RING_RADIUS: f32 = 0.9; // outer radius for frequency-tracking points

// Offscreen targets
pub const FREQUENCY_TARGET_SIZE: u32 = 512; // raster + frequency map are fixed squares

// Grid lines
pub const GRID_GRANULARITY: usize = 50; // sub-segments per line
pub const FLOATS_PER_SEGMENT: usize = 4; // 2 vertices x 2 coords
pub const GRID_MULTIPLIER: f32 = 1.0;

// Retarget scheduler (milliseconds)
pub const RETARGET_PERIOD_MS: f64 = 9_500.0;
// 15s warm-up, then the loop waits one period before its first wave
pub const RETARGET_FIRST_WAVE_MS: f64 = 15_000.0 + RETARGET_PERIOD_MS;
pub const RETARGET_GRANULARITY_STEPS: u32 = 10; // random scale in {1..=10} / 5

// Projection
pub const FIELD_OF_VIEW: f32 = std::f32::consts::FRAC_PI_4;
pub const Z_NEAR: f32 = 0.01;
pub const Z_FAR: f32 = 1000.0;

// Camera
pub const CAMERA_EYE: [f32; 3] = [2.5, 2.5, 1.0];
pub const CAMERA_ORBIT_RADIANS_PER_SEC: f32 = 0.05;

#[inline]
pub fn camera_eye_vec3() -> Vec3 {
    Vec3::new(CAMERA_EYE[0], CAMERA_EYE[1], CAMERA_EYE[2])
}
