//! Camera used for the grid pass.
//!
//! Kept platform-independent so both the renderer and tests can build the
//! same matrices.

use crate::constants::{
    camera_eye_vec3, CAMERA_ORBIT_RADIANS_PER_SEC, FIELD_OF_VIEW, Z_FAR, Z_NEAR,
};
use glam::{Mat4, Quat, Vec3};

/// Slowly orbiting right-handed camera, z up, looking at `target`.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub orbit_speed: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            eye: camera_eye_vec3(),
            target: Vec3::ZERO,
            up: Vec3::Z,
            orbit_speed: CAMERA_ORBIT_RADIANS_PER_SEC,
        }
    }
}

impl OrbitCamera {
    /// Rotate the eye about the up axis through `target`.
    pub fn tick(&mut self, dt_sec: f32) {
        let rot = Quat::from_axis_angle(self.up, self.orbit_speed * dt_sec);
        self.eye = self.target + rot * (self.eye - self.target);
    }

    pub fn distance(&self) -> f32 {
        (self.eye - self.target).length()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
}

/// Perspective used by the grid pass for a target of the given size.
pub fn projection_matrix(width: u32, height: u32) -> Mat4 {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    Mat4::perspective_rh(FIELD_OF_VIEW, aspect, Z_NEAR, Z_FAR)
}
