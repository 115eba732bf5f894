/// Affine helpers for placing models and viewing voxel output
use nalgebra::{Matrix4, Vector3};

use crate::geometry::Bounds;

/// Orbit angles (radians) used by hosts that preview the emitted batches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRotation {
    pub pitch: f32,
    pub yaw: f32,
}

impl ViewRotation {
    pub fn new(pitch: f32, yaw: f32) -> Self {
        Self { pitch, yaw }
    }

    /// Rotate by delta amounts; pitch stays within a quarter turn so the
    /// model never flips upside down.
    pub fn rotate(&mut self, d_pitch: f32, d_yaw: f32) {
        let limit = std::f32::consts::FRAC_PI_2;
        self.pitch = (self.pitch + d_pitch).clamp(-limit, limit);
        self.yaw = (self.yaw + d_yaw).rem_euclid(std::f32::consts::TAU);
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Transform::rotation_matrix(self.pitch, self.yaw)
    }
}

impl Default for ViewRotation {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

pub struct Transform;

impl Transform {
    /// Yaw around Y, then pitch around X.
    pub fn rotation_matrix(pitch: f32, yaw: f32) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(pitch, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, yaw, 0.0));
        rx * ry
    }

    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }

    /// Uniform scale + translation that centers `bounds` at the origin with
    /// its longest side spanning `1 - 2 * margin`.
    ///
    /// Returns `None` for a box with no extent.
    pub fn fit_matrix(bounds: &Bounds, margin: f32) -> Option<Matrix4<f32>> {
        let longest = bounds.extent().max();
        if longest <= 0.0 {
            return None;
        }
        let scale = (1.0 - 2.0 * margin).max(0.0) / longest;
        let center = bounds.center();
        Some(
            Self::scale_matrix(scale, scale, scale)
                * Self::translation_matrix(-center.x, -center.y, -center.z),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_pitch_is_clamped() {
        let mut rotation = ViewRotation::default();
        rotation.rotate(10.0, 0.0);
        assert!((rotation.pitch - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_yaw_wraps() {
        let mut rotation = ViewRotation::default();
        rotation.rotate(0.0, -0.5);
        assert!(rotation.yaw > 0.0 && rotation.yaw < std::f32::consts::TAU);
    }

    #[test]
    fn test_identity_rotation() {
        let matrix = ViewRotation::default().matrix();
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_fit_matrix_degenerate() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let bounds = Bounds { min: p, max: p };
        assert!(Transform::fit_matrix(&bounds, 0.0).is_none());
    }
}
