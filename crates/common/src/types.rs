use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Index of a mesh in the scene's mesh table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshHandle(pub u32);

/// Index of a material in the scene's material table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialHandle(pub u32);

/// Index of a texture in the scene's texture table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// World matrix: scale, then rotate, then translate.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Matrix for transforming normals into world space.
    pub fn inverse_transpose(&self) -> Mat4 {
        self.matrix().inverse().transpose()
    }

    /// Rotation as (pitch, yaw, roll) in radians. Roll applies first, yaw last.
    pub fn pitch_yaw_roll(&self) -> Vec3 {
        let (yaw, pitch, roll) = self.rotation.to_euler(EulerRot::YXZ);
        Vec3::new(pitch, yaw, roll)
    }

    pub fn set_pitch_yaw_roll(&mut self, angles: Vec3) {
        self.rotation = Quat::from_euler(EulerRot::YXZ, angles.y, angles.x, angles.z);
    }

    /// Add to the current Euler angles.
    pub fn rotate(&mut self, pitch: f32, yaw: f32, roll: f32) {
        let angles = self.pitch_yaw_roll() + Vec3::new(pitch, yaw, roll);
        self.set_pitch_yaw_roll(angles);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn matrix_scales_before_translating() {
        let t = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            scale: Vec3::splat(2.0),
            ..Transform::default()
        };
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(3.0, 2.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn inverse_transpose_keeps_normals_perpendicular() {
        let t = Transform {
            scale: Vec3::new(4.0, 1.0, 1.0),
            ..Transform::default()
        };
        // Surface of a stretched sphere at 45 degrees in XY.
        let tangent = t.matrix().transform_vector3(Vec3::new(-1.0, 1.0, 0.0));
        let normal = t.inverse_transpose().transform_vector3(Vec3::new(1.0, 1.0, 0.0));
        assert!(tangent.dot(normal).abs() < 1e-5);
    }

    #[test]
    fn pitch_yaw_roll_round_trip() {
        let mut t = Transform::default();
        let angles = Vec3::new(0.3, 0.5, 0.1);
        t.set_pitch_yaw_roll(angles);
        assert!((t.pitch_yaw_roll() - angles).length() < 1e-4);
    }

    #[test]
    fn rotate_accumulates_yaw() {
        let mut t = Transform::default();
        t.rotate(0.0, 0.25, 0.0);
        t.rotate(0.0, 0.25, 0.0);
        assert!((t.pitch_yaw_roll().y - 0.5).abs() < 1e-4);
    }
}
