//! Shader constant layouts.
//!
//! Each struct mirrors a WGSL struct byte for byte. Members are grouped so
//! that every `vec3` is followed by a scalar and no implicit padding exists.

use crate::camera::FlyCamera;
use crate::packet::Viewport;
use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec2, Vec4};
use lumen_common::Transform;
use lumen_scene::{Light, MAX_LIGHTS};

bitflags::bitflags! {
    /// Per-frame switches read by the shaders.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FrameFlags: u32 {
        const INDIRECT_LIGHTING = 1 << 0;
        const SSAO_ENABLED = 1 << 1;
        const SSAO_ONLY = 1 << 2;
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LightData {
    pub direction: [f32; 3],
    pub range: f32,
    pub position: [f32; 3],
    pub intensity: f32,
    pub color: [f32; 3],
    pub spot_falloff: f32,
    pub kind: u32,
    pub _pad: [u32; 3],
}

impl From<&Light> for LightData {
    fn from(light: &Light) -> Self {
        Self {
            direction: light.direction.to_array(),
            range: light.range,
            position: light.position.to_array(),
            intensity: light.intensity,
            color: light.color.to_array(),
            spot_falloff: light.spot_falloff,
            kind: light.kind as u32,
            _pad: [0; 3],
        }
    }
}

/// Written once per frame, shared by every scene pass.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct FrameConstants {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub inv_projection: [[f32; 4]; 4],
    /// Projection times the rotation part of the view.
    pub sky_view_projection: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub light_count: u32,
    pub screen_size: [f32; 2],
    pub specular_mip_count: f32,
    pub flags: u32,
    pub lights: [LightData; MAX_LIGHTS],
}

impl FrameConstants {
    /// Fill the per-frame block. Lights past [`MAX_LIGHTS`] are dropped.
    pub fn build(
        camera: &FlyCamera,
        lights: &[Light],
        viewport: Viewport,
        specular_mip_count: u32,
        flags: FrameFlags,
    ) -> Box<Self> {
        let view = camera.view_matrix();
        let projection = camera.projection_for(viewport.aspect());
        let sky_view = Mat4::from_mat3(Mat3::from_mat4(view));

        let mut frame = Box::new(Self::zeroed());
        frame.view = view.to_cols_array_2d();
        frame.projection = projection.to_cols_array_2d();
        frame.inv_projection = projection.inverse().to_cols_array_2d();
        frame.sky_view_projection = (projection * sky_view).to_cols_array_2d();
        frame.camera_position = camera.position.to_array();
        frame.screen_size = [viewport.width as f32, viewport.height as f32];
        frame.specular_mip_count = specular_mip_count as f32;
        frame.flags = flags.bits();

        let count = lights.len().min(MAX_LIGHTS);
        for (slot, light) in frame.lights.iter_mut().zip(&lights[..count]) {
            *slot = LightData::from(light);
        }
        frame.light_count = count as u32;
        frame
    }
}

/// Written once per draw through the constant ring.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ObjectConstants {
    pub world: [[f32; 4]; 4],
    pub world_inverse_transpose: [[f32; 4]; 4],
    pub color_tint: [f32; 4],
    pub uv_scale: [f32; 2],
    pub uv_offset: [f32; 2],
}

impl ObjectConstants {
    pub fn new(world: Mat4, color_tint: Vec4, uv_scale: Vec2, uv_offset: Vec2) -> Self {
        Self {
            world: world.to_cols_array_2d(),
            world_inverse_transpose: world.inverse().transpose().to_cols_array_2d(),
            color_tint: color_tint.to_array(),
            uv_scale: uv_scale.to_array(),
            uv_offset: uv_offset.to_array(),
        }
    }

    pub fn from_transform(transform: &Transform, color_tint: Vec4, uv_scale: Vec2, uv_offset: Vec2) -> Self {
        Self {
            world: transform.matrix().to_cols_array_2d(),
            world_inverse_transpose: transform.inverse_transpose().to_cols_array_2d(),
            color_tint: color_tint.to_array(),
            uv_scale: uv_scale.to_array(),
            uv_offset: uv_offset.to_array(),
        }
    }
}

/// One draw of the environment precompute.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct IblConstants {
    pub face: u32,
    pub roughness: f32,
    pub sample_count: u32,
    pub source_face_size: f32,
    pub sample_delta: f32,
    pub _pad: [f32; 3],
}

/// Hemisphere kernel and tuning for the occlusion pass.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct SsaoConstants {
    pub kernel: [[f32; 4]; 64],
    pub noise_scale: [f32; 2],
    pub radius: f32,
    pub sample_count: u32,
    pub bias: f32,
    pub intensity: f32,
    pub _pad: [f32; 2],
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use lumen_scene::LightKind;
    use std::mem::size_of;

    #[test]
    fn layouts_match_shader_sizes() {
        assert_eq!(size_of::<LightData>(), 64);
        assert_eq!(size_of::<ObjectConstants>(), 160);
        assert_eq!(size_of::<IblConstants>(), 32);
        assert_eq!(size_of::<SsaoConstants>(), 1056);
        assert_eq!(size_of::<FrameConstants>(), 288 + 64 * MAX_LIGHTS);
        for size in [
            size_of::<LightData>(),
            size_of::<ObjectConstants>(),
            size_of::<IblConstants>(),
            size_of::<SsaoConstants>(),
            size_of::<FrameConstants>(),
        ] {
            assert_eq!(size % 16, 0);
        }
    }

    #[test]
    fn light_data_carries_kind() {
        let light = Light::spot(Vec3::ONE, Vec3::NEG_Y, Vec3::X, 4.0, 2.0, 16.0);
        let data = LightData::from(&light);
        assert_eq!(data.kind, LightKind::Spot as u32);
        assert_eq!(data.range, 4.0);
        assert_eq!(data.spot_falloff, 16.0);
        assert_eq!(data.position, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn frame_constants_clamp_lights() {
        let camera = FlyCamera::default();
        let lights = vec![Light::default(); MAX_LIGHTS + 10];
        let frame = FrameConstants::build(
            &camera,
            &lights,
            Viewport::new(800, 600),
            6,
            FrameFlags::INDIRECT_LIGHTING,
        );
        assert_eq!(frame.light_count as usize, MAX_LIGHTS);
        assert_eq!(frame.specular_mip_count, 6.0);
        assert_eq!(frame.screen_size, [800.0, 600.0]);
        assert_eq!(frame.flags, FrameFlags::INDIRECT_LIGHTING.bits());
    }

    #[test]
    fn sky_matrix_ignores_camera_translation() {
        let mut camera = FlyCamera::default();
        let viewport = Viewport::new(640, 480);
        let a = FrameConstants::build(&camera, &[], viewport, 1, FrameFlags::empty());
        camera.position += Vec3::new(5.0, -3.0, 2.0);
        let b = FrameConstants::build(&camera, &[], viewport, 1, FrameFlags::empty());
        assert_eq!(a.sky_view_projection, b.sky_view_projection);
        assert_ne!(a.view, b.view);
    }

    #[test]
    fn object_constants_inverse_transpose() {
        let world = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let c = ObjectConstants::new(world, Vec4::ONE, Vec2::ONE, Vec2::ZERO);
        assert_eq!(c.world_inverse_transpose[0][0], 0.5);
    }
}
