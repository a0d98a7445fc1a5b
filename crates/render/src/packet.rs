use crate::camera::FlyCamera;
use crate::constants::{FrameConstants, ObjectConstants};
use crate::ring::{ConstantRing, ConstantSlot};
use crate::settings::RenderSettings;
use crate::RenderError;
use glam::{Mat4, Vec2, Vec3};
use lumen_common::{MaterialHandle, MeshHandle};
use lumen_scene::{LightKind, MAX_LIGHTS, Scene, SceneError, ShadingModel};
use serde::Serialize;
use tracing::warn;

/// Size of the render surface in pixels. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawItem {
    /// Index into the scene's entity list.
    pub entity: usize,
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub shading: ShadingModel,
    pub constants: ConstantSlot,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GizmoDraw {
    /// Index into the scene's light list.
    pub light: usize,
    pub constants: ConstantSlot,
}

/// Everything a backend needs to record one frame.
pub struct FramePacket {
    pub frame: Box<FrameConstants>,
    /// Grouped by shading model, scene order within a group.
    pub draws: Vec<DrawItem>,
    pub gizmos: Vec<GizmoDraw>,
    pub light_mesh: MeshHandle,
    pub sky_mesh: MeshHandle,
}

impl FramePacket {
    /// Entity draws plus gizmos plus the sky.
    pub fn draw_call_count(&self) -> usize {
        self.draws.len() + self.gizmos.len() + 1
    }
}

/// Build the frame constants and push every per-draw block into `ring`.
pub fn prepare_frame(
    scene: &Scene,
    camera: &FlyCamera,
    settings: &RenderSettings,
    viewport: Viewport,
    specular_mip_count: u32,
    ring: &mut ConstantRing,
) -> Result<FramePacket, RenderError> {
    ring.begin_frame();

    let lights = scene.lights();
    if lights.len() > MAX_LIGHTS {
        warn!(count = lights.len(), max = MAX_LIGHTS, "dropping lights past the limit");
    }
    let frame = FrameConstants::build(
        camera,
        lights,
        viewport,
        specular_mip_count,
        settings.frame_flags(),
    );

    let mut draws = Vec::with_capacity(scene.entities().len());
    for (index, entity) in scene.entities().iter().enumerate() {
        if scene.mesh(entity.mesh).is_none() {
            return Err(SceneError::UnknownMesh {
                entity: entity.name.clone(),
                mesh: entity.mesh,
            }
            .into());
        }
        let material = scene
            .material(entity.material)
            .ok_or_else(|| SceneError::UnknownMaterial {
                entity: entity.name.clone(),
                material: entity.material,
            })?;
        let constants = ring.push(&ObjectConstants::from_transform(
            &entity.transform,
            material.color_tint.extend(1.0),
            material.uv_scale,
            material.uv_offset,
        ))?;
        draws.push(DrawItem {
            entity: index,
            mesh: entity.mesh,
            material: entity.material,
            shading: material.shading,
            constants,
        });
    }
    draws.sort_by_key(|d| d.shading);

    let mut gizmos = Vec::new();
    if settings.draw_light_gizmos {
        for (index, light) in lights.iter().take(MAX_LIGHTS).enumerate() {
            if light.kind != LightKind::Point {
                continue;
            }
            let world = Mat4::from_translation(light.position)
                * Mat4::from_scale(Vec3::splat(light.range / 20.0));
            let constants = ring.push(&ObjectConstants::new(
                world,
                (light.color * light.intensity).extend(1.0),
                Vec2::ONE,
                Vec2::ZERO,
            ))?;
            gizmos.push(GizmoDraw {
                light: index,
                constants,
            });
        }
    }

    Ok(FramePacket {
        frame,
        draws,
        gizmos,
        light_mesh: scene.light_mesh(),
        sky_mesh: scene.sky_mesh(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_scene::{Entity, Light};
    use lumen_common::Transform;

    fn ring() -> ConstantRing {
        ConstantRing::new(256 * 1024, 256).unwrap()
    }

    fn prepare(scene: &Scene, settings: &RenderSettings, ring: &mut ConstantRing) -> FramePacket {
        prepare_frame(
            scene,
            &FlyCamera::default(),
            settings,
            Viewport::new(1280, 720),
            6,
            ring,
        )
        .unwrap()
    }

    #[test]
    fn viewport_never_zero() {
        let v = Viewport::new(0, 0);
        assert_eq!((v.width, v.height), (1, 1));
        assert_eq!(Viewport::new(200, 100).aspect(), 2.0);
    }

    #[test]
    fn draws_grouped_by_shading_in_scene_order() {
        let scene = Scene::demo(8, 0);
        let mut ring = ring();
        let packet = prepare(&scene, &RenderSettings::default(), &mut ring);
        assert_eq!(packet.draws.len(), 14);
        assert!(packet.draws[..7].iter().all(|d| d.shading == ShadingModel::Pbr));
        assert!(packet.draws[7..].iter().all(|d| d.shading == ShadingModel::Basic));
        let pbr: Vec<usize> = packet.draws[..7].iter().map(|d| d.entity).collect();
        assert_eq!(pbr, vec![0, 2, 4, 6, 8, 10, 12]);
        assert!(packet.gizmos.is_empty());
        assert_eq!(packet.frame.light_count, 8);
    }

    #[test]
    fn slots_are_distinct_and_aligned() {
        let scene = Scene::demo(8, 0);
        let mut ring = ring();
        let packet = prepare(&scene, &RenderSettings::default(), &mut ring);
        let mut offsets: Vec<u32> = packet.draws.iter().map(|d| d.constants.offset).collect();
        offsets.sort();
        offsets.dedup();
        assert_eq!(offsets.len(), 14);
        assert!(offsets.iter().all(|o| o % 256 == 0));
        assert_eq!(ring.used(), 13 * 256 + 160);
    }

    #[test]
    fn gizmos_only_for_point_lights() {
        let mut scene = Scene::demo(0, 0);
        scene
            .set_lights(vec![
                Light::directional(Vec3::NEG_Y, Vec3::ONE, 1.0),
                Light::point(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 0.5, 0.0), 10.0, 2.0),
                Light::spot(Vec3::ZERO, Vec3::NEG_Y, Vec3::ONE, 5.0, 1.0, 8.0),
            ])
            .unwrap();
        let settings = RenderSettings {
            draw_light_gizmos: true,
            ..RenderSettings::default()
        };
        let mut ring = ring();
        let packet = prepare(&scene, &settings, &mut ring);
        assert_eq!(packet.gizmos.len(), 1);
        assert_eq!(packet.gizmos[0].light, 1);
        assert_eq!(packet.draw_call_count(), 14 + 1 + 1);

        let offset = packet.gizmos[0].constants.offset as usize;
        let size = std::mem::size_of::<ObjectConstants>();
        let constants: ObjectConstants =
            bytemuck::pod_read_unaligned(&ring.staged()[offset..offset + size]);
        assert_eq!(constants.world[0][0], 0.5);
        assert_eq!(constants.world[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(constants.color_tint, [2.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn unknown_material_is_an_error() {
        let mut scene = Scene::new("sky");
        scene.add_entity(Entity {
            name: "orphan".into(),
            mesh: scene.light_mesh(),
            material: MaterialHandle(3),
            transform: Transform::default(),
        });
        let result = prepare_frame(
            &scene,
            &FlyCamera::default(),
            &RenderSettings::default(),
            Viewport::new(64, 64),
            1,
            &mut ring(),
        );
        assert!(matches!(
            result,
            Err(RenderError::Scene(SceneError::UnknownMaterial { .. }))
        ));
    }

    #[test]
    fn small_ring_is_exhausted() {
        let scene = Scene::demo(0, 0);
        let mut ring = ConstantRing::new(1024, 256).unwrap();
        let result = prepare_frame(
            &scene,
            &FlyCamera::default(),
            &RenderSettings::default(),
            Viewport::new(64, 64),
            1,
            &mut ring,
        );
        assert!(matches!(result, Err(RenderError::RingExhausted { .. })));
    }
}
