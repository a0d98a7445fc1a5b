use crate::light::{Light, MAX_LIGHTS, generate_lights};
use crate::material::{MaterialDesc, ShadingModel, TextureDesc};
use crate::SceneError;
use glam::{Quat, Vec2, Vec3};
use lumen_assets::{MeshShape, TextureRole};
use lumen_common::{MaterialHandle, MeshHandle, TextureHandle, Transform};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

/// Material names of the demo, left to right along each row.
pub const DEMO_MATERIALS: [&str; 7] = [
    "cobblestone",
    "floor",
    "paint",
    "scratched",
    "bronze",
    "rough",
    "wood",
];

/// A drawable object: one mesh, one material, one transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub name: String,
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub transform: Transform,
}

/// Everything the renderer draws. Flat tables addressed by handle.
///
/// The scene is hand-authored: handles are indices into the tables and the
/// tables only grow while the scene is being built.
#[derive(Debug, Clone)]
pub struct Scene {
    meshes: Vec<MeshShape>,
    textures: Vec<TextureDesc>,
    materials: Vec<MaterialDesc>,
    entities: Vec<Entity>,
    lights: Vec<Light>,
    sky: String,
    sky_mesh: MeshHandle,
    light_mesh: MeshHandle,
}

impl Scene {
    /// Empty scene with a cube for the sky and a sphere for light gizmos.
    pub fn new(sky: impl Into<String>) -> Self {
        let mut scene = Self {
            meshes: Vec::new(),
            textures: Vec::new(),
            materials: Vec::new(),
            entities: Vec::new(),
            lights: Vec::new(),
            sky: sky.into(),
            sky_mesh: MeshHandle(0),
            light_mesh: MeshHandle(0),
        };
        scene.sky_mesh = scene.add_mesh(MeshShape::Cube);
        scene.light_mesh = scene.add_mesh(MeshShape::SPHERE);
        scene
    }

    /// Two rows of spheres: PBR materials on top, basic materials below.
    pub fn demo(light_count: usize, seed: u64) -> Self {
        let mut scene = Self::new("sky");
        let sphere = scene.light_mesh;

        for (i, name) in DEMO_MATERIALS.iter().enumerate() {
            let albedo = scene.add_texture(name, TextureRole::Albedo);
            let normal = scene.add_texture(name, TextureRole::Normal);
            let roughness = scene.add_texture(name, TextureRole::Roughness);
            let metal = scene.add_texture(name, TextureRole::Metal);
            let x = -6.0 + 2.0 * i as f32;

            for (shading, y, metal) in [
                (ShadingModel::Pbr, 2.0, Some(metal)),
                (ShadingModel::Basic, -2.0, None),
            ] {
                let material = scene.add_material(MaterialDesc {
                    name: format!("{name}_{}", shading.label()),
                    shading,
                    albedo,
                    normal,
                    roughness,
                    metal,
                    color_tint: Vec3::ONE,
                    uv_scale: Vec2::splat(2.0),
                    uv_offset: Vec2::ZERO,
                });
                scene.add_entity(Entity {
                    name: format!("{name}_{}", shading.label()),
                    mesh: sphere,
                    material,
                    transform: Transform::from_position(Vec3::new(x, y, 0.0)),
                });
            }
        }

        scene.lights = generate_lights(light_count, &mut StdRng::seed_from_u64(seed));
        scene
    }

    pub fn add_mesh(&mut self, shape: MeshShape) -> MeshHandle {
        self.meshes.push(shape);
        MeshHandle(self.meshes.len() as u32 - 1)
    }

    /// Register a texture, reusing the handle if it is already present.
    pub fn add_texture(&mut self, name: &str, role: TextureRole) -> TextureHandle {
        if let Some(i) = self
            .textures
            .iter()
            .position(|t| t.name == name && t.role == role)
        {
            return TextureHandle(i as u32);
        }
        self.textures.push(TextureDesc {
            name: name.to_string(),
            role,
        });
        TextureHandle(self.textures.len() as u32 - 1)
    }

    pub fn add_material(&mut self, material: MaterialDesc) -> MaterialHandle {
        self.materials.push(material);
        MaterialHandle(self.materials.len() as u32 - 1)
    }

    pub fn add_entity(&mut self, entity: Entity) -> usize {
        self.entities.push(entity);
        self.entities.len() - 1
    }

    pub fn meshes(&self) -> &[MeshShape] {
        &self.meshes
    }

    pub fn textures(&self) -> &[TextureDesc] {
        &self.textures
    }

    pub fn materials(&self) -> &[MaterialDesc] {
        &self.materials
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut [Light] {
        &mut self.lights
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&MeshShape> {
        self.meshes.get(handle.0 as usize)
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&MaterialDesc> {
        self.materials.get(handle.0 as usize)
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&TextureDesc> {
        self.textures.get(handle.0 as usize)
    }

    /// Asset name of the environment cubemap.
    pub fn sky(&self) -> &str {
        &self.sky
    }

    pub fn sky_mesh(&self) -> MeshHandle {
        self.sky_mesh
    }

    pub fn light_mesh(&self) -> MeshHandle {
        self.light_mesh
    }

    /// Replace the light list. Fails if it exceeds [`MAX_LIGHTS`].
    pub fn set_lights(&mut self, lights: Vec<Light>) -> Result<(), SceneError> {
        if lights.len() > MAX_LIGHTS {
            return Err(SceneError::TooManyLights {
                count: lights.len(),
                max: MAX_LIGHTS,
            });
        }
        self.lights = lights;
        Ok(())
    }

    /// Regenerate the same number of lights from `rng`.
    pub fn randomize_lights<R: Rng>(&mut self, rng: &mut R) {
        self.lights = generate_lights(self.lights.len(), rng);
        debug!(count = self.lights.len(), "regenerated lights");
    }

    /// Shrink the light list, or grow it with default point lights.
    pub fn set_light_count(&mut self, count: usize) {
        if count > MAX_LIGHTS {
            warn!(count, max = MAX_LIGHTS, "clamping light count");
        }
        let count = count.min(MAX_LIGHTS);
        self.lights.resize(count, Light::default());
    }

    /// Spin every entity about the world Y axis.
    pub fn animate(&mut self, dt: f32, spin_speed: f32) {
        if spin_speed == 0.0 {
            return;
        }
        let spin = Quat::from_rotation_y(spin_speed * dt);
        for entity in &mut self.entities {
            entity.transform.rotation = (spin * entity.transform.rotation).normalize();
        }
    }

    /// Check every handle in the scene resolves.
    pub fn validate(&self) -> Result<(), SceneError> {
        for entity in &self.entities {
            if self.mesh(entity.mesh).is_none() {
                return Err(SceneError::UnknownMesh {
                    entity: entity.name.clone(),
                    mesh: entity.mesh,
                });
            }
            if self.material(entity.material).is_none() {
                return Err(SceneError::UnknownMaterial {
                    entity: entity.name.clone(),
                    material: entity.material,
                });
            }
        }
        for material in &self.materials {
            if let Some(texture) = material.textures().find(|t| self.texture(*t).is_none()) {
                return Err(SceneError::UnknownTexture {
                    material: material.name.clone(),
                    texture,
                });
            }
            if material.shading == ShadingModel::Pbr && material.metal.is_none() {
                return Err(SceneError::MissingMetal(material.name.clone()));
            }
        }
        if self.lights.len() > MAX_LIGHTS {
            return Err(SceneError::TooManyLights {
                count: self.lights.len(),
                max: MAX_LIGHTS,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::LightKind;

    #[test]
    fn demo_layout() {
        let scene = Scene::demo(64, 0);
        assert_eq!(scene.entities().len(), 14);
        assert_eq!(scene.materials().len(), 14);
        assert_eq!(scene.textures().len(), 28);
        assert_eq!(scene.lights().len(), 64);
        assert!(scene.validate().is_ok());

        for entity in scene.entities() {
            let material = scene.material(entity.material).unwrap();
            let y = entity.transform.position.y;
            match material.shading {
                ShadingModel::Pbr => assert_eq!(y, 2.0),
                ShadingModel::Basic => assert_eq!(y, -2.0),
            }
            assert_eq!(material.uv_scale, Vec2::splat(2.0));
        }
    }

    #[test]
    fn demo_rows_span_x() {
        let scene = Scene::demo(3, 0);
        let xs: Vec<f32> = scene
            .entities()
            .iter()
            .filter(|e| e.transform.position.y > 0.0)
            .map(|e| e.transform.position.x)
            .collect();
        assert_eq!(xs, vec![-6.0, -4.0, -2.0, 0.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn textures_are_shared_between_rows() {
        let scene = Scene::demo(3, 0);
        let pbr = &scene.materials()[0];
        let basic = &scene.materials()[1];
        assert_eq!(pbr.albedo, basic.albedo);
        assert!(pbr.metal.is_some());
        assert!(basic.metal.is_none());
    }

    #[test]
    fn light_count_grows_with_defaults() {
        let mut scene = Scene::demo(3, 0);
        scene.set_light_count(5);
        assert_eq!(scene.lights().len(), 5);
        assert_eq!(scene.lights()[4], Light::default());
        assert_eq!(scene.lights()[4].kind, LightKind::Point);
        scene.set_light_count(1);
        assert_eq!(scene.lights().len(), 1);
        scene.set_light_count(MAX_LIGHTS * 2);
        assert_eq!(scene.lights().len(), MAX_LIGHTS);
    }

    #[test]
    fn randomize_keeps_count() {
        let mut scene = Scene::demo(40, 0);
        let before = scene.lights().to_vec();
        scene.randomize_lights(&mut StdRng::seed_from_u64(5));
        assert_eq!(scene.lights().len(), 40);
        assert_ne!(scene.lights(), before.as_slice());
    }

    #[test]
    fn validate_rejects_dangling_handles() {
        let mut scene = Scene::demo(3, 0);
        scene.entities_mut()[0].material = MaterialHandle(999);
        assert!(matches!(
            scene.validate(),
            Err(SceneError::UnknownMaterial { .. })
        ));

        let mut scene = Scene::new("sky");
        scene.add_entity(Entity {
            name: "ghost".into(),
            mesh: MeshHandle(42),
            material: MaterialHandle(0),
            transform: Transform::default(),
        });
        assert!(matches!(scene.validate(), Err(SceneError::UnknownMesh { .. })));
    }

    #[test]
    fn set_lights_enforces_limit() {
        let mut scene = Scene::new("sky");
        let too_many = vec![Light::default(); MAX_LIGHTS + 1];
        assert!(matches!(
            scene.set_lights(too_many),
            Err(SceneError::TooManyLights { .. })
        ));
        assert!(scene.set_lights(vec![Light::default(); 4]).is_ok());
    }

    #[test]
    fn animate_spins_about_y() {
        let mut scene = Scene::demo(3, 0);
        let position = scene.entities()[0].transform.position;
        scene.animate(0.5, 1.0);
        let t = scene.entities()[0].transform;
        assert_eq!(t.position, position);
        assert!((t.pitch_yaw_roll().y - 0.5).abs() < 1e-4);

        let before = scene.entities()[1].transform;
        scene.animate(1.0, 0.0);
        assert_eq!(scene.entities()[1].transform, before);
    }
}
