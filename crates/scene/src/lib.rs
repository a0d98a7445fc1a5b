//! The demo scene: a fixed, hand-authored set of entities, materials and lights.
//!
//! # Invariants
//! - Handles are indices into the scene tables and stay valid once issued.
//! - The light list never exceeds [`MAX_LIGHTS`].
//! - PBR materials always carry a metal texture.

mod light;
mod material;
mod scene;

pub use light::{Light, LightKind, MAX_LIGHTS, generate_lights, key_lights};
pub use material::{MaterialDesc, ShadingModel, TextureDesc};
pub use scene::{DEMO_MATERIALS, Entity, Scene};

use lumen_common::{MaterialHandle, MeshHandle, TextureHandle};

/// Errors from scene validation and editing.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("entity {entity} references unknown mesh {mesh:?}")]
    UnknownMesh { entity: String, mesh: MeshHandle },
    #[error("entity {entity} references unknown material {material:?}")]
    UnknownMaterial {
        entity: String,
        material: MaterialHandle,
    },
    #[error("material {material} references unknown texture {texture:?}")]
    UnknownTexture {
        material: String,
        texture: TextureHandle,
    },
    #[error("PBR material {0} has no metal texture")]
    MissingMetal(String),
    #[error("{count} lights exceeds the limit of {max}")]
    TooManyLights { count: usize, max: usize },
}

pub fn crate_info() -> &'static str {
    "lumen-scene v0.1.0"
}
