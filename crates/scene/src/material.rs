use glam::{Vec2, Vec3};
use lumen_assets::TextureRole;
use lumen_common::TextureHandle;
use serde::{Deserialize, Serialize};

/// Lighting model used by a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShadingModel {
    /// Metal/roughness Cook-Torrance with image-based ambient.
    Pbr,
    /// Blinn-Phong, roughness drives the highlight size.
    Basic,
}

impl ShadingModel {
    pub fn label(self) -> &'static str {
        match self {
            ShadingModel::Pbr => "pbr",
            ShadingModel::Basic => "basic",
        }
    }
}

/// A texture the scene wants loaded, by asset name and channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureDesc {
    pub name: String,
    pub role: TextureRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDesc {
    pub name: String,
    pub shading: ShadingModel,
    pub albedo: TextureHandle,
    pub normal: TextureHandle,
    pub roughness: TextureHandle,
    /// Required for PBR materials, ignored by basic ones.
    pub metal: Option<TextureHandle>,
    pub color_tint: Vec3,
    pub uv_scale: Vec2,
    pub uv_offset: Vec2,
}

impl MaterialDesc {
    /// Every texture handle this material samples.
    pub fn textures(&self) -> impl Iterator<Item = TextureHandle> + '_ {
        [Some(self.albedo), Some(self.normal), Some(self.roughness), self.metal]
            .into_iter()
            .flatten()
    }
}
