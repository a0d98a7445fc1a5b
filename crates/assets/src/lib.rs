//! Asset sources: CPU-side images and meshes handed to the renderer.
//!
//! The renderer consumes decoded RGBA8 images and indexed meshes through the
//! [`AssetSource`] trait and never touches file formats itself.
//!
//! # Invariants
//! - Image pixel buffers are always `width * height * 4` bytes.
//! - Cubemap faces are square, equally sized, and in +X, -X, +Y, -Y, +Z, -Z order.
//! - Procedural data is deterministic per asset name.

mod mesh;
mod procedural;
mod source;
mod texture;

pub use mesh::{MeshData, MeshShape, MeshVertex};
pub use procedural::ProceduralAssets;
pub use source::{AssetSource, DirectoryAssets, SKY_FACE_FILES, cube_faces, load_png};
pub use texture::{ImageData, TextureRole, mip_level_count};

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("invalid image {width}x{height} with {len} bytes")]
    InvalidImage { width: u32, height: u32, len: usize },
    #[error("cubemap needs 6 faces, got {count}")]
    MissingFace { count: usize },
    #[error("cubemap face {face} is {found:?}, expected {expected:?}")]
    FaceSizeMismatch {
        face: usize,
        expected: (u32, u32),
        found: (u32, u32),
    },
}

pub fn crate_info() -> &'static str {
    "lumen-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("assets"));
    }

    #[test]
    fn procedural_source_serves_every_role() {
        let source = ProceduralAssets::new(8, 4);
        for role in TextureRole::ALL {
            let image = source.texture("floor", role).unwrap();
            assert_eq!(image.pixels().len(), 8 * 8 * 4);
        }
        let sphere = source.mesh(MeshShape::SPHERE).unwrap();
        assert!(!sphere.indices.is_empty());
    }
}
