//! Shared types for the lumen workspace: transforms, table handles, cube faces.

mod cube;
mod types;

pub use cube::CubeFace;
pub use types::{MaterialHandle, MeshHandle, TextureHandle, Transform};

pub fn crate_info() -> &'static str {
    "lumen-common v0.1.0"
}
