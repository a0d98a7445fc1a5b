//! wgpu backend for the lumen frame pipeline.
//!
//! Uploads the scene, bakes image-based lighting once from the sky cubemap,
//! and executes the frame plan built by `lumen-render` every frame.
//!
//! # Invariants
//! - The renderer never mutates the scene.
//! - All per-draw constants of a frame reach the GPU in one buffer write.
//! - Screen targets are recreated only on resize or when the pass list changes.

mod gpu;
mod ibl;
mod materials;
mod mesh;
mod pipelines;
mod shaders;
mod targets;
mod textures;

pub use gpu::{FrameStats, WgpuRenderer};
pub use ibl::{BakeReport, BakedIbl, IblBaker, bake_headless};

pub fn crate_info() -> &'static str {
    "lumen-render-wgpu v0.1.0"
}
