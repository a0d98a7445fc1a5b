//! Frame pipeline shared by every backend.
//!
//! Everything here runs on the CPU: shader constant layouts, the per-frame
//! constant upload ring, resource state tracking, the ordered frame plan, the
//! IBL bake layout and reference math, and the SSAO kernel. A GPU backend
//! executes what this crate prepares.
//!
//! # Invariants
//! - Renderers read the scene; they never mutate it.
//! - Every frame ends with each resource back in its resting state.
//! - Per-draw constants reach the GPU in one upload per frame.

mod camera;
mod config;
mod constants;
mod error;
mod frame;
mod ibl;
mod packet;
mod renderer;
mod ring;
mod settings;
mod ssao;
mod state;

pub use camera::{BOOST_MULTIPLIER, FlyCamera, SLOW_MULTIPLIER, speed_multiplier};
pub use config::{DemoConfig, SceneConfig, WindowConfig};
pub use constants::{
    FrameConstants, FrameFlags, IblConstants, LightData, ObjectConstants, SsaoConstants,
};
pub use error::{ConfigError, RenderError};
pub use frame::{DepthAccess, FrameOptions, FramePlan, PassDesc, PassKind, PlannedPass};
pub use ibl::{
    BakeStep, IblBakePlan, IblDraw, IblSettings, IblTarget, brdf_table, geometry_schlick_ggx,
    geometry_smith_ibl, hammersley, importance_sample_ggx, integrate_brdf, radical_inverse_vdc,
    roughness_for_mip,
};
pub use packet::{DrawItem, FramePacket, GizmoDraw, Viewport, prepare_frame};
pub use renderer::{CONSTANT_ALIGNMENT, DebugTextRenderer, Renderer};
pub use ring::{ConstantRing, ConstantSlot};
pub use settings::RenderSettings;
pub use ssao::{MAX_SSAO_SAMPLES, NOISE_SIZE, SsaoKernel, SsaoSettings, noise_texels};
pub use state::{FrameResource, ResourceState, ResourceUsages, StateTracker, Transition};

pub fn crate_info() -> &'static str {
    "lumen-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
