use crate::state::{FrameResource, ResourceState};
use lumen_assets::AssetError;
use lumen_scene::SceneError;

/// Errors from frame preparation, planning and backend execution.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("constant ring exhausted: requested {requested} bytes, {remaining} remaining")]
    RingExhausted { requested: u64, remaining: u64 },
    #[error("invalid constant ring: capacity {capacity}, alignment {alignment}")]
    InvalidRing { capacity: u64, alignment: u64 },
    #[error("resource {0:?} is not tracked")]
    UnknownResource(FrameResource),
    #[error("resource {0:?} is already tracked")]
    DuplicateResource(FrameResource),
    #[error("cannot transition {resource:?} from {from:?} to {to:?}")]
    InvalidTransition {
        resource: FrameResource,
        from: ResourceState,
        to: ResourceState,
    },
    #[error("pass {pass} reads {resource:?} before any pass writes it")]
    ReadBeforeWrite {
        pass: &'static str,
        resource: FrameResource,
    },
    #[error("pass {pass} reads and writes {resource:?}")]
    ReadWriteHazard {
        pass: &'static str,
        resource: FrameResource,
    },
    #[error("invalid IBL settings: {0}")]
    InvalidIbl(String),
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),
    #[error("GPU error: {0}")]
    Gpu(String),
}

/// Errors from loading and validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
