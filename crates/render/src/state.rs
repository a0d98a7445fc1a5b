//! GPU resource states and the tracker that turns state changes into barriers.

use crate::RenderError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

bitflags::bitflags! {
    /// Capabilities a texture must be created with.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ResourceUsages: u32 {
        const RENDER_TARGET = 1 << 0;
        const DEPTH_STENCIL = 1 << 1;
        const SAMPLED = 1 << 2;
        const COPY_SRC = 1 << 3;
        const COPY_DST = 1 << 4;
        const PRESENT = 1 << 5;
    }
}

/// How a resource is being used at a point in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResourceState {
    /// Contents are meaningless; only valid as a starting state.
    Undefined,
    Present,
    RenderTarget,
    DepthWrite,
    DepthRead,
    ShaderResource,
    CopySource,
    CopyDest,
}

impl ResourceState {
    pub fn is_write(self) -> bool {
        matches!(
            self,
            ResourceState::RenderTarget | ResourceState::DepthWrite | ResourceState::CopyDest
        )
    }

    /// States that consume existing contents.
    pub fn is_read(self) -> bool {
        matches!(
            self,
            ResourceState::Present
                | ResourceState::DepthRead
                | ResourceState::ShaderResource
                | ResourceState::CopySource
        )
    }

    pub fn usage(self) -> ResourceUsages {
        match self {
            ResourceState::Undefined => ResourceUsages::empty(),
            ResourceState::Present => ResourceUsages::PRESENT,
            ResourceState::RenderTarget => ResourceUsages::RENDER_TARGET,
            ResourceState::DepthWrite | ResourceState::DepthRead => ResourceUsages::DEPTH_STENCIL,
            ResourceState::ShaderResource => ResourceUsages::SAMPLED,
            ResourceState::CopySource => ResourceUsages::COPY_SRC,
            ResourceState::CopyDest => ResourceUsages::COPY_DST,
        }
    }
}

/// Every GPU resource the frame pipeline tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FrameResource {
    BackBuffer,
    Depth,
    /// Direct lighting plus sky and gizmos.
    SceneColor,
    /// Image-based ambient lighting, modulated by occlusion at composite.
    SceneAmbient,
    /// View-space normals.
    SceneNormals,
    /// Linear view depth.
    SceneDepth,
    SsaoRaw,
    SsaoBlurred,
    EnvironmentMap,
    IrradianceMap,
    SpecularMap,
    BrdfLut,
}

impl FrameResource {
    pub const ALL: [FrameResource; 12] = [
        FrameResource::BackBuffer,
        FrameResource::Depth,
        FrameResource::SceneColor,
        FrameResource::SceneAmbient,
        FrameResource::SceneNormals,
        FrameResource::SceneDepth,
        FrameResource::SsaoRaw,
        FrameResource::SsaoBlurred,
        FrameResource::EnvironmentMap,
        FrameResource::IrradianceMap,
        FrameResource::SpecularMap,
        FrameResource::BrdfLut,
    ];

    /// Built once at startup and only read by frames.
    pub fn is_persistent(self) -> bool {
        matches!(
            self,
            FrameResource::EnvironmentMap
                | FrameResource::IrradianceMap
                | FrameResource::SpecularMap
                | FrameResource::BrdfLut
        )
    }

    /// State the resource is in between frames.
    pub fn resting_state(self) -> ResourceState {
        match self {
            FrameResource::BackBuffer => ResourceState::Present,
            FrameResource::Depth => ResourceState::DepthWrite,
            _ => ResourceState::ShaderResource,
        }
    }
}

/// A state change that needs a barrier before the next use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub resource: FrameResource,
    pub before: ResourceState,
    pub after: ResourceState,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {:?} -> {:?}", self.resource, self.before, self.after)
    }
}

/// Current state of every registered resource.
#[derive(Debug, Clone, Default)]
pub struct StateTracker {
    states: BTreeMap<FrameResource, ResourceState>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        resource: FrameResource,
        state: ResourceState,
    ) -> Result<(), RenderError> {
        if self.states.contains_key(&resource) {
            return Err(RenderError::DuplicateResource(resource));
        }
        self.states.insert(resource, state);
        Ok(())
    }

    pub fn state(&self, resource: FrameResource) -> Option<ResourceState> {
        self.states.get(&resource).copied()
    }

    /// Move `resource` to `after`, returning the barrier if the state changed.
    pub fn transition(
        &mut self,
        resource: FrameResource,
        after: ResourceState,
    ) -> Result<Option<Transition>, RenderError> {
        let before = self
            .state(resource)
            .ok_or(RenderError::UnknownResource(resource))?;
        let invalid = after == ResourceState::Undefined
            || (before == ResourceState::Undefined && after.is_read());
        if invalid {
            return Err(RenderError::InvalidTransition {
                resource,
                from: before,
                to: after,
            });
        }
        if before == after {
            return Ok(None);
        }
        self.states.insert(resource, after);
        Ok(Some(Transition {
            resource,
            before,
            after,
        }))
    }

    pub fn iter(&self) -> impl Iterator<Item = (FrameResource, ResourceState)> + '_ {
        self.states.iter().map(|(r, s)| (*r, *s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barrier_only_on_change() {
        let mut tracker = StateTracker::new();
        tracker
            .register(FrameResource::SceneColor, ResourceState::ShaderResource)
            .unwrap();
        let t = tracker
            .transition(FrameResource::SceneColor, ResourceState::RenderTarget)
            .unwrap()
            .unwrap();
        assert_eq!(t.before, ResourceState::ShaderResource);
        assert_eq!(t.after, ResourceState::RenderTarget);
        assert!(tracker
            .transition(FrameResource::SceneColor, ResourceState::RenderTarget)
            .unwrap()
            .is_none());
        assert_eq!(
            tracker.state(FrameResource::SceneColor),
            Some(ResourceState::RenderTarget)
        );
    }

    #[test]
    fn unknown_and_duplicate_resources() {
        let mut tracker = StateTracker::new();
        assert!(matches!(
            tracker.transition(FrameResource::Depth, ResourceState::DepthRead),
            Err(RenderError::UnknownResource(FrameResource::Depth))
        ));
        tracker
            .register(FrameResource::Depth, ResourceState::DepthWrite)
            .unwrap();
        assert!(matches!(
            tracker.register(FrameResource::Depth, ResourceState::DepthRead),
            Err(RenderError::DuplicateResource(_))
        ));
    }

    #[test]
    fn undefined_contents_cannot_be_read() {
        let mut tracker = StateTracker::new();
        tracker
            .register(FrameResource::BrdfLut, ResourceState::Undefined)
            .unwrap();
        assert!(tracker
            .transition(FrameResource::BrdfLut, ResourceState::ShaderResource)
            .is_err());
        assert!(tracker
            .transition(FrameResource::BrdfLut, ResourceState::RenderTarget)
            .is_ok());
        assert!(tracker
            .transition(FrameResource::BrdfLut, ResourceState::Undefined)
            .is_err());
    }

    #[test]
    fn usages_follow_states() {
        assert_eq!(
            ResourceState::DepthRead.usage(),
            ResourceUsages::DEPTH_STENCIL
        );
        assert!(ResourceState::RenderTarget.is_write());
        assert!(!ResourceState::ShaderResource.is_write());
        assert!(ResourceState::Undefined.usage().is_empty());
    }

    #[test]
    fn resting_states() {
        assert_eq!(
            FrameResource::BackBuffer.resting_state(),
            ResourceState::Present
        );
        assert_eq!(
            FrameResource::Depth.resting_state(),
            ResourceState::DepthWrite
        );
        assert!(FrameResource::BrdfLut.is_persistent());
        assert!(!FrameResource::SsaoRaw.is_persistent());
    }
}
