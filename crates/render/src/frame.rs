//! The frame plan: which passes run, in what order, and the resource
//! transitions each one needs.
//!
//! # Invariants
//! - The back buffer starts and ends every frame in `Present`.
//! - Every touched resource ends the frame in its resting state, so each
//!   frame starts from the same states as the one before.
//! - A transient target is never read before a pass of the same frame writes it.
//! - No pass reads a resource it also writes.

use crate::state::{FrameResource, ResourceState, ResourceUsages, StateTracker, Transition};
use crate::RenderError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Which optional passes run this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameOptions {
    pub ssao: bool,
    pub ssao_blur: bool,
    pub light_gizmos: bool,
    /// Leave room for a UI pass drawn by the caller after composite.
    pub overlay: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PassKind {
    Opaque,
    LightGizmos,
    Sky,
    Ssao,
    SsaoBlur,
    Composite,
    Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DepthAccess {
    Write,
    ReadOnly,
}

impl DepthAccess {
    fn state(self) -> ResourceState {
        match self {
            DepthAccess::Write => ResourceState::DepthWrite,
            DepthAccess::ReadOnly => ResourceState::DepthRead,
        }
    }
}

/// Attachments and inputs of one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassDesc {
    pub kind: PassKind,
    pub label: &'static str,
    /// Color attachments in location order.
    pub colors: Vec<FrameResource>,
    pub depth: Option<DepthAccess>,
    /// Resources sampled by the pass.
    pub reads: Vec<FrameResource>,
}

impl PassDesc {
    fn writes(&self, resource: FrameResource) -> bool {
        self.colors.contains(&resource)
            || (resource == FrameResource::Depth && self.depth.is_some())
    }
}

/// A pass and the barriers recorded in front of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedPass {
    pub desc: PassDesc,
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FramePlan {
    options: FrameOptions,
    passes: Vec<PlannedPass>,
    final_transitions: Vec<Transition>,
    #[serde(skip)]
    usages: BTreeMap<FrameResource, ResourceUsages>,
}

impl FramePlan {
    pub fn build(options: FrameOptions) -> Result<Self, RenderError> {
        let mut plan = Self::from_passes(Self::describe(options))?;
        plan.options = options;
        Ok(plan)
    }

    /// The standard pass list for `options`.
    pub fn describe(options: FrameOptions) -> Vec<PassDesc> {
        use FrameResource::*;

        let mut passes = vec![PassDesc {
            kind: PassKind::Opaque,
            label: "opaque",
            colors: vec![SceneColor, SceneAmbient, SceneNormals, SceneDepth],
            depth: Some(DepthAccess::Write),
            reads: vec![IrradianceMap, SpecularMap, BrdfLut],
        }];
        if options.light_gizmos {
            passes.push(PassDesc {
                kind: PassKind::LightGizmos,
                label: "light_gizmos",
                colors: vec![SceneColor],
                depth: Some(DepthAccess::Write),
                reads: vec![],
            });
        }
        passes.push(PassDesc {
            kind: PassKind::Sky,
            label: "sky",
            colors: vec![SceneColor],
            depth: Some(DepthAccess::ReadOnly),
            reads: vec![EnvironmentMap],
        });

        let mut composite_reads = vec![SceneColor, SceneAmbient];
        if options.ssao {
            passes.push(PassDesc {
                kind: PassKind::Ssao,
                label: "ssao",
                colors: vec![SsaoRaw],
                depth: None,
                reads: vec![SceneNormals, SceneDepth],
            });
            if options.ssao_blur {
                passes.push(PassDesc {
                    kind: PassKind::SsaoBlur,
                    label: "ssao_blur",
                    colors: vec![SsaoBlurred],
                    depth: None,
                    reads: vec![SsaoRaw],
                });
                composite_reads.push(SsaoBlurred);
            } else {
                composite_reads.push(SsaoRaw);
            }
        }
        passes.push(PassDesc {
            kind: PassKind::Composite,
            label: "composite",
            colors: vec![BackBuffer],
            depth: None,
            reads: composite_reads,
        });
        if options.overlay {
            passes.push(PassDesc {
                kind: PassKind::Overlay,
                label: "overlay",
                colors: vec![BackBuffer],
                depth: None,
                reads: vec![],
            });
        }
        passes
    }

    /// Validate an arbitrary pass list and record its transitions.
    pub fn from_passes(descs: Vec<PassDesc>) -> Result<Self, RenderError> {
        let mut tracker = StateTracker::new();
        for resource in FrameResource::ALL {
            tracker.register(resource, resource.resting_state())?;
        }

        let mut written = BTreeSet::new();
        let mut touched = Vec::new();
        let mut usages: BTreeMap<FrameResource, ResourceUsages> = BTreeMap::new();
        let mut passes = Vec::with_capacity(descs.len());

        for desc in descs {
            let mut uses = Vec::new();
            for &resource in &desc.reads {
                if desc.writes(resource) {
                    return Err(RenderError::ReadWriteHazard {
                        pass: desc.label,
                        resource,
                    });
                }
                if !resource.is_persistent() && !written.contains(&resource) {
                    return Err(RenderError::ReadBeforeWrite {
                        pass: desc.label,
                        resource,
                    });
                }
                uses.push((resource, ResourceState::ShaderResource));
            }
            for &resource in &desc.colors {
                uses.push((resource, ResourceState::RenderTarget));
            }
            if let Some(access) = desc.depth {
                if access == DepthAccess::ReadOnly && !written.contains(&FrameResource::Depth) {
                    return Err(RenderError::ReadBeforeWrite {
                        pass: desc.label,
                        resource: FrameResource::Depth,
                    });
                }
                uses.push((FrameResource::Depth, access.state()));
            }

            let mut transitions = Vec::new();
            for (resource, state) in uses {
                if let Some(t) = tracker.transition(resource, state)? {
                    transitions.push(t);
                }
                if state.is_write() {
                    written.insert(resource);
                }
                *usages.entry(resource).or_default() |= state.usage();
                if !touched.contains(&resource) {
                    touched.push(resource);
                }
            }
            passes.push(PlannedPass { desc, transitions });
        }

        let mut final_transitions = Vec::new();
        for &resource in &touched {
            let resting = resource.resting_state();
            *usages.entry(resource).or_default() |= resting.usage();
            if let Some(t) = tracker.transition(resource, resting)? {
                final_transitions.push(t);
            }
        }

        Ok(Self {
            options: FrameOptions::default(),
            passes,
            final_transitions,
            usages,
        })
    }

    pub fn options(&self) -> FrameOptions {
        self.options
    }

    pub fn passes(&self) -> &[PlannedPass] {
        &self.passes
    }

    pub fn pass(&self, kind: PassKind) -> Option<&PlannedPass> {
        self.passes.iter().find(|p| p.desc.kind == kind)
    }

    pub fn contains(&self, kind: PassKind) -> bool {
        self.pass(kind).is_some()
    }

    /// Barriers that return resources to their resting state after the last pass.
    pub fn final_transitions(&self) -> &[Transition] {
        &self.final_transitions
    }

    pub fn transition_count(&self) -> usize {
        self.passes.iter().map(|p| p.transitions.len()).sum::<usize>()
            + self.final_transitions.len()
    }

    /// Frame-owned targets the plan touches, in first-use order.
    pub fn resources(&self) -> Vec<FrameResource> {
        let mut out = Vec::new();
        for pass in &self.passes {
            let used = pass
                .desc
                .colors
                .iter()
                .chain(&pass.desc.reads)
                .copied()
                .chain(pass.desc.depth.map(|_| FrameResource::Depth));
            for resource in used {
                if !resource.is_persistent() && !out.contains(&resource) {
                    out.push(resource);
                }
            }
        }
        out
    }

    /// Everything the resource is used as over a frame, resting state included.
    pub fn required_usages(&self, resource: FrameResource) -> ResourceUsages {
        self.usages.get(&resource).copied().unwrap_or_default()
    }

    /// The occlusion target the composite samples, if any.
    pub fn ao_source(&self) -> Option<FrameResource> {
        self.pass(PassKind::Composite).and_then(|p| {
            p.desc
                .reads
                .iter()
                .copied()
                .find(|r| matches!(r, FrameResource::SsaoRaw | FrameResource::SsaoBlurred))
        })
    }
}

impl fmt::Display for FramePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pass) in self.passes.iter().enumerate() {
            let depth = match pass.desc.depth {
                Some(DepthAccess::Write) => "write",
                Some(DepthAccess::ReadOnly) => "read",
                None => "none",
            };
            writeln!(
                f,
                "{}. {} colors={:?} depth={} reads={:?}",
                i + 1,
                pass.desc.label,
                pass.desc.colors,
                depth,
                pass.desc.reads
            )?;
            for t in &pass.transitions {
                writeln!(f, "     barrier {t}")?;
            }
        }
        writeln!(f, "end of frame:")?;
        for t in &self.final_transitions {
            writeln!(f, "     barrier {t}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use FrameResource::*;

    fn full() -> FrameOptions {
        FrameOptions {
            ssao: true,
            ssao_blur: true,
            light_gizmos: true,
            overlay: true,
        }
    }

    fn kinds(plan: &FramePlan) -> Vec<PassKind> {
        plan.passes().iter().map(|p| p.desc.kind).collect()
    }

    #[test]
    fn full_pass_order() {
        let plan = FramePlan::build(full()).unwrap();
        assert_eq!(
            kinds(&plan),
            vec![
                PassKind::Opaque,
                PassKind::LightGizmos,
                PassKind::Sky,
                PassKind::Ssao,
                PassKind::SsaoBlur,
                PassKind::Composite,
                PassKind::Overlay,
            ]
        );
        assert_eq!(plan.ao_source(), Some(SsaoBlurred));
    }

    #[test]
    fn minimal_pass_order() {
        let plan = FramePlan::build(FrameOptions::default()).unwrap();
        assert_eq!(
            kinds(&plan),
            vec![PassKind::Opaque, PassKind::Sky, PassKind::Composite]
        );
        assert_eq!(plan.ao_source(), None);
        assert!(!plan.resources().contains(&SsaoRaw));
    }

    #[test]
    fn unblurred_ssao_feeds_composite_directly() {
        let plan = FramePlan::build(FrameOptions {
            ssao: true,
            ..FrameOptions::default()
        })
        .unwrap();
        assert!(!plan.contains(PassKind::SsaoBlur));
        assert_eq!(plan.ao_source(), Some(SsaoRaw));
    }

    #[test]
    fn backbuffer_starts_and_ends_presentable() {
        let plan = FramePlan::build(full()).unwrap();
        let composite = plan.pass(PassKind::Composite).unwrap();
        assert!(composite.transitions.contains(&Transition {
            resource: BackBuffer,
            before: ResourceState::Present,
            after: ResourceState::RenderTarget,
        }));
        assert!(plan.final_transitions().contains(&Transition {
            resource: BackBuffer,
            before: ResourceState::RenderTarget,
            after: ResourceState::Present,
        }));
    }

    #[test]
    fn sky_reads_depth_and_frame_restores_it() {
        let plan = FramePlan::build(FrameOptions::default()).unwrap();
        let sky = plan.pass(PassKind::Sky).unwrap();
        assert_eq!(
            sky.transitions,
            vec![Transition {
                resource: Depth,
                before: ResourceState::DepthWrite,
                after: ResourceState::DepthRead,
            }]
        );
        assert!(plan.final_transitions().iter().any(|t| t.resource == Depth
            && t.after == ResourceState::DepthWrite));
    }

    #[test]
    fn opaque_targets_enter_and_leave_render_target() {
        let plan = FramePlan::build(full()).unwrap();
        let opaque = plan.pass(PassKind::Opaque).unwrap();
        for target in [SceneColor, SceneAmbient, SceneNormals, SceneDepth] {
            assert!(opaque.transitions.iter().any(|t| t.resource == target
                && t.after == ResourceState::RenderTarget));
        }
        // Persistent inputs are already shader resources.
        assert!(opaque.transitions.iter().all(|t| !t.resource.is_persistent()));
        let ssao = plan.pass(PassKind::Ssao).unwrap();
        assert!(ssao.transitions.iter().any(|t| t.resource == SceneNormals
            && t.after == ResourceState::ShaderResource));
    }

    #[test]
    fn frames_are_repeatable() {
        for options in [full(), FrameOptions::default()] {
            let plan = FramePlan::build(options).unwrap();
            let mut states: BTreeMap<FrameResource, ResourceState> = FrameResource::ALL
                .iter()
                .map(|r| (*r, r.resting_state()))
                .collect();
            let all = plan
                .passes()
                .iter()
                .flat_map(|p| p.transitions.iter())
                .chain(plan.final_transitions());
            for t in all {
                assert_eq!(states[&t.resource], t.before, "{t}");
                states.insert(t.resource, t.after);
            }
            for (resource, state) in states {
                assert_eq!(state, resource.resting_state());
            }
        }
    }

    #[test]
    fn usages_cover_every_state() {
        let plan = FramePlan::build(full()).unwrap();
        let color = plan.required_usages(SceneColor);
        assert!(color.contains(ResourceUsages::RENDER_TARGET | ResourceUsages::SAMPLED));
        assert_eq!(plan.required_usages(Depth), ResourceUsages::DEPTH_STENCIL);
        assert!(plan
            .required_usages(BackBuffer)
            .contains(ResourceUsages::RENDER_TARGET | ResourceUsages::PRESENT));
        assert!(plan.required_usages(SsaoBlurred).contains(ResourceUsages::SAMPLED));
    }

    #[test]
    fn read_before_write_is_rejected() {
        let passes = vec![PassDesc {
            kind: PassKind::Composite,
            label: "composite",
            colors: vec![BackBuffer],
            depth: None,
            reads: vec![SceneColor],
        }];
        assert!(matches!(
            FramePlan::from_passes(passes),
            Err(RenderError::ReadBeforeWrite {
                resource: SceneColor,
                ..
            })
        ));

        let sky_first = vec![PassDesc {
            kind: PassKind::Sky,
            label: "sky",
            colors: vec![SceneColor],
            depth: Some(DepthAccess::ReadOnly),
            reads: vec![EnvironmentMap],
        }];
        assert!(matches!(
            FramePlan::from_passes(sky_first),
            Err(RenderError::ReadBeforeWrite { resource: Depth, .. })
        ));
    }

    #[test]
    fn read_write_hazard_is_rejected() {
        let passes = vec![
            PassDesc {
                kind: PassKind::Ssao,
                label: "ssao",
                colors: vec![SsaoRaw],
                depth: None,
                reads: vec![],
            },
            PassDesc {
                kind: PassKind::SsaoBlur,
                label: "ssao_blur",
                colors: vec![SsaoRaw],
                depth: None,
                reads: vec![SsaoRaw],
            },
        ];
        assert!(matches!(
            FramePlan::from_passes(passes),
            Err(RenderError::ReadWriteHazard { .. })
        ));
    }

    #[test]
    fn display_lists_passes_and_barriers() {
        let plan = FramePlan::build(full()).unwrap();
        let text = plan.to_string();
        assert!(text.contains("1. opaque"));
        assert!(text.contains("barrier BackBuffer: RenderTarget -> Present"));
        assert!(plan.transition_count() > 0);
    }
}
