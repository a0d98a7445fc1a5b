use lumen_render::{FramePlan, FrameResource, ResourceUsages, Viewport};
use std::collections::BTreeMap;
use tracing::debug;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Texture format of a frame-owned target. `None` for the back buffer and
/// the persistent IBL maps, which are not created here.
pub(crate) fn target_format(resource: FrameResource) -> Option<wgpu::TextureFormat> {
    use FrameResource::*;
    match resource {
        SceneColor | SceneAmbient | SceneNormals => Some(wgpu::TextureFormat::Rgba16Float),
        SceneDepth => Some(wgpu::TextureFormat::R32Float),
        SsaoRaw | SsaoBlurred => Some(wgpu::TextureFormat::R8Unorm),
        Depth => Some(DEPTH_FORMAT),
        BackBuffer | EnvironmentMap | IrradianceMap | SpecularMap | BrdfLut => None,
    }
}

pub(crate) fn texture_usages(usages: ResourceUsages) -> wgpu::TextureUsages {
    let mut out = wgpu::TextureUsages::empty();
    if usages.intersects(ResourceUsages::RENDER_TARGET | ResourceUsages::DEPTH_STENCIL) {
        out |= wgpu::TextureUsages::RENDER_ATTACHMENT;
    }
    if usages.contains(ResourceUsages::SAMPLED) {
        out |= wgpu::TextureUsages::TEXTURE_BINDING;
    }
    if usages.contains(ResourceUsages::COPY_SRC) {
        out |= wgpu::TextureUsages::COPY_SRC;
    }
    if usages.contains(ResourceUsages::COPY_DST) {
        out |= wgpu::TextureUsages::COPY_DST;
    }
    out
}

/// Screen-sized textures the frame plan renders into.
pub(crate) struct FrameTargets {
    viewport: Viewport,
    views: BTreeMap<FrameResource, wgpu::TextureView>,
}

impl FrameTargets {
    pub(crate) fn new(device: &wgpu::Device, plan: &FramePlan, viewport: Viewport) -> Self {
        let mut views = BTreeMap::new();
        for resource in plan.resources() {
            let Some(format) = target_format(resource) else {
                continue;
            };
            let usage = texture_usages(plan.required_usages(resource));
            debug!(?resource, ?format, ?usage, width = viewport.width, height = viewport.height, "creating frame target");
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some(&format!("{resource:?}")),
                size: wgpu::Extent3d {
                    width: viewport.width,
                    height: viewport.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage,
                view_formats: &[],
            });
            views.insert(resource, texture.create_view(&Default::default()));
        }
        Self { viewport, views }
    }

    pub(crate) fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub(crate) fn view(&self, resource: FrameResource) -> Option<&wgpu::TextureView> {
        self.views.get(&resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_render::FrameOptions;

    #[test]
    fn formats_cover_planned_targets() {
        let plan = FramePlan::build(FrameOptions {
            ssao: true,
            ssao_blur: true,
            light_gizmos: true,
            overlay: false,
        })
        .unwrap();
        for resource in plan.resources() {
            if resource != FrameResource::BackBuffer {
                assert!(target_format(resource).is_some(), "{resource:?}");
            }
        }
        assert_eq!(target_format(FrameResource::BrdfLut), None);
    }

    #[test]
    fn usages_map_to_wgpu() {
        let plan = FramePlan::build(FrameOptions::default()).unwrap();
        let color = texture_usages(plan.required_usages(FrameResource::SceneColor));
        assert!(color.contains(
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING
        ));
        let depth = texture_usages(plan.required_usages(FrameResource::Depth));
        assert_eq!(depth, wgpu::TextureUsages::RENDER_ATTACHMENT);
    }
}
