use crate::textures;
use lumen_assets::AssetSource;
use lumen_common::MaterialHandle;
use lumen_render::RenderError;
use lumen_scene::{Scene, SceneError};
use tracing::debug;

/// One bind group per scene material, indexed by handle.
pub(crate) struct MaterialTable {
    bind_groups: Vec<wgpu::BindGroup>,
    // Kept alive for the bind groups.
    _textures: Vec<wgpu::Texture>,
    _fallback: wgpu::Texture,
}

impl MaterialTable {
    pub(crate) fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        scene: &Scene,
        assets: &dyn AssetSource,
    ) -> Result<Self, RenderError> {
        let mut loaded = Vec::with_capacity(scene.textures().len());
        for desc in scene.textures() {
            let image = assets.texture(&desc.name, desc.role)?;
            debug!(name = %desc.name, role = ?desc.role, width = image.width(), "uploading texture");
            loaded.push(textures::upload_2d(
                device,
                queue,
                &desc.name,
                &image,
                desc.role.is_srgb(),
            ));
        }
        let views: Vec<wgpu::TextureView> =
            loaded.iter().map(|t| t.create_view(&Default::default())).collect();

        // Non-metallic: Basic materials sample it but ignore the value.
        let fallback = textures::solid(
            device,
            queue,
            "metal_fallback",
            wgpu::TextureFormat::Rgba8Unorm,
            &[0, 0, 0, 255],
        );
        let fallback_view = fallback.create_view(&Default::default());
        let sampler = textures::material_sampler(device);

        let mut bind_groups = Vec::with_capacity(scene.materials().len());
        for material in scene.materials() {
            let view = |handle: lumen_common::TextureHandle| {
                views
                    .get(handle.0 as usize)
                    .ok_or_else(|| SceneError::UnknownTexture {
                        material: material.name.clone(),
                        texture: handle,
                    })
            };
            let metal = match material.metal {
                Some(handle) => view(handle)?,
                None => &fallback_view,
            };
            bind_groups.push(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&material.name),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view(material.albedo)?),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(view(material.normal)?),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(view(material.roughness)?),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::TextureView(metal),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                ],
            }));
        }

        Ok(Self {
            bind_groups,
            _textures: loaded,
            _fallback: fallback,
        })
    }

    pub(crate) fn get(&self, handle: MaterialHandle) -> Option<&wgpu::BindGroup> {
        self.bind_groups.get(handle.0 as usize)
    }
}
