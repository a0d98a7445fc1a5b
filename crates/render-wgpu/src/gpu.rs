//! The wgpu frame renderer.
//!
//! Executes a [`FramePlan`] against real targets: one constant upload per
//! frame, then each planned pass in order. wgpu inserts the actual barriers;
//! the planned transitions decide target usages and are traced per pass.

use crate::ibl::{BakedIbl, IblBaker};
use crate::materials::MaterialTable;
use crate::mesh::MeshTable;
use crate::pipelines::{Layouts, Pipelines};
use crate::targets::FrameTargets;
use crate::textures;
use lumen_assets::AssetSource;
use lumen_render::{
    CONSTANT_ALIGNMENT, ConstantRing, DepthAccess, FlyCamera, FrameConstants, FrameOptions,
    FramePacket, FramePlan, FrameResource, ObjectConstants, PassDesc, PassKind, RenderError,
    RenderSettings, SsaoConstants, SsaoKernel, Viewport, noise_texels, prepare_frame,
};
use lumen_scene::{Scene, ShadingModel};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::num::NonZeroU64;
use tracing::{debug, info, trace};

const SSAO_SEED: u64 = 0x55A0;

/// Counters from one submitted frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: usize,
    pub passes: usize,
    pub transitions: usize,
    pub constant_bytes: u64,
}

/// Bind groups over the screen-sized targets. Rebuilt with the targets.
struct TargetBindings {
    ssao: Option<wgpu::BindGroup>,
    blur: Option<wgpu::BindGroup>,
    composite: wgpu::BindGroup,
}

pub struct WgpuRenderer {
    settings: RenderSettings,
    overlay: bool,
    plan: FramePlan,
    targets: FrameTargets,
    bindings: TargetBindings,

    layouts: Layouts,
    pipelines: Pipelines,
    meshes: MeshTable,
    materials: MaterialTable,

    ring: ConstantRing,
    frame_buffer: wgpu::Buffer,
    object_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_bind_group: wgpu::BindGroup,

    ssao_kernel: SsaoKernel,
    ssao_buffer: wgpu::Buffer,
    _noise: wgpu::Texture,
    noise_view: wgpu::TextureView,
    _ao_fallback: wgpu::Texture,
    ao_fallback_view: wgpu::TextureView,

    _environment: wgpu::Texture,
    _environment_view: wgpu::TextureView,
    ibl: BakedIbl,
    _ibl_sampler: wgpu::Sampler,
}

impl WgpuRenderer {
    /// Upload the scene, bake IBL from its sky and build the frame targets.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        scene: &Scene,
        assets: &dyn AssetSource,
        settings: RenderSettings,
    ) -> Result<Self, RenderError> {
        scene.validate()?;
        settings.ibl.validate()?;

        let meshes = MeshTable::upload(device, scene, assets)?;

        let faces = assets.sky_faces(scene.sky())?;
        let face_size = faces[0].width();
        let environment = textures::upload_cube(device, queue, "environment_map", &faces);
        let environment_view = textures::cube_view(&environment, "environment_view");
        let ibl = IblBaker::new(device).bake(device, queue, &environment_view, face_size, &settings.ibl)?;
        info!(
            sky = scene.sky(),
            face_size,
            specular_mips = ibl.specular_mip_count,
            "baked image based lighting"
        );

        let layouts = Layouts::new(device);
        let pipelines = Pipelines::new(device, &layouts, surface_format);
        let materials = MaterialTable::upload(device, queue, &layouts.material, scene, assets)?;

        let ring = ConstantRing::new(settings.constant_ring_bytes, CONSTANT_ALIGNMENT)?;
        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_constants"),
            size: std::mem::size_of::<FrameConstants>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let object_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("object_constants"),
            size: ring.capacity(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let ibl_sampler = textures::ibl_sampler(device);
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &layouts.frame,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&ibl.irradiance_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&ibl.specular_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&ibl.brdf_lut_view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&environment_view),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(&ibl_sampler),
                },
            ],
        });
        let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object_bind_group"),
            layout: &layouts.object,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &object_buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<ObjectConstants>() as u64),
                }),
            }],
        });

        let mut rng = StdRng::seed_from_u64(SSAO_SEED);
        let ssao_kernel = SsaoKernel::generate(lumen_render::MAX_SSAO_SAMPLES, &mut rng);
        let noise = noise_texture(device, queue, &mut rng);
        let noise_view = noise.create_view(&Default::default());
        let ssao_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ssao_constants"),
            size: std::mem::size_of::<SsaoConstants>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let ao_fallback = textures::solid(
            device,
            queue,
            "ao_fallback",
            wgpu::TextureFormat::R8Unorm,
            &[255],
        );
        let ao_fallback_view = ao_fallback.create_view(&Default::default());

        let overlay = false;
        let plan = FramePlan::build(frame_options(&settings, overlay))?;
        let viewport = Viewport::new(width, height);
        let targets = FrameTargets::new(device, &plan, viewport);
        let bindings = bind_targets(
            device,
            &layouts,
            &plan,
            &targets,
            &frame_buffer,
            &ssao_buffer,
            &noise_view,
            &ao_fallback_view,
        )?;
        queue.write_buffer(
            &ssao_buffer,
            0,
            bytemuck::bytes_of(&SsaoConstants::new(&ssao_kernel, &settings.ssao, viewport)),
        );

        debug!(plan = %plan, "frame plan");

        Ok(Self {
            settings,
            overlay,
            plan,
            targets,
            bindings,
            layouts,
            pipelines,
            meshes,
            materials,
            ring,
            frame_buffer,
            object_buffer,
            frame_bind_group,
            object_bind_group,
            ssao_kernel,
            ssao_buffer,
            _noise: noise,
            noise_view,
            _ao_fallback: ao_fallback,
            ao_fallback_view,
            _environment: environment,
            _environment_view: environment_view,
            ibl,
            _ibl_sampler: ibl_sampler,
        })
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn plan(&self) -> &FramePlan {
        &self.plan
    }

    pub fn viewport(&self) -> Viewport {
        self.targets.viewport()
    }

    /// The baked BRDF table, for previews.
    pub fn brdf_lut_view(&self) -> &wgpu::TextureView {
        &self.ibl.brdf_lut_view
    }

    pub fn specular_mip_count(&self) -> u32 {
        self.ibl.specular_mip_count
    }

    /// Peak per-frame constant usage so far.
    pub fn constant_high_water_mark(&self) -> u64 {
        self.ring.high_water_mark()
    }

    /// Apply new switches. The pass list and targets are rebuilt only when the
    /// enabled passes change. IBL settings take effect on the next bake.
    pub fn apply_settings(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        settings: RenderSettings,
    ) -> Result<(), RenderError> {
        let options = frame_options(&settings, self.overlay);
        self.settings = settings;
        if options != self.plan.options() {
            self.rebuild(device, FramePlan::build(options)?, self.targets.viewport())?;
        }
        self.write_ssao_constants(queue);
        Ok(())
    }

    /// Record an overlay pass in the plan. The caller draws it after [`Self::render`].
    pub fn set_overlay(&mut self, device: &wgpu::Device, overlay: bool) -> Result<(), RenderError> {
        if overlay == self.overlay {
            return Ok(());
        }
        self.overlay = overlay;
        let plan = FramePlan::build(frame_options(&self.settings, overlay))?;
        self.rebuild(device, plan, self.targets.viewport())
    }

    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let viewport = Viewport::new(width, height);
        if viewport == self.targets.viewport() {
            return Ok(());
        }
        self.rebuild(device, self.plan.clone(), viewport)?;
        self.write_ssao_constants(queue);
        Ok(())
    }

    fn rebuild(
        &mut self,
        device: &wgpu::Device,
        plan: FramePlan,
        viewport: Viewport,
    ) -> Result<(), RenderError> {
        debug!(width = viewport.width, height = viewport.height, plan = %plan, "rebuilding frame targets");
        let targets = FrameTargets::new(device, &plan, viewport);
        self.bindings = bind_targets(
            device,
            &self.layouts,
            &plan,
            &targets,
            &self.frame_buffer,
            &self.ssao_buffer,
            &self.noise_view,
            &self.ao_fallback_view,
        )?;
        self.targets = targets;
        self.plan = plan;
        Ok(())
    }

    fn write_ssao_constants(&self, queue: &wgpu::Queue) {
        let constants =
            SsaoConstants::new(&self.ssao_kernel, &self.settings.ssao, self.targets.viewport());
        queue.write_buffer(&self.ssao_buffer, 0, bytemuck::bytes_of(&constants));
    }

    /// Render one frame of `scene` into `backbuffer` and submit it.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        backbuffer: &wgpu::TextureView,
        scene: &Scene,
        camera: &FlyCamera,
    ) -> Result<FrameStats, RenderError> {
        let packet = prepare_frame(
            scene,
            camera,
            &self.settings,
            self.targets.viewport(),
            self.ibl.specular_mip_count,
            &mut self.ring,
        )?;

        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&*packet.frame));
        if !self.ring.staged().is_empty() {
            queue.write_buffer(&self.object_buffer, 0, self.ring.staged());
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });
        let mut passes = 0;
        for planned in self.plan.passes() {
            for transition in &planned.transitions {
                trace!(pass = planned.desc.label, %transition, "transition");
            }
            if planned.desc.kind == PassKind::Overlay {
                continue;
            }
            self.record_pass(&mut encoder, &planned.desc, backbuffer, &packet)?;
            passes += 1;
        }
        for transition in self.plan.final_transitions() {
            trace!(%transition, "end of frame transition");
        }
        queue.submit(std::iter::once(encoder.finish()));

        Ok(FrameStats {
            draw_calls: packet.draw_call_count(),
            passes,
            transitions: self.plan.transition_count(),
            constant_bytes: self.ring.used(),
        })
    }

    fn target(&self, resource: FrameResource) -> Result<&wgpu::TextureView, RenderError> {
        self.targets
            .view(resource)
            .ok_or(RenderError::UnknownResource(resource))
    }

    fn clear_value(&self, resource: FrameResource) -> wgpu::Color {
        match resource {
            FrameResource::SceneColor => {
                let [r, g, b, a] = self.settings.clear_color.map(f64::from);
                wgpu::Color { r, g, b, a }
            }
            _ => wgpu::Color::TRANSPARENT,
        }
    }

    fn record_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        desc: &PassDesc,
        backbuffer: &wgpu::TextureView,
        packet: &FramePacket,
    ) -> Result<(), RenderError> {
        // Only the gizmo and sky passes draw over earlier output.
        let clears = !matches!(desc.kind, PassKind::LightGizmos | PassKind::Sky);

        let mut colors = Vec::with_capacity(desc.colors.len());
        for &resource in &desc.colors {
            let view = match resource {
                FrameResource::BackBuffer => backbuffer,
                _ => self.target(resource)?,
            };
            let load = if clears {
                wgpu::LoadOp::Clear(self.clear_value(resource))
            } else {
                wgpu::LoadOp::Load
            };
            colors.push(Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            }));
        }

        let depth_stencil_attachment = match desc.depth {
            Some(access) => Some(wgpu::RenderPassDepthStencilAttachment {
                view: self.target(FrameResource::Depth)?,
                depth_ops: match access {
                    DepthAccess::Write => Some(wgpu::Operations {
                        load: if clears {
                            wgpu::LoadOp::Clear(1.0)
                        } else {
                            wgpu::LoadOp::Load
                        },
                        store: wgpu::StoreOp::Store,
                    }),
                    DepthAccess::ReadOnly => None,
                },
                stencil_ops: None,
            }),
            None => None,
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(desc.label),
            color_attachments: &colors,
            depth_stencil_attachment,
            ..Default::default()
        });

        match desc.kind {
            PassKind::Opaque => {
                pass.set_bind_group(0, &self.frame_bind_group, &[]);
                let mut bound = None;
                for draw in &packet.draws {
                    if bound != Some(draw.shading) {
                        pass.set_pipeline(match draw.shading {
                            ShadingModel::Pbr => &self.pipelines.pbr,
                            ShadingModel::Basic => &self.pipelines.basic,
                        });
                        bound = Some(draw.shading);
                    }
                    let mesh = self
                        .meshes
                        .get(draw.mesh)
                        .ok_or_else(|| RenderError::Gpu(format!("mesh {:?} not uploaded", draw.mesh)))?;
                    let material = self.materials.get(draw.material).ok_or_else(|| {
                        RenderError::Gpu(format!("material {:?} not uploaded", draw.material))
                    })?;
                    pass.set_bind_group(1, &self.object_bind_group, &[draw.constants.offset]);
                    pass.set_bind_group(2, material, &[]);
                    mesh.draw(&mut pass);
                }
            }
            PassKind::LightGizmos => {
                let mesh = self.meshes.get(packet.light_mesh).ok_or_else(|| {
                    RenderError::Gpu(format!("mesh {:?} not uploaded", packet.light_mesh))
                })?;
                pass.set_pipeline(&self.pipelines.gizmo);
                pass.set_bind_group(0, &self.frame_bind_group, &[]);
                for gizmo in &packet.gizmos {
                    pass.set_bind_group(1, &self.object_bind_group, &[gizmo.constants.offset]);
                    mesh.draw(&mut pass);
                }
            }
            PassKind::Sky => {
                let mesh = self.meshes.get(packet.sky_mesh).ok_or_else(|| {
                    RenderError::Gpu(format!("mesh {:?} not uploaded", packet.sky_mesh))
                })?;
                pass.set_pipeline(&self.pipelines.sky);
                pass.set_bind_group(0, &self.frame_bind_group, &[]);
                mesh.draw(&mut pass);
            }
            PassKind::Ssao => {
                let bind_group = self.bindings.ssao.as_ref().ok_or(RenderError::UnknownResource(
                    FrameResource::SsaoRaw,
                ))?;
                pass.set_pipeline(&self.pipelines.ssao);
                pass.set_bind_group(0, bind_group, &[]);
                pass.draw(0..3, 0..1);
            }
            PassKind::SsaoBlur => {
                let bind_group = self.bindings.blur.as_ref().ok_or(RenderError::UnknownResource(
                    FrameResource::SsaoBlurred,
                ))?;
                pass.set_pipeline(&self.pipelines.blur);
                pass.set_bind_group(0, bind_group, &[]);
                pass.draw(0..3, 0..1);
            }
            PassKind::Composite => {
                pass.set_pipeline(&self.pipelines.composite);
                pass.set_bind_group(0, &self.bindings.composite, &[]);
                pass.draw(0..3, 0..1);
            }
            PassKind::Overlay => {}
        }
        Ok(())
    }
}

fn frame_options(settings: &RenderSettings, overlay: bool) -> FrameOptions {
    FrameOptions {
        overlay,
        ..settings.frame_options()
    }
}

fn noise_texture(device: &wgpu::Device, queue: &wgpu::Queue, rng: &mut StdRng) -> wgpu::Texture {
    let size = lumen_render::NOISE_SIZE;
    let texels = noise_texels(rng);
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("ssao_noise"),
        size: wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        bytemuck::cast_slice(&texels),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * size),
            rows_per_image: Some(size),
        },
        wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        },
    );
    texture
}

#[allow(clippy::too_many_arguments)]
fn bind_targets(
    device: &wgpu::Device,
    layouts: &Layouts,
    plan: &FramePlan,
    targets: &FrameTargets,
    frame_buffer: &wgpu::Buffer,
    ssao_buffer: &wgpu::Buffer,
    noise_view: &wgpu::TextureView,
    ao_fallback_view: &wgpu::TextureView,
) -> Result<TargetBindings, RenderError> {
    let view = |resource| targets.view(resource).ok_or(RenderError::UnknownResource(resource));
    let texture = |binding, view| wgpu::BindGroupEntry {
        binding,
        resource: wgpu::BindingResource::TextureView(view),
    };

    let ssao = if plan.contains(PassKind::Ssao) {
        Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ssao_bind_group"),
            layout: &layouts.ssao,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: ssao_buffer.as_entire_binding(),
                },
                texture(2, view(FrameResource::SceneNormals)?),
                texture(3, view(FrameResource::SceneDepth)?),
                texture(4, noise_view),
            ],
        }))
    } else {
        None
    };

    let blur = if plan.contains(PassKind::SsaoBlur) {
        Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ssao_blur_bind_group"),
            layout: &layouts.blur,
            entries: &[texture(0, view(FrameResource::SsaoRaw)?)],
        }))
    } else {
        None
    };

    let ao = match plan.ao_source() {
        Some(resource) => view(resource)?,
        None => ao_fallback_view,
    };
    let composite = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("composite_bind_group"),
        layout: &layouts.composite,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            },
            texture(1, view(FrameResource::SceneColor)?),
            texture(2, view(FrameResource::SceneAmbient)?),
            texture(3, ao),
        ],
    });

    Ok(TargetBindings {
        ssao,
        blur,
        composite,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_only_changes_the_tail_of_the_plan() {
        let settings = RenderSettings::default();
        let without = FramePlan::build(frame_options(&settings, false)).unwrap();
        let with = FramePlan::build(frame_options(&settings, true)).unwrap();
        assert_eq!(with.passes().len(), without.passes().len() + 1);
        assert_eq!(
            with.passes().last().map(|p| p.desc.kind),
            Some(PassKind::Overlay)
        );
    }

    #[test]
    fn frame_stats_default_is_zeroed() {
        let stats = FrameStats::default();
        assert_eq!(stats.draw_calls, 0);
        assert_eq!(stats.constant_bytes, 0);
    }
}
