//! One-time environment convolution on the GPU.

use crate::shaders;
use crate::textures;
use lumen_assets::AssetSource;
use lumen_common::CubeFace;
use lumen_render::{
    BakeStep, CONSTANT_ALIGNMENT, ConstantRing, IblBakePlan, IblConstants, IblSettings,
    IblTarget, RenderError,
};
use std::num::NonZeroU64;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

pub(crate) const IRRADIANCE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub(crate) const SPECULAR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub(crate) const BRDF_LUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rg16Float;

/// The three lighting inputs produced by a bake.
pub struct BakedIbl {
    pub irradiance: wgpu::Texture,
    pub specular: wgpu::Texture,
    pub brdf_lut: wgpu::Texture,
    pub irradiance_view: wgpu::TextureView,
    pub specular_view: wgpu::TextureView,
    pub brdf_lut_view: wgpu::TextureView,
    pub specular_mip_count: u32,
}

/// Pipelines and layout for the bake passes.
pub struct IblBaker {
    layout: wgpu::BindGroupLayout,
    irradiance_pipeline: wgpu::RenderPipeline,
    specular_pipeline: wgpu::RenderPipeline,
    brdf_pipeline: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,
}

impl IblBaker {
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ibl_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(std::mem::size_of::<IblConstants>() as u64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ibl_pipeline_layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ibl_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::ibl_source().into()),
        });

        let pipeline = |label: &str, entry: &str, format: wgpu::TextureFormat| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_fullscreen"),
                    compilation_options: Default::default(),
                    buffers: &[],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(entry),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        };

        Self {
            irradiance_pipeline: pipeline("irradiance_pipeline", "fs_irradiance", IRRADIANCE_FORMAT),
            specular_pipeline: pipeline("specular_pipeline", "fs_specular", SPECULAR_FORMAT),
            brdf_pipeline: pipeline("brdf_pipeline", "fs_brdf", BRDF_LUT_FORMAT),
            sampler: textures::ibl_sampler(device),
            layout,
        }
    }

    /// Convolve `environment` (a cube view) into the lighting inputs, in one submit.
    pub fn bake(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        environment: &wgpu::TextureView,
        environment_face_size: u32,
        settings: &IblSettings,
    ) -> Result<BakedIbl, RenderError> {
        let plan = IblBakePlan::new(settings)?;
        let mip_count = settings.specular_mip_count();

        let cube = |label: &str, size: u32, mips: u32, format: wgpu::TextureFormat| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: size,
                    height: size,
                    depth_or_array_layers: 6,
                },
                mip_level_count: mips,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            })
        };
        let irradiance = cube("irradiance_map", settings.irradiance_face_size, 1, IRRADIANCE_FORMAT);
        let specular = cube("specular_map", settings.specular_face_size, mip_count, SPECULAR_FORMAT);
        let brdf_lut = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("brdf_lut"),
            size: wgpu::Extent3d {
                width: settings.brdf_lut_size,
                height: settings.brdf_lut_size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: BRDF_LUT_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let brdf_lut_view = brdf_lut.create_view(&Default::default());

        let mut ring = ConstantRing::new(
            plan.draw_count().max(1) as u64 * CONSTANT_ALIGNMENT,
            CONSTANT_ALIGNMENT,
        )?;
        let mut slots = Vec::with_capacity(plan.draw_count());
        for draw in plan.draws() {
            let sample_count = match draw.target {
                IblTarget::Irradiance => 0,
                IblTarget::Specular => settings.specular_sample_count,
                IblTarget::BrdfLut => settings.brdf_sample_count,
            };
            slots.push(ring.push(&IblConstants {
                face: draw.face.map_or(0, CubeFace::index),
                roughness: draw.roughness,
                sample_count,
                source_face_size: environment_face_size as f32,
                sample_delta: settings.irradiance_sample_delta,
                _pad: [0.0; 3],
            })?);
        }

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ibl_constants"),
            size: ring.capacity(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&buffer, 0, ring.staged());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ibl_bind_group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &buffer,
                        offset: 0,
                        size: NonZeroU64::new(std::mem::size_of::<IblConstants>() as u64),
                    }),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(environment),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("ibl_bake_encoder"),
        });
        let mut slot_iter = slots.iter();
        for step in plan.steps() {
            let draw = match step {
                BakeStep::Barrier(transition) => {
                    trace!(%transition, "ibl barrier");
                    continue;
                }
                BakeStep::Draw(draw) => draw,
            };
            let Some(slot) = slot_iter.next() else {
                return Err(RenderError::Gpu("bake plan and constants out of step".into()));
            };
            let face_view;
            let (view, pipeline) = match draw.target {
                IblTarget::Irradiance => {
                    face_view = textures::face_view(&irradiance, draw.face.map_or(0, CubeFace::index), 0);
                    (&face_view, &self.irradiance_pipeline)
                }
                IblTarget::Specular => {
                    face_view =
                        textures::face_view(&specular, draw.face.map_or(0, CubeFace::index), draw.mip);
                    (&face_view, &self.specular_pipeline)
                }
                IblTarget::BrdfLut => (&brdf_lut_view, &self.brdf_pipeline),
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ibl_bake_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                ..Default::default()
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[slot.offset]);
            pass.draw(0..3, 0..1);
        }
        queue.submit(std::iter::once(encoder.finish()));

        debug!(
            draws = plan.draw_count(),
            constant_bytes = ring.used(),
            "submitted IBL bake"
        );

        Ok(BakedIbl {
            irradiance_view: textures::cube_view(&irradiance, "irradiance_view"),
            specular_view: textures::cube_view(&specular, "specular_view"),
            brdf_lut_view,
            irradiance,
            specular,
            brdf_lut,
            specular_mip_count: mip_count,
        })
    }
}

/// Summary of a headless bake.
#[derive(Debug, Clone)]
pub struct BakeReport {
    pub adapter: String,
    pub backend: String,
    pub draws: usize,
    pub irradiance_face_size: u32,
    /// Face size of every specular mip, largest first.
    pub specular_mip_sizes: Vec<u32>,
    pub brdf_lut_size: u32,
    pub elapsed: Duration,
}

/// Bake the sky of `assets` on a fresh device without a window.
pub fn bake_headless(
    assets: &dyn AssetSource,
    sky: &str,
    settings: &IblSettings,
) -> Result<BakeReport, RenderError> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .ok_or_else(|| RenderError::Gpu("no compatible GPU adapter".into()))?;
    let info = adapter.get_info();
    info!(adapter = %info.name, backend = ?info.backend, "headless bake");

    let (device, queue) = pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some("lumen_bake_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
        },
        None,
    ))
    .map_err(|e| RenderError::Gpu(e.to_string()))?;

    let faces = assets.sky_faces(sky)?;
    let face_size = faces[0].width();
    let start = Instant::now();
    let environment = textures::upload_cube(&device, &queue, "environment_map", &faces);
    let environment_view = textures::cube_view(&environment, "environment_view");
    let baker = IblBaker::new(&device);
    let baked = baker.bake(&device, &queue, &environment_view, face_size, settings)?;
    let _ = device.poll(wgpu::Maintain::Wait);
    let elapsed = start.elapsed();

    let plan = IblBakePlan::new(settings)?;
    info!(elapsed_ms = elapsed.as_millis() as u64, "IBL bake finished");
    Ok(BakeReport {
        adapter: info.name,
        backend: format!("{:?}", info.backend),
        draws: plan.draw_count(),
        irradiance_face_size: settings.irradiance_face_size,
        specular_mip_sizes: (0..baked.specular_mip_count)
            .map(|mip| (settings.specular_face_size >> mip).max(1))
            .collect(),
        brdf_lut_size: settings.brdf_lut_size,
        elapsed,
    })
}
