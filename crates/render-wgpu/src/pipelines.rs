//! Bind group layouts and render pipelines for the per-frame passes.

use crate::mesh;
use crate::shaders;
use crate::targets::{DEPTH_FORMAT, target_format};
use lumen_render::{FrameConstants, FrameResource, ObjectConstants, SsaoConstants};
use std::num::NonZeroU64;

fn uniform_entry(binding: u32, size: usize, dynamic: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: NonZeroU64::new(size as u64),
        },
        count: None,
    }
}

fn texture_entry(
    binding: u32,
    dimension: wgpu::TextureViewDimension,
    filterable: bool,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable },
            view_dimension: dimension,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn color_target(resource: FrameResource) -> Option<wgpu::ColorTargetState> {
    target_format(resource).map(|format| wgpu::ColorTargetState {
        format,
        blend: None,
        write_mask: wgpu::ColorWrites::ALL,
    })
}

pub(crate) struct Layouts {
    /// Group 0 of the scene passes: frame constants and IBL inputs.
    pub frame: wgpu::BindGroupLayout,
    /// Group 1: per-draw constants behind a dynamic offset.
    pub object: wgpu::BindGroupLayout,
    /// Group 2: material textures.
    pub material: wgpu::BindGroupLayout,
    pub ssao: wgpu::BindGroupLayout,
    pub blur: wgpu::BindGroupLayout,
    pub composite: wgpu::BindGroupLayout,
}

impl Layouts {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        use wgpu::TextureViewDimension::{Cube, D2};

        let frame = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[
                uniform_entry(0, std::mem::size_of::<FrameConstants>(), false),
                texture_entry(1, Cube, true),
                texture_entry(2, Cube, true),
                texture_entry(3, D2, true),
                texture_entry(4, Cube, true),
                sampler_entry(5),
            ],
        });
        let object = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[uniform_entry(0, std::mem::size_of::<ObjectConstants>(), true)],
        });
        let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_bind_group_layout"),
            entries: &[
                texture_entry(0, D2, true),
                texture_entry(1, D2, true),
                texture_entry(2, D2, true),
                texture_entry(3, D2, true),
                sampler_entry(4),
            ],
        });
        let ssao = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ssao_bind_group_layout"),
            entries: &[
                uniform_entry(0, std::mem::size_of::<FrameConstants>(), false),
                uniform_entry(1, std::mem::size_of::<SsaoConstants>(), false),
                texture_entry(2, D2, false),
                texture_entry(3, D2, false),
                texture_entry(4, D2, false),
            ],
        });
        let blur = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ssao_blur_bind_group_layout"),
            entries: &[texture_entry(0, D2, false)],
        });
        let composite = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("composite_bind_group_layout"),
            entries: &[
                uniform_entry(0, std::mem::size_of::<FrameConstants>(), false),
                texture_entry(1, D2, false),
                texture_entry(2, D2, false),
                texture_entry(3, D2, false),
            ],
        });

        Self {
            frame,
            object,
            material,
            ssao,
            blur,
            composite,
        }
    }
}

pub(crate) struct Pipelines {
    pub pbr: wgpu::RenderPipeline,
    pub basic: wgpu::RenderPipeline,
    pub gizmo: wgpu::RenderPipeline,
    pub sky: wgpu::RenderPipeline,
    pub ssao: wgpu::RenderPipeline,
    pub blur: wgpu::RenderPipeline,
    pub composite: wgpu::RenderPipeline,
}

impl Pipelines {
    pub(crate) fn new(
        device: &wgpu::Device,
        layouts: &Layouts,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let forward = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("forward_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::forward_source().into()),
        });

        let scene_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&layouts.frame, &layouts.object, &layouts.material],
            push_constant_ranges: &[],
        });
        let gizmo_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gizmo_pipeline_layout"),
            bind_group_layouts: &[&layouts.frame, &layouts.object],
            push_constant_ranges: &[],
        });
        let sky_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sky_pipeline_layout"),
            bind_group_layouts: &[&layouts.frame],
            push_constant_ranges: &[],
        });

        let scene_targets = [
            color_target(FrameResource::SceneColor),
            color_target(FrameResource::SceneAmbient),
            color_target(FrameResource::SceneNormals),
            color_target(FrameResource::SceneDepth),
        ];
        let scene_color = [color_target(FrameResource::SceneColor)];

        let depth = |write: bool, compare: wgpu::CompareFunction| wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: write,
            depth_compare: compare,
            stencil: Default::default(),
            bias: Default::default(),
        };

        let mesh_pipeline = |label: &str,
                             layout: &wgpu::PipelineLayout,
                             vs: &str,
                             fs: &str,
                             targets: &[Option<wgpu::ColorTargetState>],
                             cull: wgpu::Face,
                             depth_stencil: wgpu::DepthStencilState| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &forward,
                    entry_point: Some(vs),
                    compilation_options: Default::default(),
                    buffers: &[mesh::vertex_layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &forward,
                    entry_point: Some(fs),
                    compilation_options: Default::default(),
                    targets,
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: Some(cull),
                    ..Default::default()
                },
                depth_stencil: Some(depth_stencil),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        };

        let less = wgpu::CompareFunction::Less;
        let pbr = mesh_pipeline(
            "pbr_pipeline",
            &scene_layout,
            "vs_main",
            "fs_pbr",
            &scene_targets,
            wgpu::Face::Back,
            depth(true, less),
        );
        let basic = mesh_pipeline(
            "basic_pipeline",
            &scene_layout,
            "vs_main",
            "fs_basic",
            &scene_targets,
            wgpu::Face::Back,
            depth(true, less),
        );
        let gizmo = mesh_pipeline(
            "gizmo_pipeline",
            &gizmo_layout,
            "vs_gizmo",
            "fs_gizmo",
            &scene_color,
            wgpu::Face::Back,
            depth(true, less),
        );
        // The sky sits at the far plane and is seen from inside.
        let sky = mesh_pipeline(
            "sky_pipeline",
            &sky_layout,
            "vs_sky",
            "fs_sky",
            &scene_color,
            wgpu::Face::Front,
            depth(false, wgpu::CompareFunction::LessEqual),
        );

        let fullscreen = |label: &str,
                          source: String,
                          entry: &str,
                          layout: &wgpu::BindGroupLayout,
                          target: Option<wgpu::ColorTargetState>| {
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: &[layout],
                push_constant_ranges: &[],
            });
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some("vs_fullscreen"),
                    compilation_options: Default::default(),
                    buffers: &[],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some(entry),
                    compilation_options: Default::default(),
                    targets: &[target],
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        };

        let ssao = fullscreen(
            "ssao_pipeline",
            shaders::ssao_source(),
            "fs_ssao",
            &layouts.ssao,
            color_target(FrameResource::SsaoRaw),
        );
        let blur = fullscreen(
            "ssao_blur_pipeline",
            shaders::ssao_blur_source(),
            "fs_blur",
            &layouts.blur,
            color_target(FrameResource::SsaoBlurred),
        );
        let composite = fullscreen(
            "composite_pipeline",
            shaders::composite_source(),
            "fs_composite",
            &layouts.composite,
            Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            }),
        );

        Self {
            pbr,
            basic,
            gizmo,
            sky,
            ssao,
            blur,
            composite,
        }
    }
}
