use crate::keys::{action_for_button, action_for_key};
use crate::state::AppState;
use crate::ui;
use anyhow::{Context, Result};
use glam::Vec2;
use lumen_assets::AssetSource;
use lumen_render::{DemoConfig, RenderSettings};
use lumen_render_wgpu::WgpuRenderer;
use std::sync::Arc;
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

/// Window, device and the renderers drawing into it.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    brdf_lut: egui::TextureId,
}

pub struct GpuApp {
    state: AppState,
    config: DemoConfig,
    assets: Box<dyn AssetSource>,
    gpu: Option<Gpu>,
    egui_ctx: egui::Context,
}

impl GpuApp {
    pub fn new(state: AppState, config: DemoConfig, assets: Box<dyn AssetSource>) -> Self {
        Self {
            state,
            config,
            assets,
            gpu: None,
            egui_ctx: egui::Context::default(),
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("lumen_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("surface reports no formats")?;
        if !format.is_srgb() {
            warn!(?format, "no sRGB surface format, output will look dark");
        }
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: present_mode(&self.state.settings),
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        self.state.resize(config.width, config.height);

        let mut renderer = WgpuRenderer::new(
            &device,
            &queue,
            format,
            config.width,
            config.height,
            &self.state.scene,
            self.assets.as_ref(),
            self.state.settings,
        )
        .context("create renderer")?;
        renderer
            .set_overlay(&device, true)
            .context("enable overlay pass")?;

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let mut egui_renderer = egui_wgpu::Renderer::new(&device, format, None, 1, false);
        let brdf_lut = egui_renderer.register_native_texture(
            &device,
            renderer.brdf_lut_view(),
            wgpu::FilterMode::Linear,
        );

        let info = adapter.get_info();
        info!(adapter = %info.name, backend = info.backend.to_str(), ?format, "GPU initialized");

        Ok(Gpu {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
            brdf_lut,
        })
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.state.tick();
        if self.state.quit {
            event_loop.exit();
            return;
        }
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // UI runs first so its edits land in this frame.
        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let state = &mut self.state;
        let full_output = self
            .egui_ctx
            .run(raw_input, |ctx| ui::draw(ctx, state, gpu.brdf_lut));
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);
        self.state.input.set_ui_capture(
            self.egui_ctx.wants_keyboard_input(),
            self.egui_ctx.wants_pointer_input(),
        );

        if self.state.settings != *gpu.renderer.settings() {
            if self.state.settings.vsync != gpu.renderer.settings().vsync {
                gpu.config.present_mode = present_mode(&self.state.settings);
                gpu.surface.configure(&gpu.device, &gpu.config);
            }
            if let Err(e) =
                gpu.renderer
                    .apply_settings(&gpu.device, &gpu.queue, self.state.settings)
            {
                error!("failed to apply settings: {e}");
                self.state.settings = *gpu.renderer.settings();
            }
        }
        if let Err(e) = gpu.renderer.set_overlay(&gpu.device, self.state.show_ui) {
            error!("failed to toggle overlay: {e}");
        }

        match gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &view,
            &self.state.scene,
            &self.state.camera,
        ) {
            Ok(stats) => self.state.stats = stats,
            Err(e) => {
                error!("frame failed: {e}");
                return;
            }
        }

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };
        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("overlay"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        gpu.config.width = size.width.max(1);
        gpu.config.height = size.height.max(1);
        gpu.surface.configure(&gpu.device, &gpu.config);
        self.state.resize(gpu.config.width, gpu.config.height);
        if let Err(e) = gpu.renderer.resize(
            &gpu.device,
            &gpu.queue,
            gpu.config.width,
            gpu.config.height,
        ) {
            error!("failed to resize frame targets: {e}");
        }
    }
}

fn present_mode(settings: &RenderSettings) -> wgpu::PresentMode {
    if settings.vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                error!("startup failed: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = self.gpu.as_mut() {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            // Releases always reach the input state so keys never stick.
            let is_release = matches!(
                event,
                WindowEvent::KeyboardInput {
                    event: KeyEvent {
                        state: ElementState::Released,
                        ..
                    },
                    ..
                } | WindowEvent::MouseInput {
                    state: ElementState::Released,
                    ..
                }
            );
            if response.consumed && !is_release {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => self.resize(size),
            WindowEvent::Focused(false) => self.state.input.release_all(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        ..
                    },
                ..
            } => {
                if let Some(action) = action_for_key(key) {
                    match state {
                        ElementState::Pressed => self.state.input.press(action),
                        ElementState::Released => self.state.input.release(action),
                    }
                }
            }
            WindowEvent::MouseInput { button, state, .. } => {
                if let Some(action) = action_for_button(button) {
                    match state {
                        ElementState::Pressed => self.state.input.press(action),
                        ElementState::Released => self.state.input.release(action),
                    }
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.state
                .input
                .add_mouse_delta(Vec2::new(delta.0 as f32, delta.1 as f32));
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}
