use lumen_input::{Action, InputState};
use lumen_render::{FlyCamera, RenderSettings, speed_multiplier};
use lumen_render_wgpu::FrameStats;
use lumen_scene::Scene;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Instant;
use tracing::info;

/// Longest step the camera takes, so a stall does not teleport it.
const MAX_FRAME_DT: f32 = 0.1;

/// Exponentially smoothed frames per second.
#[derive(Debug, Clone, Copy, Default)]
pub struct FpsCounter {
    fps: f32,
}

impl FpsCounter {
    pub fn record(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let sample = 1.0 / dt;
        self.fps = if self.fps == 0.0 {
            sample
        } else {
            self.fps * 0.9 + sample * 0.1
        };
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// Everything the demo owns outside the GPU.
pub struct AppState {
    pub scene: Scene,
    pub camera: FlyCamera,
    pub input: InputState,
    /// Edited by the UI and pushed to the renderer when it changes.
    pub settings: RenderSettings,
    pub spin_speed: f32,
    pub show_ui: bool,
    pub quit: bool,
    pub fps: FpsCounter,
    pub stats: FrameStats,
    pub size: (u32, u32),
    rng: StdRng,
    last_frame: Instant,
}

impl AppState {
    pub fn new(scene: Scene, settings: RenderSettings, seed: u64, spin_speed: f32) -> Self {
        Self {
            scene,
            camera: FlyCamera::default(),
            input: InputState::new(),
            settings,
            spin_speed,
            show_ui: true,
            quit: false,
            fps: FpsCounter::default(),
            stats: FrameStats::default(),
            size: (1, 1),
            // Offset so a reroll differs from the initial layout.
            rng: StdRng::seed_from_u64(seed.wrapping_add(1)),
            last_frame: Instant::now(),
        }
    }

    /// Advance one frame using the real elapsed time.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(MAX_FRAME_DT);
        self.last_frame = now;
        self.fps.record(dt);
        self.update(dt);
    }

    pub fn update(&mut self, dt: f32) {
        let input = &mut self.input;
        if input.was_pressed(Action::Quit) {
            self.quit = true;
        }
        if input.was_pressed(Action::ToggleUi) {
            self.show_ui = !self.show_ui;
        }
        if input.was_pressed(Action::ToggleSsao) {
            self.settings.ssao.enabled = !self.settings.ssao.enabled;
            info!(enabled = self.settings.ssao.enabled, "toggled SSAO");
        }
        if input.was_pressed(Action::RandomizeLights) {
            self.scene.randomize_lights(&mut self.rng);
            info!(count = self.scene.lights().len(), "randomized lights");
        }

        let multiplier = speed_multiplier(input.is_held(Action::Boost), input.is_held(Action::Slow));
        self.camera.apply_motion(input.move_axes(), dt, multiplier);
        let look = input.take_mouse_delta();
        if input.is_held(Action::Look) {
            self.camera.rotate(look.x, look.y);
        }

        self.scene.animate(dt, self.spin_speed);
        input.end_frame();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width.max(1), height.max(1));
        self.camera.aspect = self.size.0 as f32 / self.size.1 as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn state() -> AppState {
        AppState::new(Scene::demo(8, 3), RenderSettings::default(), 3, 0.0)
    }

    #[test]
    fn fps_smooths_toward_samples() {
        let mut fps = FpsCounter::default();
        fps.record(0.01);
        assert!((fps.fps() - 100.0).abs() < 1e-3);
        fps.record(0.02);
        assert!((fps.fps() - 95.0).abs() < 1e-3);
        fps.record(0.0);
        assert!((fps.fps() - 95.0).abs() < 1e-3);
    }

    #[test]
    fn held_keys_move_the_camera() {
        let mut s = state();
        let start = s.camera.position;
        s.input.press(Action::MoveForward);
        s.update(0.5);
        let moved = s.camera.position - start;
        assert!(moved.dot(s.camera.forward()) > 0.0);
    }

    #[test]
    fn look_needs_the_button() {
        let mut s = state();
        let yaw = s.camera.yaw;
        s.input.add_mouse_delta(Vec2::new(100.0, 0.0));
        s.update(0.016);
        assert_eq!(s.camera.yaw, yaw);

        s.input.press(Action::Look);
        s.input.add_mouse_delta(Vec2::new(100.0, 0.0));
        s.update(0.016);
        assert!(s.camera.yaw > yaw);
    }

    #[test]
    fn toggles_fire_once_per_press() {
        let mut s = state();
        s.input.press(Action::ToggleSsao);
        s.input.press(Action::ToggleUi);
        s.update(0.016);
        assert!(!s.settings.ssao.enabled);
        assert!(!s.show_ui);
        s.update(0.016);
        assert!(!s.settings.ssao.enabled);
        assert!(!s.quit);
    }

    #[test]
    fn randomize_keeps_the_light_count() {
        let mut s = state();
        let before = s.scene.lights().to_vec();
        s.input.press(Action::RandomizeLights);
        s.update(0.016);
        assert_eq!(s.scene.lights().len(), before.len());
        assert_ne!(s.scene.lights(), before.as_slice());
    }
}
