use crate::camera::FlyCamera;
use crate::frame::FramePlan;
use crate::packet::{Viewport, prepare_frame};
use crate::ring::ConstantRing;
use crate::settings::RenderSettings;
use crate::RenderError;
use lumen_scene::Scene;
use std::fmt::Write;

/// Alignment the GPU backends require for dynamic uniform offsets.
pub const CONSTANT_ALIGNMENT: u64 = 256;

/// Backend-agnostic interface. All renderers implement this trait.
///
/// A renderer reads the scene and camera and produces output; it never
/// mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&mut self, scene: &Scene, camera: &FlyCamera) -> Result<Self::Output, RenderError>;
}

/// Text renderer: runs the CPU side of a frame and describes what a GPU
/// backend would record.
///
/// Useful for CLI output, logging, and testing the frame pipeline without an
/// adapter.
#[derive(Debug)]
pub struct DebugTextRenderer {
    settings: RenderSettings,
    viewport: Viewport,
    ring: ConstantRing,
    plan: FramePlan,
}

impl DebugTextRenderer {
    pub fn new(settings: RenderSettings, viewport: Viewport) -> Result<Self, RenderError> {
        Ok(Self {
            ring: ConstantRing::new(settings.constant_ring_bytes, CONSTANT_ALIGNMENT)?,
            plan: FramePlan::build(settings.frame_options())?,
            settings,
            viewport,
        })
    }

    pub fn plan(&self) -> &FramePlan {
        &self.plan
    }

    pub fn ring(&self) -> &ConstantRing {
        &self.ring
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, scene: &Scene, camera: &FlyCamera) -> Result<String, RenderError> {
        let packet = prepare_frame(
            scene,
            camera,
            &self.settings,
            self.viewport,
            self.settings.ibl.specular_mip_count(),
            &mut self.ring,
        )?;

        let mut out = String::new();
        let p = camera.position;
        let _ = writeln!(
            out,
            "=== Frame ({}x{}, lights={}, flags={:#x}) ===",
            self.viewport.width, self.viewport.height, packet.frame.light_count, packet.frame.flags
        );
        let _ = writeln!(
            out,
            "Camera: pos=({:.1}, {:.1}, {:.1}) yaw={:.2} pitch={:.2}",
            p.x, p.y, p.z, camera.yaw, camera.pitch
        );
        let _ = writeln!(out, "Passes:");
        let _ = write!(out, "{}", self.plan);

        let _ = writeln!(out, "Draws: {}", packet.draws.len());
        for draw in &packet.draws {
            let entity = &scene.entities()[draw.entity];
            let pos = entity.transform.position;
            let _ = writeln!(
                out,
                "  {:<18} {:<5} pos=({:.2}, {:.2}, {:.2}) offset={}",
                entity.name,
                draw.shading.label(),
                pos.x,
                pos.y,
                pos.z,
                draw.constants.offset
            );
        }
        let _ = writeln!(out, "Gizmos: {}", packet.gizmos.len());
        let _ = writeln!(
            out,
            "Constants: {} / {} bytes (peak {})",
            self.ring.used(),
            self.ring.capacity(),
            self.ring.high_water_mark()
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_frame_report() {
        let scene = Scene::demo(16, 0);
        let mut renderer =
            DebugTextRenderer::new(RenderSettings::default(), Viewport::new(1280, 720)).unwrap();
        let output = renderer.render(&scene, &FlyCamera::default()).unwrap();

        assert!(output.contains("1280x720"));
        assert!(output.contains("lights=16"));
        assert!(output.contains("Draws: 14"));
        assert!(output.contains("cobblestone_pbr"));
        assert!(output.contains("ssao_blur"));
        assert!(output.contains("Gizmos: 0"));
        assert!(output.contains("pos=(0.0, 0.0, -10.0)"));
    }

    #[test]
    fn gizmos_and_no_ssao() {
        let mut settings = RenderSettings::default();
        settings.ssao.enabled = false;
        settings.draw_light_gizmos = true;
        let scene = Scene::demo(10, 0);
        let mut renderer = DebugTextRenderer::new(settings, Viewport::new(320, 240)).unwrap();
        let output = renderer.render(&scene, &FlyCamera::default()).unwrap();
        assert!(!output.contains("ssao"));
        assert!(output.contains("light_gizmos"));
        assert!(output.contains("Gizmos: 7"));
    }

    #[test]
    fn rendering_twice_reuses_the_ring() {
        let scene = Scene::demo(4, 0);
        let mut renderer =
            DebugTextRenderer::new(RenderSettings::default(), Viewport::new(64, 64)).unwrap();
        renderer.render(&scene, &FlyCamera::default()).unwrap();
        let used = renderer.ring().used();
        renderer.render(&scene, &FlyCamera::default()).unwrap();
        assert_eq!(renderer.ring().used(), used);
        assert_eq!(renderer.ring().high_water_mark(), used);
    }

    #[test]
    fn tiny_ring_is_rejected() {
        let settings = RenderSettings {
            constant_ring_bytes: 16,
            ..RenderSettings::default()
        };
        assert!(DebugTextRenderer::new(settings, Viewport::new(64, 64)).is_err());
    }
}
