use crate::constants::FrameFlags;
use crate::frame::FrameOptions;
use crate::ibl::IblSettings;
use crate::ssao::SsaoSettings;
use serde::{Deserialize, Serialize};

/// Runtime-adjustable rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Linear RGBA the scene targets are cleared to.
    pub clear_color: [f32; 4],
    pub vsync: bool,
    pub draw_light_gizmos: bool,
    pub indirect_lighting: bool,
    /// Size of the per-frame constant upload buffer.
    pub constant_ring_bytes: u64,
    pub ssao: SsaoSettings,
    pub ibl: IblSettings,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.2, 0.4, 1.0],
            vsync: true,
            draw_light_gizmos: false,
            indirect_lighting: true,
            constant_ring_bytes: 256 * 1024,
            ssao: SsaoSettings::default(),
            ibl: IblSettings::default(),
        }
    }
}

impl RenderSettings {
    /// Passes these settings enable. The overlay is left to the caller.
    pub fn frame_options(&self) -> FrameOptions {
        FrameOptions {
            ssao: self.ssao.enabled,
            ssao_blur: self.ssao.enabled && self.ssao.blur,
            light_gizmos: self.draw_light_gizmos,
            overlay: false,
        }
    }

    pub fn frame_flags(&self) -> FrameFlags {
        let mut flags = FrameFlags::empty();
        flags.set(FrameFlags::INDIRECT_LIGHTING, self.indirect_lighting);
        flags.set(FrameFlags::SSAO_ENABLED, self.ssao.enabled);
        flags.set(
            FrameFlags::SSAO_ONLY,
            self.ssao.enabled && self.ssao.output_only,
        );
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = RenderSettings::default();
        assert!(!s.draw_light_gizmos);
        assert_eq!(s.constant_ring_bytes, 262_144);
        assert_eq!(
            s.frame_flags(),
            FrameFlags::INDIRECT_LIGHTING | FrameFlags::SSAO_ENABLED
        );
        let options = s.frame_options();
        assert!(options.ssao && options.ssao_blur && !options.light_gizmos);
    }

    #[test]
    fn disabled_ssao_drops_blur_and_ao_only() {
        let mut s = RenderSettings::default();
        s.ssao.enabled = false;
        s.ssao.output_only = true;
        assert!(!s.frame_options().ssao_blur);
        assert!(!s.frame_flags().contains(FrameFlags::SSAO_ONLY));
    }
}
