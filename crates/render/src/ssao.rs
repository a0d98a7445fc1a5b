use crate::constants::SsaoConstants;
use crate::packet::Viewport;
use bytemuck::Zeroable;
use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Kernel capacity of the occlusion shader.
pub const MAX_SSAO_SAMPLES: usize = 64;
/// Side length of the tiled rotation-noise texture.
pub const NOISE_SIZE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsaoSettings {
    pub enabled: bool,
    pub blur: bool,
    pub sample_count: u32,
    /// View-space sampling radius.
    pub radius: f32,
    /// Depth bias against self-occlusion.
    pub bias: f32,
    pub intensity: f32,
    /// Show only the occlusion term.
    pub output_only: bool,
}

impl Default for SsaoSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            blur: true,
            sample_count: MAX_SSAO_SAMPLES as u32,
            radius: 1.0,
            bias: 0.025,
            intensity: 1.0,
            output_only: false,
        }
    }
}

impl SsaoSettings {
    pub fn clamped_sample_count(&self) -> u32 {
        self.sample_count.clamp(1, MAX_SSAO_SAMPLES as u32)
    }
}

/// Hemisphere sample offsets in tangent space, denser towards the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct SsaoKernel {
    samples: Vec<Vec3>,
}

impl SsaoKernel {
    pub fn generate<R: Rng>(count: usize, rng: &mut R) -> Self {
        let count = count.clamp(1, MAX_SSAO_SAMPLES);
        let samples = (0..count)
            .map(|i| {
                let direction = Vec3::new(
                    rng.gen_range(-1.0..=1.0),
                    rng.gen_range(-1.0..=1.0),
                    rng.gen_range(0.0..=1.0),
                )
                .normalize_or_zero();
                let direction = if direction == Vec3::ZERO { Vec3::Z } else { direction };
                let t = i as f32 / count as f32;
                let scale = 0.1 + (1.0 - 0.1) * t * t;
                direction * rng.gen_range(0.0..=1.0f32) * scale
            })
            .collect();
        Self { samples }
    }

    pub fn samples(&self) -> &[Vec3] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Random rotations about the view normal, encoded as RGBA8 with z at zero.
pub fn noise_texels<R: Rng>(rng: &mut R) -> [[u8; 4]; (NOISE_SIZE * NOISE_SIZE) as usize] {
    let mut texels = [[0u8; 4]; (NOISE_SIZE * NOISE_SIZE) as usize];
    for texel in &mut texels {
        let v = Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0));
        let encode = |c: f32| ((c * 0.5 + 0.5) * 255.0).round() as u8;
        *texel = [encode(v.x), encode(v.y), 128, 255];
    }
    texels
}

impl SsaoConstants {
    pub fn new(kernel: &SsaoKernel, settings: &SsaoSettings, viewport: Viewport) -> Self {
        let mut constants = Self::zeroed();
        for (slot, sample) in constants.kernel.iter_mut().zip(kernel.samples()) {
            *slot = sample.extend(0.0).to_array();
        }
        constants.noise_scale = [
            viewport.width as f32 / NOISE_SIZE as f32,
            viewport.height as f32 / NOISE_SIZE as f32,
        ];
        constants.radius = settings.radius;
        constants.sample_count = settings
            .clamped_sample_count()
            .min(kernel.len() as u32);
        constants.bias = settings.bias;
        constants.intensity = settings.intensity;
        constants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn kernel_is_a_scaled_hemisphere() {
        let kernel = SsaoKernel::generate(64, &mut StdRng::seed_from_u64(1));
        assert_eq!(kernel.len(), 64);
        for (i, s) in kernel.samples().iter().enumerate() {
            assert!(s.z >= 0.0);
            let t = i as f32 / 64.0;
            assert!(s.length() <= 0.1 + 0.9 * t * t + 1e-5);
        }
    }

    #[test]
    fn kernel_is_deterministic_and_capped() {
        let a = SsaoKernel::generate(16, &mut StdRng::seed_from_u64(7));
        let b = SsaoKernel::generate(16, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_eq!(SsaoKernel::generate(500, &mut StdRng::seed_from_u64(0)).len(), 64);
        assert_eq!(SsaoKernel::generate(0, &mut StdRng::seed_from_u64(0)).len(), 1);
    }

    #[test]
    fn noise_has_zero_z() {
        let texels = noise_texels(&mut StdRng::seed_from_u64(3));
        assert_eq!(texels.len(), 16);
        assert!(texels.iter().all(|t| t[2] == 128 && t[3] == 255));
    }

    #[test]
    fn constants_follow_settings() {
        let kernel = SsaoKernel::generate(64, &mut StdRng::seed_from_u64(0));
        let settings = SsaoSettings {
            sample_count: 200,
            radius: 0.5,
            ..SsaoSettings::default()
        };
        let c = SsaoConstants::new(&kernel, &settings, Viewport::new(1280, 720));
        assert_eq!(c.noise_scale, [320.0, 180.0]);
        assert_eq!(c.sample_count, 64);
        assert_eq!(c.radius, 0.5);
        assert_eq!(c.kernel[3][3], 0.0);
    }
}
