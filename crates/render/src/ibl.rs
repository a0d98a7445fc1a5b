//! Image-based lighting precompute: bake layout and the reference math the
//! bake shaders mirror.
//!
//! The environment cubemap is convolved once at startup into three inputs
//! for the lighting shaders: a diffuse irradiance cube, a specular cube whose
//! mips are prefiltered for increasing roughness, and a 2D lookup of the
//! split-sum BRDF scale and bias.

use crate::state::{FrameResource, ResourceState, StateTracker, Transition};
use crate::RenderError;
use glam::{Vec2, Vec3};
use lumen_common::CubeFace;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IblSettings {
    pub environment_face_size: u32,
    pub irradiance_face_size: u32,
    pub specular_face_size: u32,
    pub brdf_lut_size: u32,
    /// Smallest mips dropped from the specular chain.
    pub specular_mip_levels_to_skip: u32,
    pub specular_sample_count: u32,
    pub brdf_sample_count: u32,
    /// Angular step of the irradiance integral, in radians.
    pub irradiance_sample_delta: f32,
}

impl Default for IblSettings {
    fn default() -> Self {
        Self {
            environment_face_size: 256,
            irradiance_face_size: 32,
            specular_face_size: 256,
            brdf_lut_size: 256,
            specular_mip_levels_to_skip: 3,
            specular_sample_count: 512,
            brdf_sample_count: 512,
            irradiance_sample_delta: 0.025,
        }
    }
}

impl IblSettings {
    pub fn validate(&self) -> Result<(), RenderError> {
        for (name, size) in [
            ("environment_face_size", self.environment_face_size),
            ("irradiance_face_size", self.irradiance_face_size),
            ("specular_face_size", self.specular_face_size),
            ("brdf_lut_size", self.brdf_lut_size),
        ] {
            if !size.is_power_of_two() {
                return Err(RenderError::InvalidIbl(format!(
                    "{name} must be a power of two, got {size}"
                )));
            }
        }
        if self.specular_sample_count == 0 || self.brdf_sample_count == 0 {
            return Err(RenderError::InvalidIbl("sample counts must be non-zero".into()));
        }
        if !(self.irradiance_sample_delta > 0.0 && self.irradiance_sample_delta < 1.0) {
            return Err(RenderError::InvalidIbl(format!(
                "irradiance_sample_delta must be in (0, 1), got {}",
                self.irradiance_sample_delta
            )));
        }
        Ok(())
    }

    /// Mips in the specular cube: the full chain minus the skipped tail, at least one.
    pub fn specular_mip_count(&self) -> u32 {
        let full = self.specular_face_size.max(1).ilog2() + 1;
        full.saturating_sub(self.specular_mip_levels_to_skip).max(1)
    }
}

/// Roughness a specular mip is prefiltered for. Mip 0 is a mirror.
pub fn roughness_for_mip(mip: u32, mip_count: u32) -> f32 {
    if mip_count <= 1 {
        0.0
    } else {
        mip as f32 / (mip_count - 1) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IblTarget {
    Irradiance,
    Specular,
    BrdfLut,
}

impl IblTarget {
    pub fn resource(self) -> FrameResource {
        match self {
            IblTarget::Irradiance => FrameResource::IrradianceMap,
            IblTarget::Specular => FrameResource::SpecularMap,
            IblTarget::BrdfLut => FrameResource::BrdfLut,
        }
    }
}

/// One fullscreen draw into a single face and mip of a bake target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IblDraw {
    pub target: IblTarget,
    /// `None` for the 2D lookup table.
    pub face: Option<CubeFace>,
    pub mip: u32,
    pub size: u32,
    pub roughness: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum BakeStep {
    Barrier(Transition),
    Draw(IblDraw),
}

/// Ordered bake: irradiance faces, then every specular mip face by face, then the lookup table.
///
/// # Invariants
/// - Each target enters `RenderTarget` before its first draw and rests in
///   `ShaderResource` after its last.
/// - Draw sizes halve per specular mip and never reach zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IblBakePlan {
    settings: IblSettings,
    steps: Vec<BakeStep>,
}

impl IblBakePlan {
    pub fn new(settings: &IblSettings) -> Result<Self, RenderError> {
        settings.validate()?;

        let mut tracker = StateTracker::new();
        for target in [IblTarget::Irradiance, IblTarget::Specular, IblTarget::BrdfLut] {
            tracker.register(target.resource(), ResourceState::Undefined)?;
        }

        let mips = settings.specular_mip_count();
        let groups = [
            (
                IblTarget::Irradiance,
                CubeFace::ALL
                    .iter()
                    .map(|&face| IblDraw {
                        target: IblTarget::Irradiance,
                        face: Some(face),
                        mip: 0,
                        size: settings.irradiance_face_size,
                        roughness: 0.0,
                    })
                    .collect::<Vec<_>>(),
            ),
            (
                IblTarget::Specular,
                (0..mips)
                    .flat_map(|mip| {
                        CubeFace::ALL.iter().map(move |&face| IblDraw {
                            target: IblTarget::Specular,
                            face: Some(face),
                            mip,
                            size: (settings.specular_face_size >> mip).max(1),
                            roughness: roughness_for_mip(mip, mips),
                        })
                    })
                    .collect(),
            ),
            (
                IblTarget::BrdfLut,
                vec![IblDraw {
                    target: IblTarget::BrdfLut,
                    face: None,
                    mip: 0,
                    size: settings.brdf_lut_size,
                    roughness: 0.0,
                }],
            ),
        ];

        let mut steps = Vec::new();
        for (target, draws) in groups {
            let resource = target.resource();
            if let Some(t) = tracker.transition(resource, ResourceState::RenderTarget)? {
                steps.push(BakeStep::Barrier(t));
            }
            steps.extend(draws.into_iter().map(BakeStep::Draw));
            if let Some(t) = tracker.transition(resource, ResourceState::ShaderResource)? {
                steps.push(BakeStep::Barrier(t));
            }
        }

        Ok(Self {
            settings: *settings,
            steps,
        })
    }

    pub fn settings(&self) -> &IblSettings {
        &self.settings
    }

    pub fn steps(&self) -> &[BakeStep] {
        &self.steps
    }

    pub fn draws(&self) -> impl Iterator<Item = &IblDraw> + '_ {
        self.steps.iter().filter_map(|step| match step {
            BakeStep::Draw(draw) => Some(draw),
            BakeStep::Barrier(_) => None,
        })
    }

    pub fn draw_count(&self) -> usize {
        self.draws().count()
    }
}

/// Van der Corput radical inverse in base 2.
pub fn radical_inverse_vdc(bits: u32) -> f32 {
    bits.reverse_bits() as f32 * 2.328_306_4e-10
}

/// Point `i` of an `n`-point Hammersley set on the unit square.
pub fn hammersley(i: u32, n: u32) -> Vec2 {
    Vec2::new(i as f32 / n as f32, radical_inverse_vdc(i))
}

/// GGX-distributed half vector around `n` for the sample `xi`.
pub fn importance_sample_ggx(xi: Vec2, n: Vec3, roughness: f32) -> Vec3 {
    let a = roughness * roughness;
    let phi = 2.0 * PI * xi.x;
    let cos_theta = ((1.0 - xi.y) / (1.0 + (a * a - 1.0) * xi.y)).sqrt();
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let h = Vec3::new(phi.cos() * sin_theta, phi.sin() * sin_theta, cos_theta);

    let up = if n.z.abs() < 0.999 { Vec3::Z } else { Vec3::X };
    let tangent = up.cross(n).normalize();
    let bitangent = n.cross(tangent);
    (tangent * h.x + bitangent * h.y + n * h.z).normalize()
}

/// Schlick-GGX with the IBL remapping `k = roughness^2 / 2`.
pub fn geometry_schlick_ggx(n_dot_v: f32, roughness: f32) -> f32 {
    let k = roughness * roughness / 2.0;
    n_dot_v / (n_dot_v * (1.0 - k) + k)
}

pub fn geometry_smith_ibl(n_dot_v: f32, n_dot_l: f32, roughness: f32) -> f32 {
    geometry_schlick_ggx(n_dot_v, roughness) * geometry_schlick_ggx(n_dot_l, roughness)
}

/// Split-sum scale and bias applied to F0 for a view angle and roughness.
pub fn integrate_brdf(n_dot_v: f32, roughness: f32, samples: u32) -> Vec2 {
    let n_dot_v = n_dot_v.clamp(1e-4, 1.0);
    let v = Vec3::new((1.0 - n_dot_v * n_dot_v).sqrt(), 0.0, n_dot_v);
    let n = Vec3::Z;
    let samples = samples.max(1);

    let mut scale = 0.0;
    let mut bias = 0.0;
    for i in 0..samples {
        let h = importance_sample_ggx(hammersley(i, samples), n, roughness);
        let l = (2.0 * v.dot(h) * h - v).normalize();
        let n_dot_l = l.z.max(0.0);
        let n_dot_h = h.z.max(0.0);
        let v_dot_h = v.dot(h).max(0.0);
        if n_dot_l > 0.0 && n_dot_h > 0.0 {
            let g = geometry_smith_ibl(n_dot_v, n_dot_l, roughness);
            let g_vis = g * v_dot_h / (n_dot_h * n_dot_v);
            let fc = (1.0 - v_dot_h).powi(5);
            scale += (1.0 - fc) * g_vis;
            bias += fc * g_vis;
        }
    }
    Vec2::new(scale, bias) / samples as f32
}

/// CPU lookup table, rows by roughness and columns by `n_dot_v`.
pub fn brdf_table(size: u32, samples: u32) -> Vec<Vec<Vec2>> {
    (0..size)
        .map(|row| {
            let roughness = (row as f32 + 0.5) / size as f32;
            (0..size)
                .map(|col| integrate_brdf((col as f32 + 0.5) / size as f32, roughness, samples))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mip_layout() {
        let settings = IblSettings::default();
        assert_eq!(settings.specular_mip_count(), 6);
        assert!(settings.validate().is_ok());
        let tiny = IblSettings {
            specular_face_size: 4,
            ..settings
        };
        assert_eq!(tiny.specular_mip_count(), 1);
    }

    #[test]
    fn validation() {
        let bad = IblSettings {
            irradiance_face_size: 30,
            ..IblSettings::default()
        };
        assert!(bad.validate().is_err());
        let bad = IblSettings {
            brdf_sample_count: 0,
            ..IblSettings::default()
        };
        assert!(bad.validate().is_err());
        let bad = IblSettings {
            irradiance_sample_delta: 0.0,
            ..IblSettings::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn roughness_spans_mips() {
        assert_eq!(roughness_for_mip(0, 6), 0.0);
        assert_eq!(roughness_for_mip(5, 6), 1.0);
        assert_eq!(roughness_for_mip(0, 1), 0.0);
    }

    #[test]
    fn bake_plan_order() {
        let plan = IblBakePlan::new(&IblSettings::default()).unwrap();
        assert_eq!(plan.draw_count(), 6 + 6 * 6 + 1);
        let draws: Vec<_> = plan.draws().collect();
        assert!(draws[..6].iter().all(|d| d.target == IblTarget::Irradiance && d.size == 32));
        assert_eq!(draws[6].target, IblTarget::Specular);
        assert_eq!(draws[6].size, 256);
        assert_eq!(draws[41].mip, 5);
        assert_eq!(draws[41].size, 8);
        assert_eq!(draws[41].roughness, 1.0);
        assert_eq!(draws[42].target, IblTarget::BrdfLut);
        assert_eq!(draws[42].face, None);
    }

    #[test]
    fn bake_plan_barriers() {
        let plan = IblBakePlan::new(&IblSettings::default()).unwrap();
        let barriers: Vec<Transition> = plan
            .steps()
            .iter()
            .filter_map(|s| match s {
                BakeStep::Barrier(t) => Some(*t),
                BakeStep::Draw(_) => None,
            })
            .collect();
        assert_eq!(barriers.len(), 6);
        assert!(matches!(plan.steps()[0], BakeStep::Barrier(t)
            if t.resource == FrameResource::IrradianceMap && t.after == ResourceState::RenderTarget));
        assert!(matches!(plan.steps().last(), Some(BakeStep::Barrier(t))
            if t.resource == FrameResource::BrdfLut && t.after == ResourceState::ShaderResource));
    }

    #[test]
    fn hammersley_is_in_unit_square() {
        assert_eq!(radical_inverse_vdc(0), 0.0);
        assert_eq!(radical_inverse_vdc(1), 0.5);
        assert_eq!(radical_inverse_vdc(2), 0.25);
        for i in 0..64 {
            let p = hammersley(i, 64);
            assert!((0.0..1.0).contains(&p.x) && (0.0..1.0).contains(&p.y));
        }
    }

    #[test]
    fn ggx_samples_stay_in_hemisphere() {
        let n = Vec3::new(0.3, 0.8, -0.2).normalize();
        for roughness in [0.0, 0.3, 1.0] {
            for i in 0..128 {
                let h = importance_sample_ggx(hammersley(i, 128), n, roughness);
                assert!(h.dot(n) >= -1e-5);
                assert!((h.length() - 1.0).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn brdf_reference_values() {
        let smooth = integrate_brdf(1.0, 0.0, 256);
        assert!((smooth.x - 1.0).abs() < 1e-3);
        assert!(smooth.y.abs() < 1e-3);

        for &(nv, r) in &[(0.1, 0.2), (0.5, 0.5), (0.9, 0.9), (0.3, 1.0)] {
            let v = integrate_brdf(nv, r, 256);
            assert!(v.x >= 0.0 && v.y >= 0.0);
            assert!(v.x + v.y <= 1.02, "{nv} {r} {v}");
        }
        assert!(integrate_brdf(0.5, 0.2, 256).x > integrate_brdf(0.5, 1.0, 256).x);
    }

    #[test]
    fn table_shape() {
        let table = brdf_table(4, 16);
        assert_eq!(table.len(), 4);
        assert!(table.iter().all(|row| row.len() == 4));
    }
}
