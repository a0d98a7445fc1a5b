use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Upper bound on lights in the scene. The per-frame constant block is sized for this many.
pub const MAX_LIGHTS: usize = 128;

/// Light type. The discriminant is what the shaders see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum LightKind {
    Directional = 0,
    Point = 1,
    Spot = 2,
}

impl LightKind {
    pub const ALL: [LightKind; 3] = [LightKind::Directional, LightKind::Point, LightKind::Spot];

    pub fn label(self) -> &'static str {
        match self {
            LightKind::Directional => "Directional",
            LightKind::Point => "Point",
            LightKind::Spot => "Spot",
        }
    }

    /// Point and spot lights have a position and a range.
    pub fn is_local(self) -> bool {
        !matches!(self, LightKind::Directional)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub kind: LightKind,
    /// Direction the light travels. Used by directional and spot lights.
    pub direction: Vec3,
    pub range: f32,
    pub position: Vec3,
    pub intensity: f32,
    pub color: Vec3,
    /// Spot cone exponent. Larger is tighter.
    pub spot_falloff: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self::point(Vec3::ZERO, Vec3::ONE, 5.0, 1.0)
    }
}

impl Light {
    pub fn directional(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional,
            direction: unit_or_down(direction),
            range: 0.0,
            position: Vec3::ZERO,
            intensity,
            color,
            spot_falloff: 0.0,
        }
    }

    pub fn point(position: Vec3, color: Vec3, range: f32, intensity: f32) -> Self {
        Self {
            kind: LightKind::Point,
            direction: Vec3::NEG_Y,
            range,
            position,
            intensity,
            color,
            spot_falloff: 0.0,
        }
    }

    pub fn spot(
        position: Vec3,
        direction: Vec3,
        color: Vec3,
        range: f32,
        intensity: f32,
        spot_falloff: f32,
    ) -> Self {
        Self {
            kind: LightKind::Spot,
            direction: unit_or_down(direction),
            range,
            position,
            intensity,
            color,
            spot_falloff,
        }
    }
}

fn unit_or_down(direction: Vec3) -> Vec3 {
    let unit = direction.normalize_or_zero();
    if unit == Vec3::ZERO { Vec3::NEG_Y } else { unit }
}

/// The three directional lights every generated set starts with.
pub fn key_lights() -> [Light; 3] {
    [
        Light::directional(Vec3::new(1.0, -1.0, 1.0), Vec3::ONE, 0.8),
        Light::directional(Vec3::new(-1.0, -0.25, 0.0), Vec3::ONE, 0.2),
        Light::directional(Vec3::new(0.0, -1.0, 1.0), Vec3::ONE, 0.2),
    ]
}

/// Build `count` lights: the key lights first, then random point lights.
///
/// `count` is clamped to [`MAX_LIGHTS`]; counts below three keep only the
/// first key lights.
pub fn generate_lights<R: Rng>(count: usize, rng: &mut R) -> Vec<Light> {
    let count = count.min(MAX_LIGHTS);
    let mut lights: Vec<Light> = key_lights().into_iter().take(count).collect();
    while lights.len() < count {
        let position = Vec3::new(
            rng.gen_range(-10.0..=10.0),
            rng.gen_range(-5.0..=5.0),
            rng.gen_range(-10.0..=10.0),
        );
        let color = Vec3::new(
            rng.gen_range(0.0..=1.0),
            rng.gen_range(0.0..=1.0),
            rng.gen_range(0.0..=1.0),
        );
        let range = rng.gen_range(5.0..=10.0);
        let intensity = rng.gen_range(0.1..=3.0);
        lights.push(Light::point(position, color, range, intensity));
    }
    lights
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn key_lights_lead() {
        let lights = generate_lights(10, &mut StdRng::seed_from_u64(1));
        assert_eq!(lights.len(), 10);
        assert!(lights[..3].iter().all(|l| l.kind == LightKind::Directional));
        assert!(lights[3..].iter().all(|l| l.kind == LightKind::Point));
        assert_eq!(lights[0].intensity, 0.8);
    }

    #[test]
    fn point_lights_within_bounds() {
        let lights = generate_lights(MAX_LIGHTS, &mut StdRng::seed_from_u64(7));
        for l in &lights[3..] {
            assert!((-10.0..=10.0).contains(&l.position.x));
            assert!((-5.0..=5.0).contains(&l.position.y));
            assert!((-10.0..=10.0).contains(&l.position.z));
            assert!((5.0..=10.0).contains(&l.range));
            assert!((0.1..=3.0).contains(&l.intensity));
            assert!(l.color.min_element() >= 0.0 && l.color.max_element() <= 1.0);
        }
    }

    #[test]
    fn count_is_clamped() {
        let lights = generate_lights(MAX_LIGHTS + 50, &mut StdRng::seed_from_u64(0));
        assert_eq!(lights.len(), MAX_LIGHTS);
        let few = generate_lights(2, &mut StdRng::seed_from_u64(0));
        assert_eq!(few.len(), 2);
        assert!(generate_lights(0, &mut StdRng::seed_from_u64(0)).is_empty());
    }

    #[test]
    fn same_seed_same_lights() {
        let a = generate_lights(20, &mut StdRng::seed_from_u64(99));
        let b = generate_lights(20, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn directions_are_normalized() {
        for l in key_lights() {
            assert!((l.direction.length() - 1.0).abs() < 1e-6);
        }
        let degenerate = Light::directional(Vec3::ZERO, Vec3::ONE, 1.0);
        assert_eq!(degenerate.direction, Vec3::NEG_Y);
    }
}
