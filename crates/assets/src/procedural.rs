//! Deterministic stand-ins for the demo's texture files.
//!
//! Every generator is seeded from the asset name, so the same name always
//! produces the same pixels.

use crate::mesh::{MeshData, MeshShape};
use crate::source::AssetSource;
use crate::texture::{ImageData, TextureRole};
use crate::AssetError;
use glam::{Vec2, Vec3};
use lumen_common::CubeFace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Pattern {
    Noise,
    Tiles,
    Bricks,
    Grain,
    Scratches,
}

#[derive(Debug, Clone, Copy)]
struct Preset {
    base: Vec3,
    variation: f32,
    roughness: f32,
    metal: f32,
    bump: f32,
    pattern: Pattern,
}

fn preset(name: &str) -> Preset {
    let (base, variation, roughness, metal, bump, pattern) = match name {
        "cobblestone" => ([0.45, 0.43, 0.40], 0.35, 0.85, 0.0, 6.0, Pattern::Bricks),
        "floor" => ([0.55, 0.50, 0.45], 0.20, 0.60, 0.0, 3.0, Pattern::Tiles),
        "paint" => ([0.15, 0.35, 0.70], 0.15, 0.40, 0.0, 1.5, Pattern::Noise),
        "scratched" => ([0.80, 0.80, 0.82], 0.10, 0.35, 1.0, 1.0, Pattern::Scratches),
        "bronze" => ([0.80, 0.50, 0.25], 0.15, 0.30, 1.0, 1.0, Pattern::Noise),
        "rough" => ([0.60, 0.60, 0.58], 0.20, 0.95, 1.0, 2.0, Pattern::Noise),
        "wood" => ([0.55, 0.35, 0.18], 0.40, 0.70, 0.0, 2.0, Pattern::Grain),
        _ => ([0.70, 0.70, 0.70], 0.20, 0.50, 0.0, 1.0, Pattern::Noise),
    };
    Preset {
        base: Vec3::from(base),
        variation,
        roughness,
        metal,
        bump,
        pattern,
    }
}

/// FNV-1a, used to turn asset names into seeds.
fn name_seed(name: &str) -> u64 {
    name.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ b as u64).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Tileable value noise over a square lattice.
struct ValueNoise {
    lattice: Vec<f32>,
    size: usize,
}

impl ValueNoise {
    fn new(size: usize, rng: &mut StdRng) -> Self {
        let lattice = (0..size * size).map(|_| rng.gen_range(0.0..1.0)).collect();
        Self { lattice, size }
    }

    fn at(&self, x: isize, y: isize) -> f32 {
        let n = self.size as isize;
        self.lattice[(y.rem_euclid(n) * n + x.rem_euclid(n)) as usize]
    }

    /// Smoothly interpolated value at `p` in lattice units.
    fn sample(&self, p: Vec2) -> f32 {
        let cell = p.floor();
        let f = p - cell;
        let f = f * f * (Vec2::splat(3.0) - 2.0 * f);
        let (x, y) = (cell.x as isize, cell.y as isize);
        let top = self.at(x, y) + (self.at(x + 1, y) - self.at(x, y)) * f.x;
        let bottom = self.at(x, y + 1) + (self.at(x + 1, y + 1) - self.at(x, y + 1)) * f.x;
        top + (bottom - top) * f.y
    }

    fn fbm(&self, uv: Vec2, octaves: u32) -> f32 {
        let mut sum = 0.0;
        let mut amplitude = 0.5;
        let mut frequency = self.size as f32;
        let mut total = 0.0;
        for _ in 0..octaves {
            sum += self.sample(uv * frequency) * amplitude;
            total += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }
        sum / total
    }
}

fn height(pattern: Pattern, noise: &ValueNoise, uv: Vec2) -> f32 {
    let n = noise.fbm(uv, 3);
    match pattern {
        Pattern::Noise => n,
        Pattern::Tiles => {
            let cell = (uv * 4.0).fract();
            let edge = cell.x.min(cell.y).min(1.0 - cell.x).min(1.0 - cell.y);
            if edge < 0.03 { 0.0 } else { 0.8 + 0.2 * n }
        }
        Pattern::Bricks => {
            let row = (uv.y * 8.0).floor();
            let shifted = Vec2::new(uv.x * 4.0 + row * 0.5, uv.y * 8.0);
            let cell = shifted.fract();
            let edge = cell.x.min(1.0 - cell.x) * 0.5;
            let edge = edge.min(cell.y.min(1.0 - cell.y));
            let mortar = (edge / 0.08).clamp(0.0, 1.0);
            mortar * (0.6 + 0.4 * n)
        }
        Pattern::Grain => {
            let rings = (uv.x * 40.0 + n * 6.0).sin() * 0.5 + 0.5;
            0.7 * rings + 0.3 * n
        }
        Pattern::Scratches => {
            let streak = noise.sample(Vec2::new(uv.x * 2.0, uv.y * 64.0));
            if streak > 0.8 { 0.4 } else { 0.9 + 0.1 * n }
        }
    }
}

/// Encode a linear value in `[0, 1]` as an 8-bit sRGB channel.
fn encode_srgb(linear: f32) -> u8 {
    let c = linear.clamp(0.0, 1.0);
    let s = if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (s * 255.0).round() as u8
}

fn unorm(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Generates every asset the demo needs without touching the file system.
#[derive(Debug, Clone)]
pub struct ProceduralAssets {
    texture_size: u32,
    sky_face_size: u32,
}

impl Default for ProceduralAssets {
    fn default() -> Self {
        Self {
            texture_size: 256,
            sky_face_size: 256,
        }
    }
}

impl ProceduralAssets {
    pub fn new(texture_size: u32, sky_face_size: u32) -> Self {
        Self {
            texture_size: texture_size.max(1),
            sky_face_size: sky_face_size.max(1),
        }
    }

    pub fn with_sky_face_size(mut self, size: u32) -> Self {
        self.sky_face_size = size.max(1);
        self
    }

    pub fn material_texture(&self, name: &str, role: TextureRole) -> ImageData {
        let p = preset(name);
        let mut rng = StdRng::seed_from_u64(name_seed(name));
        let noise = ValueNoise::new(8, &mut rng);
        let size = self.texture_size;
        let texel = 1.0 / size as f32;
        let h = |x: u32, y: u32| {
            let uv = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) * texel;
            height(p.pattern, &noise, uv)
        };

        match role {
            TextureRole::Albedo => ImageData::from_fn(size, size, |x, y| {
                let shade = 1.0 - p.variation + p.variation * h(x, y);
                let c = p.base * shade;
                [encode_srgb(c.x), encode_srgb(c.y), encode_srgb(c.z), 255]
            }),
            TextureRole::Normal => ImageData::from_fn(size, size, |x, y| {
                let dx = h((x + 1) % size, y) - h((x + size - 1) % size, y);
                let dy = h(x, (y + 1) % size) - h(x, (y + size - 1) % size);
                let n = Vec3::new(-dx * p.bump, -dy * p.bump, 1.0).normalize();
                let e = n * 0.5 + Vec3::splat(0.5);
                [unorm(e.x), unorm(e.y), unorm(e.z), 255]
            }),
            TextureRole::Roughness => ImageData::from_fn(size, size, |x, y| {
                let r = p.roughness + (h(x, y) - 0.5) * 0.1;
                let v = unorm(r);
                [v, v, v, 255]
            }),
            TextureRole::Metal => {
                let v = unorm(p.metal);
                ImageData::solid(size, size, [v, v, v, 255])
            }
        }
    }

    /// Gradient sky with a sun opposite the key light, one image per face.
    pub fn sky(&self) -> [ImageData; 6] {
        let zenith = Vec3::new(0.10, 0.25, 0.60);
        let horizon = Vec3::new(0.70, 0.78, 0.88);
        let ground = Vec3::new(0.22, 0.20, 0.18);
        let sun_dir = Vec3::new(-1.0, 1.0, -1.0).normalize();
        let size = self.sky_face_size;

        CubeFace::ALL.map(|face| {
            ImageData::from_fn(size, size, |x, y| {
                let u = (x as f32 + 0.5) / size as f32;
                let v = (y as f32 + 0.5) / size as f32;
                let dir = face.direction(u, v);
                let mut c = if dir.y >= 0.0 {
                    horizon.lerp(zenith, dir.y.sqrt())
                } else {
                    horizon.lerp(ground, (-dir.y).powf(0.35))
                };
                let sun = dir.dot(sun_dir).max(0.0).powf(256.0);
                c += Vec3::new(1.0, 0.9, 0.7) * sun;
                [encode_srgb(c.x), encode_srgb(c.y), encode_srgb(c.z), 255]
            })
        })
    }
}

impl AssetSource for ProceduralAssets {
    fn texture(&self, name: &str, role: TextureRole) -> Result<ImageData, AssetError> {
        Ok(self.material_texture(name, role))
    }

    fn mesh(&self, shape: MeshShape) -> Result<MeshData, AssetError> {
        Ok(MeshData::from_shape(shape))
    }

    fn sky_faces(&self, _name: &str) -> Result<[ImageData; 6], AssetError> {
        Ok(self.sky())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textures_are_deterministic() {
        let assets = ProceduralAssets::new(32, 8);
        let a = assets.material_texture("bronze", TextureRole::Albedo);
        let b = assets.material_texture("bronze", TextureRole::Albedo);
        assert_eq!(a, b);
        let c = assets.material_texture("wood", TextureRole::Albedo);
        assert_ne!(a, c);
    }

    #[test]
    fn metal_presets() {
        let assets = ProceduralAssets::new(4, 4);
        let bronze = assets.material_texture("bronze", TextureRole::Metal);
        let wood = assets.material_texture("wood", TextureRole::Metal);
        assert_eq!(bronze.pixel(0, 0)[0], 255);
        assert_eq!(wood.pixel(0, 0)[0], 0);
    }

    #[test]
    fn normal_maps_point_out_of_surface() {
        let assets = ProceduralAssets::new(32, 8);
        let normals = assets.material_texture("cobblestone", TextureRole::Normal);
        for y in 0..normals.height() {
            for x in 0..normals.width() {
                assert!(normals.pixel(x, y)[2] > 128);
            }
        }
    }

    #[test]
    fn sky_is_brighter_above_horizon() {
        let assets = ProceduralAssets::new(4, 16);
        let faces = assets.sky();
        let up = faces[CubeFace::PositiveY.index() as usize].pixel(8, 8);
        let down = faces[CubeFace::NegativeY.index() as usize].pixel(8, 8);
        assert!(up[2] > down[2]);
        assert!(faces.iter().all(|f| f.width() == 16 && f.height() == 16));
    }

    #[test]
    fn srgb_encoding_endpoints() {
        assert_eq!(encode_srgb(0.0), 0);
        assert_eq!(encode_srgb(1.0), 255);
        assert!(encode_srgb(0.5) > 128);
    }
}
