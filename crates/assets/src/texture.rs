use crate::AssetError;
use serde::{Deserialize, Serialize};

/// Which material channel an image feeds. Only albedo is stored as sRGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TextureRole {
    Albedo,
    Normal,
    Roughness,
    Metal,
}

impl TextureRole {
    pub const ALL: [TextureRole; 4] = [
        TextureRole::Albedo,
        TextureRole::Normal,
        TextureRole::Roughness,
        TextureRole::Metal,
    ];

    pub fn is_srgb(self) -> bool {
        matches!(self, TextureRole::Albedo)
    }

    /// Suffix used in on-disk file names, e.g. `bronze_roughness.png`.
    pub fn file_suffix(self) -> &'static str {
        match self {
            TextureRole::Albedo => "albedo",
            TextureRole::Normal => "normals",
            TextureRole::Roughness => "roughness",
            TextureRole::Metal => "metal",
        }
    }
}

/// Decoded RGBA8 image, rows tightly packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl ImageData {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, AssetError> {
        if width == 0 || height == 0 || pixels.len() != (width * height * 4) as usize {
            return Err(AssetError::InvalidImage {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Single-colour image. Zero dimensions are raised to 1.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::from_fn(width, height, |_, _| rgba)
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Full mip chain, level 0 first, each level box-filtered from the one above.
    pub fn mip_chain(&self) -> Vec<ImageData> {
        let count = mip_level_count(self.width, self.height) as usize;
        let mut chain = Vec::with_capacity(count);
        chain.push(self.clone());
        while chain.len() < count {
            let next = chain[chain.len() - 1].downsample();
            chain.push(next);
        }
        chain
    }

    fn downsample(&self) -> ImageData {
        let width = (self.width / 2).max(1);
        let height = (self.height / 2).max(1);
        ImageData::from_fn(width, height, |x, y| {
            let x0 = (x * 2).min(self.width - 1);
            let y0 = (y * 2).min(self.height - 1);
            let x1 = (x * 2 + 1).min(self.width - 1);
            let y1 = (y * 2 + 1).min(self.height - 1);
            let taps = [
                self.pixel(x0, y0),
                self.pixel(x1, y0),
                self.pixel(x0, y1),
                self.pixel(x1, y1),
            ];
            let mut out = [0u8; 4];
            for (c, value) in out.iter_mut().enumerate() {
                let sum: u32 = taps.iter().map(|t| t[c] as u32).sum();
                *value = ((sum + 2) / 4) as u8;
            }
            out
        })
    }
}

/// Number of levels in a full mip chain for a `width` x `height` image.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_pixel_buffer() {
        assert!(ImageData::new(2, 2, vec![0; 15]).is_err());
        assert!(ImageData::new(0, 2, vec![]).is_err());
        assert!(ImageData::new(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn mip_level_counts() {
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(300, 20), 9);
    }

    #[test]
    fn mip_chain_ends_at_one_texel() {
        let image = ImageData::solid(8, 4, [10, 20, 30, 255]);
        let chain = image.mip_chain();
        assert_eq!(chain.len(), 4);
        let last = chain.last().unwrap();
        assert_eq!((last.width(), last.height()), (1, 1));
        assert_eq!(last.pixel(0, 0), [10, 20, 30, 255]);
    }

    #[test]
    fn downsample_averages_blocks() {
        let image = ImageData::from_fn(2, 2, |x, y| {
            let v = if (x + y) % 2 == 0 { 0 } else { 200 };
            [v, v, v, 255]
        });
        let chain = image.mip_chain();
        assert_eq!(chain[1].pixel(0, 0), [100, 100, 100, 255]);
    }

    #[test]
    fn only_albedo_is_srgb() {
        let srgb: Vec<_> = TextureRole::ALL.iter().filter(|r| r.is_srgb()).collect();
        assert_eq!(srgb, vec![&TextureRole::Albedo]);
    }
}
