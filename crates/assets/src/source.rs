use crate::mesh::{MeshData, MeshShape};
use crate::procedural::ProceduralAssets;
use crate::texture::{ImageData, TextureRole};
use crate::AssetError;
use std::path::{Path, PathBuf};

/// Where the renderer gets its CPU-side data from.
///
/// Decoding lives behind this trait; the renderer only ever sees RGBA8
/// images and indexed meshes.
pub trait AssetSource {
    fn texture(&self, name: &str, role: TextureRole) -> Result<ImageData, AssetError>;

    fn mesh(&self, shape: MeshShape) -> Result<MeshData, AssetError>;

    /// The six faces of a cubemap in +X, -X, +Y, -Y, +Z, -Z order.
    fn sky_faces(&self, name: &str) -> Result<[ImageData; 6], AssetError>;
}

/// File names of the cubemap faces, in layer order.
pub const SKY_FACE_FILES: [&str; 6] = ["right", "left", "up", "down", "front", "back"];

/// Loads PNG files from a directory, falling back to procedural data for
/// anything that is missing.
///
/// Layout:
/// - `<root>/<material>_<role>.png`, e.g. `bronze_albedo.png`
/// - `<root>/<sky>/{right,left,up,down,front,back}.png`
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
    fallback: ProceduralAssets,
}

impl DirectoryAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fallback: ProceduralAssets::default(),
        }
    }

    pub fn with_fallback(mut self, fallback: ProceduralAssets) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn texture_path(&self, name: &str, role: TextureRole) -> PathBuf {
        self.root.join(format!("{name}_{}.png", role.file_suffix()))
    }
}

/// Decode a PNG into RGBA8.
pub fn load_png(path: &Path) -> Result<ImageData, AssetError> {
    let decoded = image::open(path)?.to_rgba8();
    let (width, height) = decoded.dimensions();
    ImageData::new(width, height, decoded.into_raw())
}

/// Check six decoded faces for a square, uniform size and pack them.
pub fn cube_faces(faces: Vec<ImageData>) -> Result<[ImageData; 6], AssetError> {
    let count = faces.len();
    let faces: [ImageData; 6] = faces
        .try_into()
        .map_err(|_| AssetError::MissingFace { count })?;
    let expected = (faces[0].width(), faces[0].height());
    for (face, image) in faces.iter().enumerate() {
        let found = (image.width(), image.height());
        if found != expected || found.0 != found.1 {
            return Err(AssetError::FaceSizeMismatch {
                face,
                expected,
                found,
            });
        }
    }
    Ok(faces)
}

impl AssetSource for DirectoryAssets {
    fn texture(&self, name: &str, role: TextureRole) -> Result<ImageData, AssetError> {
        let path = self.texture_path(name, role);
        if !path.exists() {
            tracing::warn!("missing texture {}, using procedural data", path.display());
            return self.fallback.texture(name, role);
        }
        tracing::debug!("loading texture {}", path.display());
        load_png(&path)
    }

    fn mesh(&self, shape: MeshShape) -> Result<MeshData, AssetError> {
        self.fallback.mesh(shape)
    }

    fn sky_faces(&self, name: &str) -> Result<[ImageData; 6], AssetError> {
        let dir = self.root.join(name);
        let paths: Vec<PathBuf> = SKY_FACE_FILES
            .iter()
            .map(|face| dir.join(format!("{face}.png")))
            .collect();
        if let Some(missing) = paths.iter().find(|p| !p.exists()) {
            tracing::warn!("missing sky face {}, using procedural sky", missing.display());
            return self.fallback.sky_faces(name);
        }
        let faces = paths
            .iter()
            .map(|p| load_png(p))
            .collect::<Result<Vec<_>, _>>()?;
        cube_faces(faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(path: &Path, width: u32, height: u32, rgba: [u8; 4]) {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        img.save(path).unwrap();
    }

    #[test]
    fn loads_texture_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let assets = DirectoryAssets::new(dir.path());
        write_png(
            &assets.texture_path("bronze", TextureRole::Albedo),
            4,
            2,
            [9, 8, 7, 255],
        );

        let image = assets.texture("bronze", TextureRole::Albedo).unwrap();
        assert_eq!((image.width(), image.height()), (4, 2));
        assert_eq!(image.pixel(3, 1), [9, 8, 7, 255]);
    }

    #[test]
    fn missing_texture_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let assets =
            DirectoryAssets::new(dir.path()).with_fallback(ProceduralAssets::new(16, 8));
        let image = assets.texture("wood", TextureRole::Normal).unwrap();
        assert_eq!(image.width(), 16);
    }

    #[test]
    fn corrupt_texture_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let assets = DirectoryAssets::new(dir.path());
        std::fs::write(assets.texture_path("paint", TextureRole::Albedo), b"not a png").unwrap();
        assert!(assets.texture("paint", TextureRole::Albedo).is_err());
    }

    #[test]
    fn loads_sky_faces_in_layer_order() {
        let dir = tempfile::tempdir().unwrap();
        let sky_dir = dir.path().join("sky");
        std::fs::create_dir_all(&sky_dir).unwrap();
        for (i, face) in SKY_FACE_FILES.iter().enumerate() {
            write_png(&sky_dir.join(format!("{face}.png")), 2, 2, [i as u8, 0, 0, 255]);
        }
        let assets = DirectoryAssets::new(dir.path());
        let faces = assets.sky_faces("sky").unwrap();
        for (i, face) in faces.iter().enumerate() {
            assert_eq!(face.pixel(0, 0)[0], i as u8);
        }
    }

    #[test]
    fn cube_faces_reject_mixed_sizes() {
        let mut faces: Vec<_> = (0..6).map(|_| ImageData::solid(4, 4, [0; 4])).collect();
        faces[3] = ImageData::solid(8, 8, [0; 4]);
        assert!(matches!(
            cube_faces(faces),
            Err(AssetError::FaceSizeMismatch { face: 3, .. })
        ));
        assert!(matches!(
            cube_faces(vec![ImageData::solid(1, 1, [0; 4])]),
            Err(AssetError::MissingFace { count: 1 })
        ));
    }
}
