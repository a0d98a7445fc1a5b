use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One face of a cubemap, in array-layer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// Array layer of this face.
    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn axis(self) -> Vec3 {
        match self {
            CubeFace::PositiveX => Vec3::X,
            CubeFace::NegativeX => Vec3::NEG_X,
            CubeFace::PositiveY => Vec3::Y,
            CubeFace::NegativeY => Vec3::NEG_Y,
            CubeFace::PositiveZ => Vec3::Z,
            CubeFace::NegativeZ => Vec3::NEG_Z,
        }
    }

    /// Unit direction sampled by face texel coordinate `(u, v)` in `[0, 1]`,
    /// origin at the top-left of the face image.
    pub fn direction(self, u: f32, v: f32) -> Vec3 {
        let s = u * 2.0 - 1.0;
        let t = v * 2.0 - 1.0;
        let dir = match self {
            CubeFace::PositiveX => Vec3::new(1.0, -t, -s),
            CubeFace::NegativeX => Vec3::new(-1.0, -t, s),
            CubeFace::PositiveY => Vec3::new(s, 1.0, t),
            CubeFace::NegativeY => Vec3::new(s, -1.0, -t),
            CubeFace::PositiveZ => Vec3::new(s, -t, 1.0),
            CubeFace::NegativeZ => Vec3::new(-s, -t, -1.0),
        };
        dir.normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_centres_point_along_axes() {
        for face in CubeFace::ALL {
            let d = face.direction(0.5, 0.5);
            assert!((d - face.axis()).length() < 1e-6, "{face:?}");
        }
    }

    #[test]
    fn index_round_trip() {
        for (i, face) in CubeFace::ALL.iter().enumerate() {
            assert_eq!(face.index(), i as u32);
            assert_eq!(CubeFace::from_index(i as u32), Some(*face));
        }
        assert_eq!(CubeFace::from_index(6), None);
    }

    #[test]
    fn adjacent_faces_share_edges() {
        // Right edge of +Z meets left edge of +X.
        for i in 0..=4 {
            let v = i as f32 / 4.0;
            let a = CubeFace::PositiveZ.direction(1.0, v);
            let b = CubeFace::PositiveX.direction(0.0, v);
            assert!((a - b).length() < 1e-5);
        }
        // Top edge of +Z meets bottom edge of +Y.
        for i in 0..=4 {
            let u = i as f32 / 4.0;
            let a = CubeFace::PositiveZ.direction(u, 0.0);
            let b = CubeFace::PositiveY.direction(u, 1.0);
            assert!((a - b).length() < 1e-5);
        }
    }

    #[test]
    fn directions_are_normalized() {
        for face in CubeFace::ALL {
            let d = face.direction(0.0, 1.0);
            assert!((d.length() - 1.0).abs() < 1e-6);
        }
    }
}
