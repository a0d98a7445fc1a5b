use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Vertex layout shared by every mesh: position, uv, normal, tangent (+U).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
}

impl MeshVertex {
    fn new(position: Vec3, uv: Vec2, normal: Vec3, tangent: Vec3) -> Self {
        Self {
            position: position.to_array(),
            uv: uv.to_array(),
            normal: normal.to_array(),
            tangent: tangent.to_array(),
        }
    }
}

/// Procedural shapes the demo can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshShape {
    Sphere { slices: u32, stacks: u32 },
    Cube,
}

impl MeshShape {
    pub const SPHERE: MeshShape = MeshShape::Sphere {
        slices: 48,
        stacks: 24,
    };
}

/// Indexed triangle list, counter-clockwise when seen from outside.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn from_shape(shape: MeshShape) -> Self {
        match shape {
            MeshShape::Sphere { slices, stacks } => Self::sphere(slices, stacks),
            MeshShape::Cube => Self::cube(),
        }
    }

    /// UV sphere of diameter 1 centred on the origin.
    pub fn sphere(slices: u32, stacks: u32) -> Self {
        let slices = slices.max(3);
        let stacks = stacks.max(2);
        let radius = 0.5;
        let mut vertices = Vec::with_capacity(((slices + 1) * (stacks + 1)) as usize);
        for i in 0..=stacks {
            let v = i as f32 / stacks as f32;
            let phi = v * PI;
            for j in 0..=slices {
                let u = j as f32 / slices as f32;
                let theta = u * 2.0 * PI;
                let normal = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
                let tangent = Vec3::new(-theta.sin(), 0.0, theta.cos());
                vertices.push(MeshVertex::new(
                    normal * radius,
                    Vec2::new(u, v),
                    normal,
                    tangent,
                ));
            }
        }

        let row = slices + 1;
        let mut indices = Vec::with_capacity((slices * stacks * 6) as usize);
        for i in 0..stacks {
            for j in 0..slices {
                let a = i * row + j;
                let b = a + row;
                indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
            }
        }
        Self { vertices, indices }
    }

    /// Unit cube centred on the origin with per-face normals.
    pub fn cube() -> Self {
        let p = 0.5_f32;
        #[rustfmt::skip]
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            ([0.0, 0.0, 1.0],  [[-p, -p,  p], [ p, -p,  p], [ p,  p,  p], [-p,  p,  p]]),
            ([0.0, 0.0, -1.0], [[ p, -p, -p], [-p, -p, -p], [-p,  p, -p], [ p,  p, -p]]),
            ([1.0, 0.0, 0.0],  [[ p, -p,  p], [ p, -p, -p], [ p,  p, -p], [ p,  p,  p]]),
            ([-1.0, 0.0, 0.0], [[-p, -p, -p], [-p, -p,  p], [-p,  p,  p], [-p,  p, -p]]),
            ([0.0, 1.0, 0.0],  [[-p,  p,  p], [ p,  p,  p], [ p,  p, -p], [-p,  p, -p]]),
            ([0.0, -1.0, 0.0], [[-p, -p, -p], [ p, -p, -p], [ p, -p,  p], [-p, -p,  p]]),
        ];
        let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, corners) in faces {
            let base = vertices.len() as u32;
            let tangent = (Vec3::from(corners[1]) - Vec3::from(corners[0])).normalize();
            for (corner, uv) in corners.iter().zip(uvs) {
                vertices.push(MeshVertex::new(
                    Vec3::from(*corner),
                    Vec2::from(uv),
                    Vec3::from(normal),
                    tangent,
                ));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outward_winding(mesh: &MeshData) -> bool {
        mesh.indices.chunks(3).all(|tri| {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(mesh.vertices[i as usize].position));
            let face_normal = (b - a).cross(c - a);
            let centre = (a + b + c) / 3.0;
            // Degenerate triangles at the sphere poles carry no orientation.
            face_normal.length() < 1e-6 || face_normal.dot(centre) > 0.0
        })
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = MeshData::sphere(16, 8);
        for v in &mesh.vertices {
            let len = Vec3::from(v.position).length();
            assert!((len - 0.5).abs() < 1e-5);
        }
        assert_eq!(mesh.vertices.len(), 17 * 9);
        assert_eq!(mesh.triangle_count(), 16 * 8 * 2);
    }

    #[test]
    fn sphere_tangents_are_perpendicular_to_normals() {
        let mesh = MeshData::sphere(12, 6);
        for v in &mesh.vertices {
            let d = Vec3::from(v.normal).dot(Vec3::from(v.tangent));
            assert!(d.abs() < 1e-5);
        }
    }

    #[test]
    fn sphere_winds_outward() {
        assert!(outward_winding(&MeshData::sphere(16, 8)));
    }

    #[test]
    fn cube_winds_outward() {
        let mesh = MeshData::cube();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert!(outward_winding(&mesh));
    }

    #[test]
    fn indices_in_range() {
        for mesh in [MeshData::from_shape(MeshShape::SPHERE), MeshData::cube()] {
            let n = mesh.vertices.len() as u32;
            assert!(mesh.indices.iter().all(|&i| i < n));
        }
    }
}
