use lumen_assets::{AssetSource, MeshData, MeshVertex};
use lumen_common::MeshHandle;
use lumen_render::RenderError;
use lumen_scene::Scene;
use wgpu::util::DeviceExt;

pub(crate) const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32x2,
    2 => Float32x3,
    3 => Float32x3,
];

pub(crate) fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

/// Vertex and index buffers of one mesh.
pub(crate) struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    pub(crate) fn upload(device: &wgpu::Device, label: &str, data: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_vertices")),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_indices")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        }
    }

    pub(crate) fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Every mesh in the scene table, indexed by handle.
pub(crate) struct MeshTable {
    meshes: Vec<GpuMesh>,
}

impl MeshTable {
    pub(crate) fn upload(
        device: &wgpu::Device,
        scene: &Scene,
        assets: &dyn AssetSource,
    ) -> Result<Self, RenderError> {
        let mut meshes = Vec::with_capacity(scene.meshes().len());
        for (i, shape) in scene.meshes().iter().enumerate() {
            let data = assets.mesh(*shape)?;
            tracing::debug!(
                handle = i,
                vertices = data.vertices.len(),
                triangles = data.triangle_count(),
                "uploading mesh"
            );
            meshes.push(GpuMesh::upload(device, &format!("mesh_{i}"), &data));
        }
        Ok(Self { meshes })
    }

    pub(crate) fn get(&self, handle: MeshHandle) -> Option<&GpuMesh> {
        self.meshes.get(handle.0 as usize)
    }
}
