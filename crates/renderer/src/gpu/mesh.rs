use bytemuck::{Pod, Zeroable};
use tunnel::CylinderMesh;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct GpuVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl GpuVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

pub(crate) fn to_gpu_vertices(mesh: &CylinderMesh) -> Vec<GpuVertex> {
    mesh.vertices
        .iter()
        .map(|vertex| GpuVertex {
            position: vertex.position,
            uv: vertex.uv,
        })
        .collect()
}

/// Uploaded cylinder geometry.
pub(crate) struct MeshBuffers {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshBuffers {
    pub fn new(device: &wgpu::Device, mesh: &CylinderMesh) -> Self {
        let vertices = to_gpu_vertices(mesh);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cylinder vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cylinder indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        tracing::debug!(
            vertices = vertices.len(),
            indices = mesh.index_count(),
            "uploaded cylinder mesh"
        );

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_is_tightly_packed() {
        let layout = GpuVertex::layout();
        assert_eq!(layout.array_stride, 20);
        assert_eq!(layout.attributes[1].offset, 12);
    }

    #[test]
    fn conversion_keeps_every_vertex() {
        let mesh = CylinderMesh::default();
        let vertices = to_gpu_vertices(&mesh);
        assert_eq!(vertices.len(), mesh.vertex_count());
        assert_eq!(vertices[0].uv, mesh.vertices[0].uv);
    }
}
