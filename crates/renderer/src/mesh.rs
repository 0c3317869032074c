//! GPU mesh whose vertex buffer is rewritten in place when the CPU copy changes.

use bytemuck::Pod;
use wgpu::util::DeviceExt;

/// A GPU mesh with a rewritable vertex buffer and a fixed index buffer.
///
/// The vertex count is fixed at creation; `write` replaces the contents only.
pub struct DynamicMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
    vertex_bytes: u64,
}

impl DynamicMesh {
    /// Create a mesh from vertex and index data.
    pub fn new<V: Pod>(device: &wgpu::Device, vertices: &[V], indices: &[u32], label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
            vertex_bytes: std::mem::size_of_val(vertices) as u64,
        }
    }

    /// Re-upload vertex data. Must have the same length as at creation.
    pub fn write<V: Pod>(&self, queue: &wgpu::Queue, vertices: &[V]) {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        if bytes.len() as u64 != self.vertex_bytes {
            log::error!(
                "vertex upload of {} bytes does not match buffer of {} bytes; skipped",
                bytes.len(),
                self.vertex_bytes
            );
            return;
        }
        queue.write_buffer(&self.vertex_buffer, 0, bytes);
    }
}
