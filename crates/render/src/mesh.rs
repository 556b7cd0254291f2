//! GPU mesh: an unindexed vertex buffer in device-local memory.

use std::sync::Arc;

use glam::Vec3;
use tracing::debug;

use glacier_assets::MeshData;
use glacier_rhi::buffer::{Buffer, BufferUsage};
use glacier_rhi::device::Device;
use glacier_rhi::upload::UploadContext;
use glacier_rhi::vertex::Vertex;
use glacier_rhi::vk;

use crate::error::RenderResult;

/// Vertex buffer plus count. Vertices are drawn unindexed, three per
/// triangle.
pub struct Mesh {
    vertex_buffer: Buffer,
    vertex_count: u32,
}

impl Mesh {
    /// Uploads `vertices` to a device-local vertex buffer by staging
    /// through host-visible memory and an immediate submit.
    pub fn new(
        device: Arc<Device>,
        upload: &UploadContext,
        vertices: &[Vertex],
    ) -> RenderResult<Self> {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);

        let staging = Buffer::new_with_data(device.clone(), BufferUsage::Staging, bytes)?;
        let vertex_buffer = Buffer::new(device, BufferUsage::Vertex, bytes.len() as u64)?;

        upload.immediate_submit(|cmd| {
            let region = vk::BufferCopy::default().size(bytes.len() as u64);
            cmd.copy_buffer(staging.handle(), vertex_buffer.handle(), &[region]);
            Ok(())
        })?;

        debug!(
            "Uploaded mesh: {} vertices ({} bytes)",
            vertices.len(),
            bytes.len()
        );

        Ok(Self {
            vertex_buffer,
            vertex_count: vertices.len() as u32,
        })
    }

    /// Uploads a loaded mesh asset, converting its vertices to the GPU
    /// layout.
    pub fn from_data(
        device: Arc<Device>,
        upload: &UploadContext,
        data: &MeshData,
    ) -> RenderResult<Self> {
        let vertices: Vec<Vertex> = data
            .vertices
            .iter()
            .map(|v| Vertex {
                position: v.position,
                normal: v.normal,
                color: v.color,
            })
            .collect();
        Self::new(device, upload, &vertices)
    }

    #[inline]
    pub fn vertex_buffer(&self) -> vk::Buffer {
        self.vertex_buffer.handle()
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}

/// The built-in triangle: one equilateral-ish face in the XY plane, one
/// color per corner.
pub fn triangle_vertices() -> Vec<Vertex> {
    vec![
        Vertex {
            position: Vec3::new(1.0, 1.0, 0.0),
            normal: Vec3::Z,
            color: Vec3::new(0.0, 1.0, 0.0),
        },
        Vertex {
            position: Vec3::new(-1.0, 1.0, 0.0),
            normal: Vec3::Z,
            color: Vec3::new(0.0, 1.0, 0.0),
        },
        Vertex {
            position: Vec3::new(0.0, -1.0, 0.0),
            normal: Vec3::Z,
            color: Vec3::new(0.0, 1.0, 0.0),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_has_three_vertices() {
        let verts = triangle_vertices();
        assert_eq!(verts.len(), 3);
        for v in &verts {
            assert_eq!(v.normal, Vec3::Z);
        }
    }
}
