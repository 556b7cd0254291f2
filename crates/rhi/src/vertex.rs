//! Vertex format and input descriptions.

use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Vertex format used by every mesh in the engine.
///
/// `#[repr(C)]` keeps the layout predictable for the vertex input state:
/// - offset 0: position (12 bytes)
/// - offset 12: normal (12 bytes)
/// - offset 24: color (12 bytes)
/// - total: 36 bytes
///
/// Shader locations are 0 (position), 1 (normal), 2 (color).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: Vec3,
}

impl Vertex {
    #[inline]
    pub const fn new(position: Vec3, normal: Vec3, color: Vec3) -> Self {
        Self {
            position,
            normal,
            color,
        }
    }

    /// Binding description for binding 0 with per-vertex input rate.
    pub fn binding_description() -> vk::VertexInputBindingDescription {
        vk::VertexInputBindingDescription {
            binding: 0,
            stride: std::mem::size_of::<Self>() as u32,
            input_rate: vk::VertexInputRate::VERTEX,
        }
    }

    /// Attribute descriptions matching the shader input locations.
    pub fn attribute_descriptions() -> [vk::VertexInputAttributeDescription; 3] {
        [
            vk::VertexInputAttributeDescription {
                binding: 0,
                location: 0,
                format: vk::Format::R32G32B32_SFLOAT,
                offset: 0,
            },
            vk::VertexInputAttributeDescription {
                binding: 0,
                location: 1,
                format: vk::Format::R32G32B32_SFLOAT,
                offset: 12,
            },
            vk::VertexInputAttributeDescription {
                binding: 0,
                location: 2,
                format: vk::Format::R32G32B32_SFLOAT,
                offset: 24,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_36_bytes() {
        assert_eq!(std::mem::size_of::<Vertex>(), 36);
    }

    #[test]
    fn binding_covers_whole_vertex() {
        let binding = Vertex::binding_description();
        assert_eq!(binding.binding, 0);
        assert_eq!(binding.stride, 36);
        assert_eq!(binding.input_rate, vk::VertexInputRate::VERTEX);
    }

    #[test]
    fn attributes_match_field_offsets() {
        use std::mem::offset_of;

        let attrs = Vertex::attribute_descriptions();
        assert_eq!(attrs.len(), 3);

        for (location, attr) in attrs.iter().enumerate() {
            assert_eq!(attr.binding, 0);
            assert_eq!(attr.location, location as u32);
            assert_eq!(attr.format, vk::Format::R32G32B32_SFLOAT);
        }

        assert_eq!(attrs[0].offset as usize, offset_of!(Vertex, position));
        assert_eq!(attrs[1].offset as usize, offset_of!(Vertex, normal));
        assert_eq!(attrs[2].offset as usize, offset_of!(Vertex, color));
    }

    #[test]
    fn vertex_casts_through_bytemuck() {
        let vertex = Vertex::new(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.2, 0.4, 0.6),
        );

        let bytes: &[u8] = bytemuck::bytes_of(&vertex);
        assert_eq!(bytes.len(), 36);

        let back: &Vertex = bytemuck::from_bytes(bytes);
        assert_eq!(back.position, vertex.position);
        assert_eq!(back.normal, vertex.normal);
        assert_eq!(back.color, vertex.color);
    }
}
