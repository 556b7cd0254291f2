//! GPU-visible data layouts.
//!
//! Every struct here is `#[repr(C)]` and mirrored field-for-field by the
//! shaders, so the layouts are load-bearing: the tests at the bottom pin
//! their sizes.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

/// Upper bound on renderables per frame; sizes the per-frame object
/// storage buffer.
pub const MAX_OBJECTS: usize = 10_000;

/// Per-frame camera matrices, bound as a uniform buffer at set 0 binding 0.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuCameraData {
    pub view: Mat4,
    pub proj: Mat4,
    pub view_proj: Mat4,
}

/// Global scene parameters, bound as a dynamic uniform buffer at set 0
/// binding 1. One buffer holds an aligned slot per frame in flight; the
/// dynamic offset picks the slot at bind time.
///
/// `fog_distances`: x = near, y = far; the rest is padding.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuSceneData {
    pub fog_color: Vec4,
    pub fog_distances: Vec4,
    pub ambient_color: Vec4,
    pub sunlight_direction: Vec4,
    pub sunlight_color: Vec4,
}

/// Per-object model matrix, one element of the storage buffer at set 1
/// binding 0. Indexed in the vertex shader by `gl_InstanceIndex`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuObjectData {
    pub model: Mat4,
}

/// Rounds `size` up to the next multiple of `alignment`.
///
/// Used to space dynamic uniform slots so each offset satisfies the
/// device's `minUniformBufferOffsetAlignment`. An alignment of zero means
/// no restriction. Vulkan guarantees the alignment is a power of two.
pub fn pad_uniform_buffer_size(size: u64, alignment: u64) -> u64 {
    if alignment > 0 {
        (size + alignment - 1) & !(alignment - 1)
    } else {
        size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn camera_data_is_three_matrices() {
        assert_eq!(size_of::<GpuCameraData>(), 192);
    }

    #[test]
    fn scene_data_is_five_vectors() {
        assert_eq!(size_of::<GpuSceneData>(), 80);
    }

    #[test]
    fn object_data_is_one_matrix() {
        assert_eq!(size_of::<GpuObjectData>(), 64);
    }

    #[test]
    fn padding_is_minimal_multiple_of_alignment() {
        for &alignment in &[1u64, 16, 64, 256] {
            for size in 1..=10_000u64 {
                let padded = pad_uniform_buffer_size(size, alignment);
                assert!(padded >= size);
                assert_eq!(padded % alignment, 0);
                assert!(padded - size < alignment);
            }
        }
    }

    #[test]
    fn padding_is_idempotent() {
        for &alignment in &[1u64, 16, 64, 256] {
            for size in 1..=10_000u64 {
                let once = pad_uniform_buffer_size(size, alignment);
                assert_eq!(pad_uniform_buffer_size(once, alignment), once);
            }
        }
    }

    #[test]
    fn zero_alignment_means_unrestricted() {
        assert_eq!(pad_uniform_buffer_size(80, 0), 80);
        assert_eq!(pad_uniform_buffer_size(1, 0), 1);
    }

    #[test]
    fn aligned_sizes_pass_through() {
        assert_eq!(pad_uniform_buffer_size(256, 256), 256);
        assert_eq!(pad_uniform_buffer_size(512, 256), 512);
        assert_eq!(pad_uniform_buffer_size(80, 16), 80);
    }
}
