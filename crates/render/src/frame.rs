//! Per-frame resources for double-buffered rendering.
//!
//! Two [`FrameContext`]s exist for the lifetime of the renderer. While the
//! GPU works on frame N the CPU records frame N+1 into the other context;
//! the context's fence gates reuse.

use std::mem::size_of;
use std::sync::Arc;

use glacier_rhi::buffer::{Buffer, BufferUsage};
use glacier_rhi::command::{CommandBuffer, CommandPool};
use glacier_rhi::descriptor::{self, DescriptorPool};
use glacier_rhi::device::Device;
use glacier_rhi::sync::{Fence, MAX_FRAMES_IN_FLIGHT, Semaphore};
use glacier_rhi::vk;

use crate::error::RenderResult;
use crate::gpu_types::{GpuCameraData, GpuObjectData, GpuSceneData, MAX_OBJECTS};

/// Maps a monotonically increasing frame number to a frame slot.
#[inline]
pub fn frame_slot(frame_number: u64) -> usize {
    (frame_number % MAX_FRAMES_IN_FLIGHT as u64) as usize
}

/// Everything one in-flight frame owns: command recording state, sync
/// primitives, per-frame GPU buffers, and the descriptor sets pointing at
/// them.
pub struct FrameContext {
    command_pool: CommandPool,
    command_buffer: CommandBuffer,
    image_available: Semaphore,
    render_finished: Semaphore,
    render_fence: Fence,
    camera_buffer: Buffer,
    object_buffer: Buffer,
    global_set: vk::DescriptorSet,
    object_set: vk::DescriptorSet,
}

impl FrameContext {
    /// Builds one frame slot and wires its descriptor sets.
    ///
    /// The fence starts signaled so the first wait on the slot returns
    /// immediately. The global set binds this slot's camera buffer at
    /// binding 0 and the shared scene buffer at binding 1 as a dynamic
    /// uniform; the per-slot offset is supplied at bind time.
    pub fn new(
        device: Arc<Device>,
        graphics_family: u32,
        descriptor_pool: &DescriptorPool,
        global_layout: vk::DescriptorSetLayout,
        object_layout: vk::DescriptorSetLayout,
        scene_buffer: &Buffer,
    ) -> RenderResult<Self> {
        let command_pool = CommandPool::new(device.clone(), graphics_family)?;
        let command_buffer = CommandBuffer::new(device.clone(), &command_pool)?;

        let image_available = Semaphore::new(device.clone())?;
        let render_finished = Semaphore::new(device.clone())?;
        let render_fence = Fence::new(device.clone(), true)?;

        let camera_buffer = Buffer::new(
            device.clone(),
            BufferUsage::Uniform,
            size_of::<GpuCameraData>() as u64,
        )?;
        let object_buffer = Buffer::new(
            device.clone(),
            BufferUsage::Storage,
            (size_of::<GpuObjectData>() * MAX_OBJECTS) as u64,
        )?;

        let sets = descriptor_pool.allocate(&[global_layout, object_layout])?;
        let global_set = sets[0];
        let object_set = sets[1];

        let camera_info = [descriptor::buffer_info(
            camera_buffer.handle(),
            0,
            size_of::<GpuCameraData>() as u64,
        )];
        let scene_info = [descriptor::buffer_info(
            scene_buffer.handle(),
            0,
            size_of::<GpuSceneData>() as u64,
        )];
        let object_info = [descriptor::buffer_info(
            object_buffer.handle(),
            0,
            object_buffer.size(),
        )];

        let writes = [
            vk::WriteDescriptorSet::default()
                .dst_set(global_set)
                .dst_binding(0)
                .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                .buffer_info(&camera_info),
            vk::WriteDescriptorSet::default()
                .dst_set(global_set)
                .dst_binding(1)
                .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC)
                .buffer_info(&scene_info),
            vk::WriteDescriptorSet::default()
                .dst_set(object_set)
                .dst_binding(0)
                .descriptor_type(vk::DescriptorType::STORAGE_BUFFER)
                .buffer_info(&object_info),
        ];
        descriptor::update_descriptor_sets(&device, &writes);

        Ok(Self {
            command_pool,
            command_buffer,
            image_available,
            render_finished,
            render_fence,
            camera_buffer,
            object_buffer,
            global_set,
            object_set,
        })
    }

    #[inline]
    pub fn command_buffer(&self) -> &CommandBuffer {
        &self.command_buffer
    }

    #[inline]
    pub fn command_pool(&self) -> &CommandPool {
        &self.command_pool
    }

    #[inline]
    pub fn image_available(&self) -> &Semaphore {
        &self.image_available
    }

    #[inline]
    pub fn render_finished(&self) -> &Semaphore {
        &self.render_finished
    }

    #[inline]
    pub fn render_fence(&self) -> &Fence {
        &self.render_fence
    }

    #[inline]
    pub fn camera_buffer(&self) -> &Buffer {
        &self.camera_buffer
    }

    #[inline]
    pub fn object_buffer(&self) -> &Buffer {
        &self.object_buffer
    }

    #[inline]
    pub fn global_set(&self) -> vk::DescriptorSet {
        self.global_set
    }

    #[inline]
    pub fn object_set(&self) -> vk::DescriptorSet {
        self.object_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_alternate_between_zero_and_one() {
        assert_eq!(frame_slot(0), 0);
        assert_eq!(frame_slot(1), 1);
        assert_eq!(frame_slot(2), 0);
        assert_eq!(frame_slot(3), 1);
    }

    #[test]
    fn slot_is_stable_across_large_frame_numbers() {
        assert_eq!(frame_slot(1_000_000), 0);
        assert_eq!(frame_slot(u64::MAX), 1);
        for n in 0..100 {
            assert_eq!(frame_slot(n), frame_slot(n + 2));
        }
    }
}
