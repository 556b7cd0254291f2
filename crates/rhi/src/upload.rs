//! Immediate GPU submissions for resource uploads.
//!
//! [`UploadContext`] owns a transient command pool and a fence, decoupled
//! from the per-frame command buffers so uploads (and the readback copies
//! that verify them) can happen at any point outside the render loop.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::buffer::{Buffer, BufferUsage};
use crate::command::{CommandBuffer, CommandPool};
use crate::device::Device;
use crate::error::RhiResult;
use crate::image::Image;
use crate::sync::Fence;

/// How long a blocking upload may take before it is treated as a hang.
pub const UPLOAD_TIMEOUT_NS: u64 = 10_000_000_000;

/// Context for one-off blocking submissions (staging copies, layout
/// transitions).
pub struct UploadContext {
    device: Arc<Device>,
    command_pool: CommandPool,
    upload_fence: Fence,
}

impl UploadContext {
    /// Creates the transient pool and an unsignaled fence on the graphics
    /// queue family.
    pub fn new(device: Arc<Device>, graphics_queue_family: u32) -> RhiResult<Self> {
        let command_pool = CommandPool::new_transient(device.clone(), graphics_queue_family)?;
        let upload_fence = Fence::new(device.clone(), false)?;

        Ok(Self {
            device,
            command_pool,
            upload_fence,
        })
    }

    /// Records commands via `record`, submits them to the graphics queue,
    /// and blocks until the GPU finishes.
    ///
    /// No semaphores are involved; ordering against in-flight frames is the
    /// caller's concern (uploads happen before the mesh or texture is ever
    /// drawn). The fence and pool are reset afterwards so the context can be
    /// reused.
    pub fn immediate_submit<F>(&self, record: F) -> RhiResult<()>
    where
        F: FnOnce(&CommandBuffer) -> RhiResult<()>,
    {
        let cmd = CommandBuffer::new(self.device.clone(), &self.command_pool)?;

        cmd.begin()?;
        record(&cmd)?;
        cmd.end()?;

        let command_buffers = [cmd.handle()];
        let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);

        unsafe {
            self.device
                .submit_graphics(&[submit_info], self.upload_fence.handle())?;
        }

        self.upload_fence.wait(UPLOAD_TIMEOUT_NS, "upload")?;
        self.upload_fence.reset()?;
        self.command_pool.reset()?;

        debug!("Immediate submit complete");
        Ok(())
    }

    /// Copies a device-local buffer back into host memory, the inverse of
    /// the staged upload. Blocks until the copy lands.
    pub fn download_buffer(&self, src: &Buffer) -> RhiResult<Vec<u8>> {
        let staging = Buffer::new(self.device.clone(), BufferUsage::Staging, src.size())?;

        self.immediate_submit(|cmd| {
            let copy = vk::BufferCopy::default().size(src.size());
            cmd.copy_buffer(src.handle(), staging.handle(), &[copy]);
            Ok(())
        })?;

        staging.read_data(0, src.size() as usize)
    }

    /// Copies a sampled texture back into host memory as tightly packed
    /// RGBA8 pixels. The image is moved out of its shader-read layout for
    /// the copy and restored afterwards.
    pub fn download_image(&self, src: &Image) -> RhiResult<Vec<u8>> {
        let extent = src.extent();
        let byte_len = extent.width as vk::DeviceSize * extent.height as vk::DeviceSize * 4;
        let staging = Buffer::new(self.device.clone(), BufferUsage::Staging, byte_len)?;

        let subresource_range = vk::ImageSubresourceRange::default()
            .aspect_mask(vk::ImageAspectFlags::COLOR)
            .base_mip_level(0)
            .level_count(1)
            .base_array_layer(0)
            .layer_count(1);

        self.immediate_submit(|cmd| {
            let to_transfer = vk::ImageMemoryBarrier::default()
                .old_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
                .new_layout(vk::ImageLayout::TRANSFER_SRC_OPTIMAL)
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .image(src.handle())
                .subresource_range(subresource_range)
                .src_access_mask(vk::AccessFlags::SHADER_READ)
                .dst_access_mask(vk::AccessFlags::TRANSFER_READ);
            cmd.pipeline_barrier(
                vk::PipelineStageFlags::FRAGMENT_SHADER,
                vk::PipelineStageFlags::TRANSFER,
                &[to_transfer],
            );

            let region = vk::BufferImageCopy::default()
                .buffer_offset(0)
                .buffer_row_length(0)
                .buffer_image_height(0)
                .image_subresource(
                    vk::ImageSubresourceLayers::default()
                        .aspect_mask(vk::ImageAspectFlags::COLOR)
                        .mip_level(0)
                        .base_array_layer(0)
                        .layer_count(1),
                )
                .image_extent(vk::Extent3D {
                    width: extent.width,
                    height: extent.height,
                    depth: 1,
                });
            cmd.copy_image_to_buffer(
                src.handle(),
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                staging.handle(),
                &[region],
            );

            let to_shader_read = vk::ImageMemoryBarrier::default()
                .old_layout(vk::ImageLayout::TRANSFER_SRC_OPTIMAL)
                .new_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .image(src.handle())
                .subresource_range(subresource_range)
                .src_access_mask(vk::AccessFlags::TRANSFER_READ)
                .dst_access_mask(vk::AccessFlags::SHADER_READ);
            cmd.pipeline_barrier(
                vk::PipelineStageFlags::TRANSFER,
                vk::PipelineStageFlags::FRAGMENT_SHADER,
                &[to_shader_read],
            );

            Ok(())
        })?;

        staging.read_data(0, byte_len as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_timeout_is_ten_seconds() {
        assert_eq!(UPLOAD_TIMEOUT_NS, 10 * 1_000_000_000);
    }

    #[test]
    fn upload_context_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<UploadContext>();
    }
}
