//! Sampled texture upload.

use std::sync::Arc;

use tracing::debug;

use glacier_assets::TextureData;
use glacier_rhi::buffer::{Buffer, BufferUsage};
use glacier_rhi::device::Device;
use glacier_rhi::image::{Image, ImageUsage};
use glacier_rhi::upload::UploadContext;
use glacier_rhi::vk;

use crate::error::RenderResult;

/// RGBA8 image in device-local memory, shader-read-only after upload.
pub struct Texture {
    image: Image,
}

impl Texture {
    /// Uploads decoded pixels through a staging buffer. The image is
    /// transitioned to `TRANSFER_DST_OPTIMAL` for the copy and finishes in
    /// `SHADER_READ_ONLY_OPTIMAL`.
    pub fn new(
        device: Arc<Device>,
        upload: &UploadContext,
        data: &TextureData,
    ) -> RenderResult<Self> {
        let staging = Buffer::new_with_data(device.clone(), BufferUsage::Staging, &data.pixels)?;

        let image = Image::new(
            device,
            ImageUsage::Texture,
            vk::Format::R8G8B8A8_SRGB,
            data.width,
            data.height,
        )?;

        let subresource = vk::ImageSubresourceRange::default()
            .aspect_mask(vk::ImageAspectFlags::COLOR)
            .base_mip_level(0)
            .level_count(1)
            .base_array_layer(0)
            .layer_count(1);

        upload.immediate_submit(|cmd| {
            let to_transfer = vk::ImageMemoryBarrier::default()
                .old_layout(vk::ImageLayout::UNDEFINED)
                .new_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
                .src_access_mask(vk::AccessFlags::empty())
                .dst_access_mask(vk::AccessFlags::TRANSFER_WRITE)
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .image(image.handle())
                .subresource_range(subresource);
            cmd.pipeline_barrier(
                vk::PipelineStageFlags::TOP_OF_PIPE,
                vk::PipelineStageFlags::TRANSFER,
                &[to_transfer],
            );

            let region = vk::BufferImageCopy::default()
                .image_subresource(
                    vk::ImageSubresourceLayers::default()
                        .aspect_mask(vk::ImageAspectFlags::COLOR)
                        .mip_level(0)
                        .base_array_layer(0)
                        .layer_count(1),
                )
                .image_extent(vk::Extent3D {
                    width: data.width,
                    height: data.height,
                    depth: 1,
                });
            cmd.copy_buffer_to_image(
                staging.handle(),
                image.handle(),
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region],
            );

            let to_shader = vk::ImageMemoryBarrier::default()
                .old_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
                .new_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
                .src_access_mask(vk::AccessFlags::TRANSFER_WRITE)
                .dst_access_mask(vk::AccessFlags::SHADER_READ)
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .image(image.handle())
                .subresource_range(subresource);
            cmd.pipeline_barrier(
                vk::PipelineStageFlags::TRANSFER,
                vk::PipelineStageFlags::FRAGMENT_SHADER,
                &[to_shader],
            );

            Ok(())
        })?;

        debug!("Uploaded texture {}x{}", data.width, data.height);

        Ok(Self { image })
    }

    #[inline]
    pub fn image_view(&self) -> vk::ImageView {
        self.image.image_view()
    }

    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.image.extent()
    }
}
