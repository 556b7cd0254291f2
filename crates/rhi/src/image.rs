//! GPU image management.
//!
//! Wraps VkImage plus its view with gpu-allocator managed memory, in the
//! same shape as [`crate::buffer::Buffer`]. [`ImageUsage`] selects the
//! usage flags and view aspect: depth attachments are rendered into every
//! frame, textures are sampled after a one-time staging upload.

use std::sync::Arc;

use ash::vk;
use gpu_allocator::MemoryLocation;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use tracing::debug;

use crate::device::Device;
use crate::error::{RhiError, RhiResult};

/// Default depth format (32-bit float).
pub const DEFAULT_DEPTH_FORMAT: vk::Format = vk::Format::D32_SFLOAT;

/// Image usage type. Decides Vulkan usage flags and the view aspect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageUsage {
    /// Depth attachment, cleared and tested each frame
    DepthAttachment,
    /// Sampled texture, filled via staging copy
    Texture,
}

impl ImageUsage {
    pub fn to_vk_usage(self) -> vk::ImageUsageFlags {
        match self {
            ImageUsage::DepthAttachment => vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
            ImageUsage::Texture => {
                vk::ImageUsageFlags::SAMPLED
                    | vk::ImageUsageFlags::TRANSFER_DST
                    | vk::ImageUsageFlags::TRANSFER_SRC
            }
        }
    }

    pub fn aspect_mask(self) -> vk::ImageAspectFlags {
        match self {
            ImageUsage::DepthAttachment => vk::ImageAspectFlags::DEPTH,
            ImageUsage::Texture => vk::ImageAspectFlags::COLOR,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ImageUsage::DepthAttachment => "depth",
            ImageUsage::Texture => "texture",
        }
    }
}

/// 2D GPU image with its view and gpu-allocator managed memory.
///
/// Resources are released on drop: view first, then image, then the
/// allocation.
pub struct Image {
    device: Arc<Device>,
    image: vk::Image,
    image_view: vk::ImageView,
    allocation: Option<Allocation>,
    format: vk::Format,
    extent: vk::Extent2D,
    usage: ImageUsage,
}

impl Image {
    /// Creates an image in device-local memory with optimal tiling.
    pub fn new(
        device: Arc<Device>,
        usage: ImageUsage,
        format: vk::Format,
        width: u32,
        height: u32,
    ) -> RhiResult<Self> {
        if width == 0 || height == 0 {
            return Err(RhiError::InvalidHandle(
                "Image dimensions must be greater than 0".to_string(),
            ));
        }

        let extent = vk::Extent2D { width, height };

        let image_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .format(format)
            .extent(vk::Extent3D {
                width,
                height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(usage.to_vk_usage())
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        let image = unsafe { device.handle().create_image(&image_info, None)? };

        let requirements = unsafe { device.handle().get_image_memory_requirements(image) };

        let allocation = {
            let mut allocator = device.allocator().lock().unwrap();
            allocator.allocate(&AllocationCreateDesc {
                name: usage.name(),
                requirements,
                location: MemoryLocation::GpuOnly,
                // Optimal tiling is not linear
                linear: false,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })?
        };

        unsafe {
            device
                .handle()
                .bind_image_memory(image, allocation.memory(), allocation.offset())?;
        }

        let view_info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .subresource_range(
                vk::ImageSubresourceRange::default()
                    .aspect_mask(usage.aspect_mask())
                    .base_mip_level(0)
                    .level_count(1)
                    .base_array_layer(0)
                    .layer_count(1),
            );

        let image_view = unsafe { device.handle().create_image_view(&view_info, None)? };

        debug!(
            "Created {} image: {}x{} ({:?})",
            usage.name(),
            width,
            height,
            format
        );

        Ok(Self {
            device,
            image,
            image_view,
            allocation: Some(allocation),
            format,
            extent,
            usage,
        })
    }

    /// Depth attachment with the default D32_SFLOAT format.
    pub fn new_depth(device: Arc<Device>, width: u32, height: u32) -> RhiResult<Self> {
        Self::new(
            device,
            ImageUsage::DepthAttachment,
            DEFAULT_DEPTH_FORMAT,
            width,
            height,
        )
    }

    #[inline]
    pub fn handle(&self) -> vk::Image {
        self.image
    }

    #[inline]
    pub fn image_view(&self) -> vk::ImageView {
        self.image_view
    }

    #[inline]
    pub fn format(&self) -> vk::Format {
        self.format
    }

    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    #[inline]
    pub fn usage(&self) -> ImageUsage {
        self.usage
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        unsafe {
            self.device
                .handle()
                .destroy_image_view(self.image_view, None);
            self.device.handle().destroy_image(self.image, None);
        }

        if let Some(allocation) = self.allocation.take() {
            let mut allocator = self.device.allocator().lock().unwrap();
            if let Err(e) = allocator.free(allocation) {
                tracing::error!("Failed to free {} image allocation: {:?}", self.usage.name(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_images_are_render_targets() {
        let usage = ImageUsage::DepthAttachment;
        assert_eq!(
            usage.to_vk_usage(),
            vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT
        );
        assert_eq!(usage.aspect_mask(), vk::ImageAspectFlags::DEPTH);
    }

    #[test]
    fn textures_accept_staging_copies() {
        let usage = ImageUsage::Texture;
        assert!(usage.to_vk_usage().contains(vk::ImageUsageFlags::SAMPLED));
        assert!(
            usage
                .to_vk_usage()
                .contains(vk::ImageUsageFlags::TRANSFER_DST)
        );
        assert_eq!(usage.aspect_mask(), vk::ImageAspectFlags::COLOR);
    }

    #[test]
    fn textures_can_source_a_readback_copy() {
        assert!(
            ImageUsage::Texture
                .to_vk_usage()
                .contains(vk::ImageUsageFlags::TRANSFER_SRC)
        );
    }

    #[test]
    fn default_depth_format_is_d32() {
        assert_eq!(DEFAULT_DEPTH_FORMAT, vk::Format::D32_SFLOAT);
    }
}
