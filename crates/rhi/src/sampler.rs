//! Texture samplers.

use std::sync::Arc;

use ash::vk;

use crate::device::Device;
use crate::error::RhiResult;

/// Sampler filtering mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// Blocky, keeps texel edges sharp
    #[default]
    Nearest,
    /// Bilinear filtering
    Linear,
}

impl FilterMode {
    pub fn to_vk_filter(self) -> vk::Filter {
        match self {
            FilterMode::Nearest => vk::Filter::NEAREST,
            FilterMode::Linear => vk::Filter::LINEAR,
        }
    }
}

/// VkSampler wrapper, destroyed on drop.
pub struct Sampler {
    device: Arc<Device>,
    sampler: vk::Sampler,
    filter: FilterMode,
}

impl Sampler {
    /// Creates a sampler with repeat addressing and no anisotropy.
    pub fn new(device: Arc<Device>, filter: FilterMode) -> RhiResult<Self> {
        let create_info = vk::SamplerCreateInfo::default()
            .mag_filter(filter.to_vk_filter())
            .min_filter(filter.to_vk_filter())
            .mipmap_mode(vk::SamplerMipmapMode::NEAREST)
            .address_mode_u(vk::SamplerAddressMode::REPEAT)
            .address_mode_v(vk::SamplerAddressMode::REPEAT)
            .address_mode_w(vk::SamplerAddressMode::REPEAT);

        let sampler = unsafe { device.handle().create_sampler(&create_info, None)? };

        Ok(Self {
            device,
            sampler,
            filter,
        })
    }

    #[inline]
    pub fn handle(&self) -> vk::Sampler {
        self.sampler
    }

    #[inline]
    pub fn filter(&self) -> FilterMode {
        self.filter
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_sampler(self.sampler, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_modes_map_to_vk() {
        assert_eq!(FilterMode::Nearest.to_vk_filter(), vk::Filter::NEAREST);
        assert_eq!(FilterMode::Linear.to_vk_filter(), vk::Filter::LINEAR);
    }

    #[test]
    fn default_filter_is_nearest() {
        assert_eq!(FilterMode::default(), FilterMode::Nearest);
    }
}
