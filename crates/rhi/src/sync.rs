//! Synchronization primitives.
//!
//! - [`Semaphore`] - GPU-to-GPU ordering between queue operations
//! - [`Fence`] - GPU-to-CPU completion signalling
//!
//! The frame loop pairs one image-available and one render-finished
//! semaphore with one in-flight fence per frame slot; acquisition signals
//! the first, submission waits on it and signals the second plus the
//! fence, and presentation waits on the second.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::device::Device;
use crate::error::{RhiError, RhiResult};

/// Number of frame slots the CPU may be recording while the GPU renders.
///
/// Two slots: the CPU prepares frame N+1 while the GPU consumes frame N.
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

/// Bounded wait used for all per-frame fence and acquire waits. A GPU that
/// has not finished a frame after a full second is hung, not slow.
pub const FRAME_TIMEOUT_NS: u64 = 1_000_000_000;

/// Vulkan semaphore wrapper. Created unsignaled; destroyed on drop.
pub struct Semaphore {
    device: Arc<Device>,
    semaphore: vk::Semaphore,
}

impl Semaphore {
    pub fn new(device: Arc<Device>) -> RhiResult<Self> {
        let create_info = vk::SemaphoreCreateInfo::default();
        let semaphore = unsafe { device.handle().create_semaphore(&create_info, None)? };
        Ok(Self { device, semaphore })
    }

    #[inline]
    pub fn handle(&self) -> vk::Semaphore {
        self.semaphore
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_semaphore(self.semaphore, None);
        }
    }
}

/// Vulkan fence wrapper.
///
/// Used to gate frame-slot reuse (created signaled so the first frame does
/// not block) and to serialize one-shot uploads (created unsignaled).
pub struct Fence {
    device: Arc<Device>,
    fence: vk::Fence,
}

impl Fence {
    pub fn new(device: Arc<Device>, signaled: bool) -> RhiResult<Self> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };
        let create_info = vk::FenceCreateInfo::default().flags(flags);
        let fence = unsafe { device.handle().create_fence(&create_info, None)? };

        debug!(signaled, "created fence");

        Ok(Self { device, fence })
    }

    #[inline]
    pub fn handle(&self) -> vk::Fence {
        self.fence
    }

    /// Blocks until the fence signals or `timeout_ns` expires.
    ///
    /// Expiry surfaces as [`RhiError::Timeout`]; callers treat it as a hung
    /// GPU and never retry silently. `what` names the wait in the error.
    pub fn wait(&self, timeout_ns: u64, what: &'static str) -> RhiResult<()> {
        let fences = [self.fence];
        let result = unsafe {
            self.device
                .handle()
                .wait_for_fences(&fences, true, timeout_ns)
        };
        match result {
            Ok(()) => Ok(()),
            Err(vk::Result::TIMEOUT) => Err(RhiError::Timeout(what)),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the fence to the unsignaled state. The fence must not be
    /// pending on any queue.
    pub fn reset(&self) -> RhiResult<()> {
        let fences = [self.fence];
        unsafe { self.device.handle().reset_fences(&fences)? };
        Ok(())
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_fence(self.fence, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_frame_slots() {
        assert_eq!(MAX_FRAMES_IN_FLIGHT, 2);
    }

    #[test]
    fn frame_timeout_is_one_second() {
        assert_eq!(FRAME_TIMEOUT_NS, 1_000_000_000);
    }

    #[test]
    fn sync_objects_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Semaphore>();
        assert_send_sync::<Fence>();
    }
}
