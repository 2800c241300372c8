//! CPU/GPU synchronization primitives.

use ash::vk;

use crate::error::Result;

/// Create a binary semaphore.
pub fn create_semaphore(device: &ash::Device) -> Result<vk::Semaphore> {
    let create_info = vk::SemaphoreCreateInfo::default();
    // SAFETY: The device is valid.
    let semaphore = unsafe { device.create_semaphore(&create_info, None) }?;
    Ok(semaphore)
}

/// Create a fence, optionally already signaled.
pub fn create_fence(device: &ash::Device, signaled: bool) -> Result<vk::Fence> {
    let flags = if signaled {
        vk::FenceCreateFlags::SIGNALED
    } else {
        vk::FenceCreateFlags::empty()
    };

    let create_info = vk::FenceCreateInfo::default().flags(flags);
    // SAFETY: The device is valid.
    let fence = unsafe { device.create_fence(&create_info, None) }?;
    Ok(fence)
}

/// Synchronization objects owned by one frame-in-flight slot.
///
/// The fence starts signaled so the first frame through the slot does not
/// wait on work that was never submitted.
pub struct FrameSync {
    device: ash::Device,
    /// Signaled when the acquired swapchain image is ready to be written.
    pub image_available: vk::Semaphore,
    /// Signaled when rendering finishes; present waits on it.
    pub render_finished: vk::Semaphore,
    /// Signaled when the slot's submitted work completes on the GPU.
    pub in_flight: vk::Fence,
}

impl FrameSync {
    /// Create the slot's semaphores and fence.
    pub fn new(device: &ash::Device) -> Result<Self> {
        // Null handles let a failed later step drop the struct and release
        // the earlier ones.
        let mut sync = Self {
            device: device.clone(),
            image_available: vk::Semaphore::null(),
            render_finished: vk::Semaphore::null(),
            in_flight: vk::Fence::null(),
        };

        sync.image_available = create_semaphore(device)?;
        sync.render_finished = create_semaphore(device)?;
        sync.in_flight = create_fence(device, true)?;
        Ok(sync)
    }

    /// Block until the slot's outstanding work signals the fence.
    pub fn wait(&self) -> Result<()> {
        // SAFETY: The fence is valid while self exists.
        unsafe {
            self.device
                .wait_for_fences(&[self.in_flight], true, u64::MAX)?;
        }
        Ok(())
    }

    /// Reset the fence for the next submission.
    pub fn reset_fence(&self) -> Result<()> {
        // SAFETY: The fence is valid while self exists.
        unsafe {
            self.device.reset_fences(&[self.in_flight])?;
        }
        Ok(())
    }
}

impl Drop for FrameSync {
    fn drop(&mut self) {
        // SAFETY: The renderer waits for device idle before teardown;
        // destroying null handles is a no-op.
        unsafe {
            self.device.destroy_semaphore(self.image_available, None);
            self.device.destroy_semaphore(self.render_finished, None);
            self.device.destroy_fence(self.in_flight, None);
        }
    }
}
