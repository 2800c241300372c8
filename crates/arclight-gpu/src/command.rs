//! Command pool and buffer management.

use ash::vk;

use crate::error::Result;

/// Command pool bound to one queue family.
///
/// Buffers allocated from the pool are freed with it on drop.
pub struct CommandPool {
    device: ash::Device,
    pool: vk::CommandPool,
    queue_family: u32,
}

impl CommandPool {
    /// Create a pool for `queue_family`.
    pub fn new(
        device: &ash::Device,
        queue_family: u32,
        flags: vk::CommandPoolCreateFlags,
    ) -> Result<Self> {
        let create_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(queue_family)
            .flags(flags);

        // SAFETY: The device is valid and the family was requested at
        // device creation.
        let pool = unsafe { device.create_command_pool(&create_info, None) }?;

        Ok(Self {
            device: device.clone(),
            pool,
            queue_family,
        })
    }

    /// The raw pool handle.
    pub fn handle(&self) -> vk::CommandPool {
        self.pool
    }

    /// The queue family the pool records for.
    pub fn queue_family(&self) -> u32 {
        self.queue_family
    }

    /// Allocate `count` primary command buffers.
    pub fn allocate_buffers(&self, count: u32) -> Result<Vec<vk::CommandBuffer>> {
        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(self.pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count);

        // SAFETY: The pool is valid while self exists.
        let buffers = unsafe { self.device.allocate_command_buffers(&alloc_info) }?;
        Ok(buffers)
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        // SAFETY: The renderer waits for device idle before teardown.
        unsafe {
            self.device.destroy_command_pool(self.pool, None);
        }
    }
}
