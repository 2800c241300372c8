//! Per-frame context handed to the application's render function.

use ash::vk;

/// The open frame: its command buffer and indices.
pub struct FrameContext {
    /// Command buffer the render pass is being recorded into.
    pub command_buffer: vk::CommandBuffer,
    /// Index of the acquired swapchain image.
    pub image_index: u32,
    /// Frame slot in `[0, MAX_FRAMES_IN_FLIGHT)`.
    pub frame_slot: usize,
    /// Delta time since last frame in seconds.
    pub dt: f32,
    /// Total frames rendered before this one.
    pub frame_number: u64,
}
