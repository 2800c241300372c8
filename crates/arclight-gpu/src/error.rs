//! Renderer error types.

use std::path::PathBuf;

use ash::vk;
use thiserror::Error;

/// Renderer errors.
///
/// Every step of the init sequence has its own variant so a failed init
/// reports exactly which stage gave out. `SwapchainOutOfDate` is the one
/// recoverable per-frame condition; it is surfaced as a dropped frame.
#[derive(Error, Debug)]
pub enum GpuError {
    /// Vulkan error outside a dedicated creation step.
    #[error("Vulkan error: {0}")]
    Vulkan(#[from] vk::Result),

    /// Instance creation failed.
    #[error("Instance creation failed: {0}")]
    InstanceCreation(vk::Result),

    /// Surface creation failed.
    #[error("Surface creation failed: {0}")]
    SurfaceCreation(String),

    /// No physical device passed the suitability gate.
    #[error("No suitable GPU found")]
    NoSuitableDevice,

    /// Logical device creation failed.
    #[error("Device creation failed: {0}")]
    DeviceCreation(vk::Result),

    /// Swapchain creation failed.
    #[error("Swapchain creation failed: {0}")]
    SwapchainCreation(vk::Result),

    /// Image view creation failed.
    #[error("Image view creation failed: {0}")]
    ImageViewCreation(vk::Result),

    /// Framebuffer creation failed.
    #[error("Framebuffer creation failed: {0}")]
    FramebufferCreation(vk::Result),

    /// Render pass creation failed.
    #[error("Render pass creation failed: {0}")]
    RenderPassCreation(vk::Result),

    /// Pipeline layout creation failed.
    #[error("Pipeline layout creation failed: {0}")]
    PipelineLayoutCreation(vk::Result),

    /// A shader binary could not be read.
    #[error("Failed to load shader {}: {source}", path.display())]
    ShaderLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Graphics pipeline creation failed.
    #[error("Pipeline creation failed: {0}")]
    PipelineCreation(vk::Result),

    /// The swapchain no longer matches the surface; the frame was dropped.
    #[error("Swapchain is out of date")]
    SwapchainOutOfDate,

    /// An operation was issued in the wrong frame phase.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, GpuError>;
