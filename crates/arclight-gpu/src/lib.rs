//! Vulkan renderer for the Arclight engine.
//!
//! This crate provides:
//! - Instance and surface bootstrap with optional debug layers
//! - Physical device selection and queue-role resolution
//! - Swapchain, image-view, and framebuffer management
//! - Render pass and graphics pipeline construction
//! - The per-frame acquire/record/submit/present executor

pub mod command;
pub mod device;
pub mod error;
pub mod frame;
pub mod instance;
pub mod pipeline;
pub mod renderer;
pub mod surface;
pub mod swapchain;
pub mod sync;
pub mod vertex;

pub use device::{DeviceContext, QueueFamilyRoles, SwapchainSupport};
pub use error::{GpuError, Result};
pub use frame::{FrameCycle, FramePhase, MAX_FRAMES_IN_FLIGHT};
pub use instance::InstanceContext;
pub use renderer::{Renderer, RendererConfig};
pub use surface::SurfaceContext;
pub use swapchain::SwapchainBundle;
pub use vertex::Vertex;
