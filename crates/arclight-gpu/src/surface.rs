//! Surface binding for windowed rendering.

use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::error::{GpuError, Result};
use crate::instance::InstanceContext;

/// The platform surface and its extension loader.
///
/// Dropping destroys the surface; the owning renderer guarantees this
/// happens after every swapchain built on it is gone.
pub struct SurfaceContext {
    surface_loader: ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
}

impl SurfaceContext {
    /// Bind the instance to the window's native surface.
    pub fn new<W>(instance: &InstanceContext, window: &W) -> Result<Self>
    where
        W: HasDisplayHandle + HasWindowHandle,
    {
        // SAFETY: The instance was created with the extensions the platform
        // layer reported for this windowing system.
        let surface = unsafe {
            arclight_platform::create_surface(instance.entry(), instance.instance(), window)
        }
        .map_err(|e| GpuError::SurfaceCreation(e.to_string()))?;

        let surface_loader =
            ash::khr::surface::Instance::new(instance.entry(), instance.instance());

        tracing::trace!("Vulkan surface created");
        Ok(Self {
            surface_loader,
            surface,
        })
    }

    /// The surface handle.
    pub fn handle(&self) -> vk::SurfaceKHR {
        self.surface
    }

    /// The surface extension loader.
    pub fn loader(&self) -> &ash::khr::surface::Instance {
        &self.surface_loader
    }
}

impl Drop for SurfaceContext {
    fn drop(&mut self) {
        // SAFETY: The renderer drops swapchains before the surface.
        unsafe {
            self.surface_loader.destroy_surface(self.surface, None);
        }
        tracing::trace!("Vulkan surface destroyed");
    }
}
