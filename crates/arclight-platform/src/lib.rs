//! Platform abstraction for the Arclight engine.
//!
//! Window creation via winit, plus the two calls the renderer consumes from
//! the platform layer: the surface extensions the running windowing system
//! requires, and native surface creation for a window.

use std::ffi::c_char;

use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use thiserror::Error;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Window creation failed: {0}")]
    WindowCreation(String),
    #[error("Window handle unavailable: {0}")]
    WindowHandle(String),
    #[error("Surface creation failed: {0}")]
    SurfaceCreation(String),
}

pub type Result<T> = std::result::Result<T, PlatformError>;

/// Platform configuration.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "Arclight".to_string(),
            width: 1280,
            height: 720,
            resizable: true,
        }
    }
}

/// Create the main window on the running event loop.
pub fn create_window(event_loop: &ActiveEventLoop, config: &PlatformConfig) -> Result<Window> {
    let attributes = Window::default_attributes()
        .with_title(&config.title)
        .with_inner_size(PhysicalSize::new(config.width, config.height))
        .with_resizable(config.resizable);

    let window = event_loop
        .create_window(attributes)
        .map_err(|e| PlatformError::WindowCreation(e.to_string()))?;

    tracing::info!(
        "Window created: \"{}\" {}x{}",
        config.title,
        config.width,
        config.height
    );
    Ok(window)
}

/// Instance extensions the running windowing system requires for surfaces.
pub fn required_surface_extensions<W>(window: &W) -> Result<&'static [*const c_char]>
where
    W: HasDisplayHandle,
{
    let display = window
        .display_handle()
        .map_err(|e| PlatformError::WindowHandle(e.to_string()))?;

    ash_window::enumerate_required_extensions(display.as_raw())
        .map_err(|e| PlatformError::SurfaceCreation(e.to_string()))
}

/// Create a native rendering surface for `window`.
///
/// # Safety
/// The instance must be valid and must have been created with the extensions
/// reported by [`required_surface_extensions`].
pub unsafe fn create_surface<W>(
    entry: &ash::Entry,
    instance: &ash::Instance,
    window: &W,
) -> Result<vk::SurfaceKHR>
where
    W: HasDisplayHandle + HasWindowHandle,
{
    let display = window
        .display_handle()
        .map_err(|e| PlatformError::WindowHandle(e.to_string()))?;
    let window_handle = window
        .window_handle()
        .map_err(|e| PlatformError::WindowHandle(e.to_string()))?;

    // SAFETY: Caller guarantees instance validity; the handles come from a
    // live window.
    unsafe {
        ash_window::create_surface(
            entry,
            instance,
            display.as_raw(),
            window_handle.as_raw(),
            None,
        )
    }
    .map_err(|e| PlatformError::SurfaceCreation(e.to_string()))
}
