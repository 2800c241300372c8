//! Engine context shared across all application methods.

use std::sync::Arc;
use std::time::Instant;

use arclight_core::MemoryTracker;
use arclight_events::EventBus;
use arclight_gpu::Renderer;
use arclight_input::InputManager;
use ash::vk;
use winit::window::Window;

/// Everything an application reaches for at runtime: the window, the
/// renderer, input state, the event bus, and the memory tracker.
pub struct EngineContext {
    /// The window handle.
    pub window: Arc<Window>,
    /// The Vulkan renderer.
    pub renderer: Renderer,
    /// Keyboard and mouse state.
    pub input: InputManager,
    /// The engine event bus.
    pub events: EventBus,
    /// Tagged memory accounting.
    pub memory: MemoryTracker,
    /// Total frames rendered.
    pub frame_count: u64,
    pub(crate) last_frame_time: Instant,
    pub(crate) quit_requested: bool,
}

impl EngineContext {
    pub(crate) fn new(
        window: Arc<Window>,
        renderer: Renderer,
        memory: MemoryTracker,
    ) -> Self {
        Self {
            window,
            renderer,
            input: InputManager::new(),
            events: EventBus::new(),
            memory,
            frame_count: 0,
            last_frame_time: Instant::now(),
            quit_requested: false,
        }
    }

    /// Ask the runner to exit after the current frame.
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    /// Returns `true` once a quit has been requested.
    #[must_use]
    pub const fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// The current swapchain extent.
    #[must_use]
    pub fn extent(&self) -> vk::Extent2D {
        self.renderer.extent()
    }

    /// The swapchain width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.renderer.extent().width
    }

    /// The swapchain height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.renderer.extent().height
    }

    /// Width over height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        let extent = self.renderer.extent();
        extent.width as f32 / extent.height as f32
    }
}
