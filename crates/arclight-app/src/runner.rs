//! Engine runner and event loop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use arclight_core::MemoryTracker;
use arclight_events::Event;
use arclight_gpu::{Renderer, RendererConfig};
use arclight_platform::PlatformConfig;
use ash::vk;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

use crate::app::Application;
use crate::context::EngineContext;
use crate::frame::FrameContext;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Window and application title.
    pub title: String,
    /// Initial window width.
    pub width: u32,
    /// Initial window height.
    pub height: u32,
    /// Whether the window may be resized.
    pub resizable: bool,
    /// Application version as (major, minor, patch).
    pub version: (u32, u32, u32),
    /// Path to the compiled vertex shader.
    pub vertex_shader: PathBuf,
    /// Path to the compiled fragment shader.
    pub fragment_shader: PathBuf,
    /// RGBA clear color.
    pub clear_color: [f32; 4],
    /// Enable Vulkan debug layers (default: debug builds only).
    pub debug_layers: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "Arclight application".to_string(),
            width: 1280,
            height: 720,
            resizable: true,
            version: (0, 1, 0),
            vertex_shader: PathBuf::from("shaders/triangle.vert.spv"),
            fragment_shader: PathBuf::from("shaders/triangle.frag.spv"),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            debug_layers: cfg!(debug_assertions),
        }
    }
}

impl EngineConfig {
    /// Create a config with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the window dimensions.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the application version.
    #[must_use]
    pub fn with_version(mut self, major: u32, minor: u32, patch: u32) -> Self {
        self.version = (major, minor, patch);
        self
    }

    /// Set the shader binary paths.
    #[must_use]
    pub fn with_shaders(
        mut self,
        vertex: impl Into<PathBuf>,
        fragment: impl Into<PathBuf>,
    ) -> Self {
        self.vertex_shader = vertex.into();
        self.fragment_shader = fragment.into();
        self
    }

    /// Set the clear color.
    #[must_use]
    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    /// Enable or disable debug layers.
    #[must_use]
    pub fn with_debug_layers(mut self, enabled: bool) -> Self {
        self.debug_layers = enabled;
        self
    }
}

/// Run an application with the given configuration.
///
/// Initializes logging, creates the window and renderer, and drives the
/// event loop until the application exits.
pub fn run<A: Application + 'static>(config: EngineConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("{} starting...", config.title);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut runner = EngineRunner::<A> {
        config,
        state: None,
    };

    if let Err(e) = event_loop.run_app(&mut runner) {
        error!("Event loop error: {e}");
    }

    Ok(())
}

struct EngineRunner<A: Application> {
    config: EngineConfig,
    state: Option<EngineState<A>>,
}

struct EngineState<A: Application> {
    ctx: EngineContext,
    app: A,
}

impl<A: Application + 'static> ApplicationHandler for EngineRunner<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        match self.create_state(event_loop) {
            Ok(state) => {
                info!("Engine ready");
                self.state = Some(state);
            }
            Err(e) => {
                error!("Failed to initialize engine: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        // The application sees the raw event first.
        if state.app.on_event(&event) {
            return;
        }

        // Input events update the polling state and land on the bus.
        state.ctx.input.process_window_event(&event, &mut state.ctx.events);

        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested");
                state.ctx.events.publish(&Event::Quit);
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(size) => {
                // Swapchain recreation is a deferred capability; frames are
                // dropped when the surface no longer matches.
                warn!(
                    "Window resized to {}x{}; swapchain recreation is not implemented",
                    size.width, size.height
                );
                state.ctx.events.publish(&Event::WindowResized {
                    width: size.width,
                    height: size.height,
                });
            }
            WindowEvent::RedrawRequested => {
                let result = state.frame();
                let quit = state.ctx.quit_requested();
                match result {
                    Err(e) => {
                        error!("Frame error: {e}");
                        self.shutdown(event_loop);
                    }
                    Ok(()) if quit => self.shutdown(event_loop),
                    Ok(()) => state.ctx.window.request_redraw(),
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.ctx.window.request_redraw();
        }
    }
}

impl<A: Application + 'static> EngineRunner<A> {
    fn create_state(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<EngineState<A>> {
        let platform_config = PlatformConfig {
            title: self.config.title.clone(),
            width: self.config.width,
            height: self.config.height,
            resizable: self.config.resizable,
        };
        let window = Arc::new(arclight_platform::create_window(event_loop, &platform_config)?);

        let memory = MemoryTracker::new();

        let (major, minor, patch) = self.config.version;
        let renderer_config = RendererConfig {
            app_name: self.config.title.clone(),
            app_version: vk::make_api_version(0, major, minor, patch),
            vertex_shader: self.config.vertex_shader.clone(),
            fragment_shader: self.config.fragment_shader.clone(),
            clear_color: self.config.clear_color,
            debug_layers: self.config.debug_layers,
        };
        let renderer = Renderer::new(window.as_ref(), &renderer_config, &memory)?;

        let mut ctx = EngineContext::new(window, renderer, memory);
        let app = A::init(&mut ctx)?;

        Ok(EngineState { ctx, app })
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut state) = self.state.take() {
            if let Err(e) = state.ctx.renderer.wait_idle() {
                error!("Failed to wait for device idle: {e}");
            }
            state.app.terminate(&mut state.ctx);
            info!("Application terminated");
            // EngineContext drops here; the renderer tears down last-in
            // first-out after another idle wait.
        }
        event_loop.exit();
    }
}

impl<A: Application> EngineState<A> {
    fn frame(&mut self) -> anyhow::Result<()> {
        let now = Instant::now();
        let dt = now.duration_since(self.ctx.last_frame_time).as_secs_f32();
        self.ctx.last_frame_time = now;

        self.app.update(&mut self.ctx, dt)?;

        // A dropped frame (out-of-date swapchain) skips rendering but still
        // finishes the frame's input bookkeeping.
        if self.ctx.renderer.begin_frame()? {
            let frame = FrameContext {
                command_buffer: self.ctx.renderer.graphics_command_buffer(),
                image_index: self
                    .ctx
                    .renderer
                    .recording_image()
                    .expect("a frame is open after begin_frame"),
                frame_slot: self.ctx.renderer.frame_slot(),
                dt,
                frame_number: self.ctx.frame_count,
            };

            self.app.render(&mut self.ctx, &frame)?;
            self.ctx.renderer.end_frame()?;
        }

        self.ctx.input.end_frame();
        self.ctx.frame_count += 1;
        Ok(())
    }
}
