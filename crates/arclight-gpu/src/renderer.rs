//! The renderer context and per-frame executor.

use std::path::PathBuf;

use arclight_core::MemoryTracker;
use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::command::CommandPool;
use crate::device::{select_physical_device, DeviceContext, SwapchainSupport};
use crate::error::{GpuError, Result};
use crate::frame::{FrameCycle, MAX_FRAMES_IN_FLIGHT};
use crate::instance::InstanceContext;
use crate::pipeline::PipelineBundle;
use crate::surface::SurfaceContext;
use crate::swapchain::SwapchainBundle;
use crate::sync::FrameSync;

/// Renderer configuration, fixed at initialization.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Application name reported to the driver.
    pub app_name: String,
    /// Application version, packed with `vk::make_api_version`.
    pub app_version: u32,
    /// Path to the compiled vertex shader.
    pub vertex_shader: PathBuf,
    /// Path to the compiled fragment shader.
    pub fragment_shader: PathBuf,
    /// RGBA clear color for the color attachment.
    pub clear_color: [f32; 4],
    /// Enable the validation layer and debug messenger when present.
    pub debug_layers: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            app_name: "Arclight application".to_string(),
            app_version: vk::make_api_version(0, 0, 1, 0),
            vertex_shader: PathBuf::from("shaders/triangle.vert.spv"),
            fragment_shader: PathBuf::from("shaders/triangle.frag.spv"),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            debug_layers: cfg!(debug_assertions),
        }
    }
}

/// The renderer: owns every Vulkan object and drives the frame cycle.
///
/// Construction runs the whole init sequence; a failure at any step unwinds
/// the objects created before it. A `Renderer` value therefore always holds
/// a fully initialized stack, and teardown happens on drop after a
/// device-idle wait.
///
/// Fields are declared in teardown order: per-frame objects first, then the
/// pipeline, swapchain, device, surface, and instance last.
pub struct Renderer {
    cycle: FrameCycle,
    clear_color: [f32; 4],
    frames: Vec<FrameSync>,
    graphics_buffers: Vec<vk::CommandBuffer>,
    transfer_buffers: Vec<vk::CommandBuffer>,
    compute_buffers: Vec<vk::CommandBuffer>,
    graphics_pool: CommandPool,
    transfer_pool: CommandPool,
    compute_pool: CommandPool,
    pipeline: PipelineBundle,
    swapchain: SwapchainBundle,
    device: DeviceContext,
    surface: SurfaceContext,
    instance: InstanceContext,
}

impl Renderer {
    /// Run the full init sequence against `window`.
    ///
    /// Order: instance -> surface -> device selection -> logical device ->
    /// swapchain and views -> render pass and pipeline -> framebuffers ->
    /// command pools and buffers -> frame sync objects.
    pub fn new<W>(window: &W, config: &RendererConfig, memory: &MemoryTracker) -> Result<Self>
    where
        W: HasDisplayHandle + HasWindowHandle,
    {
        let surface_extensions = arclight_platform::required_surface_extensions(window)
            .map_err(|e| GpuError::SurfaceCreation(e.to_string()))?;

        let instance = InstanceContext::new(
            &config.app_name,
            config.app_version,
            config.debug_layers,
            surface_extensions,
            memory,
        )?;

        let surface = SurfaceContext::new(&instance, window)?;

        // SAFETY: Instance and surface were created above.
        let selected = unsafe { select_physical_device(instance.instance(), &surface) }?;
        let roles = selected.roles;

        // SAFETY: The selection came from this instance.
        let device = unsafe { DeviceContext::new(instance.instance(), &selected) }?;

        // Support is re-queried at creation time; the selection-time report
        // may be stale by now.
        let support = SwapchainSupport::query(&surface, device.physical_device())?;
        let mut swapchain =
            SwapchainBundle::new(instance.instance(), &device, &surface, &support, &roles)?;

        let pipeline = PipelineBundle::new(
            device.device(),
            swapchain.format,
            &config.vertex_shader,
            &config.fragment_shader,
        )?;

        swapchain.create_framebuffers(pipeline.render_pass)?;

        let graphics_pool = CommandPool::new(
            device.device(),
            device.graphics_family(),
            vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER,
        )?;
        let transfer_pool = CommandPool::new(
            device.device(),
            device.transfer_family(),
            vk::CommandPoolCreateFlags::TRANSIENT,
        )?;
        let compute_pool = CommandPool::new(
            device.device(),
            device.compute_family(),
            vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER,
        )?;

        // One graphics buffer per frame slot; transfer and compute keep a
        // single buffer each for future upload and dispatch work. Present
        // records nothing and owns no pool.
        let graphics_buffers = graphics_pool.allocate_buffers(MAX_FRAMES_IN_FLIGHT as u32)?;
        let transfer_buffers = transfer_pool.allocate_buffers(1)?;
        let compute_buffers = compute_pool.allocate_buffers(1)?;

        let mut frames = Vec::with_capacity(MAX_FRAMES_IN_FLIGHT);
        for _ in 0..MAX_FRAMES_IN_FLIGHT {
            frames.push(FrameSync::new(device.device())?);
        }

        tracing::info!("Renderer initialized");

        Ok(Self {
            cycle: FrameCycle::new(MAX_FRAMES_IN_FLIGHT),
            clear_color: config.clear_color,
            frames,
            graphics_buffers,
            transfer_buffers,
            compute_buffers,
            graphics_pool,
            transfer_pool,
            compute_pool,
            pipeline,
            swapchain,
            device,
            surface,
            instance,
        })
    }

    /// Open a frame: wait for the slot, acquire an image, begin recording.
    ///
    /// Returns `Ok(false)` when the swapchain reported out-of-date and the
    /// frame was dropped before any recording; the caller skips rendering
    /// and must not call [`end_frame`](Self::end_frame) for this frame.
    pub fn begin_frame(&mut self) -> Result<bool> {
        if self.cycle.recording_image().is_some() {
            return Err(GpuError::InvalidState(
                "begin_frame called while a frame is already being recorded".into(),
            ));
        }

        let slot = self.cycle.slot();
        let frame = &self.frames[slot];

        // Backpressure: the slot's previous submission must finish before
        // its command buffer is touched again.
        frame.wait()?;

        let (image_index, _suboptimal) =
            match self.swapchain.acquire_next_image(frame.image_available) {
                Ok(acquired) => acquired,
                Err(GpuError::SwapchainOutOfDate) => {
                    tracing::warn!(
                        "Swapchain out of date on acquire; frame dropped (recreation deferred)"
                    );
                    return Ok(false);
                }
                Err(e) => return Err(e),
            };

        // Only reset once work is certain to be submitted this frame;
        // otherwise the next wait on this slot would deadlock.
        frame.reset_fence()?;

        let device = self.device.device();
        let cmd = self.graphics_buffers[slot];
        let extent = self.swapchain.extent;

        // SAFETY: The fence wait above guarantees the buffer is not in use;
        // all referenced objects are owned by self.
        unsafe {
            device.reset_command_buffer(cmd, vk::CommandBufferResetFlags::empty())?;

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            device.begin_command_buffer(cmd, &begin_info)?;

            let clear_values = [vk::ClearValue {
                color: vk::ClearColorValue {
                    float32: self.clear_color,
                },
            }];
            // The framebuffer is indexed by the acquired image, not the
            // frame slot.
            let render_pass_info = vk::RenderPassBeginInfo::default()
                .render_pass(self.pipeline.render_pass)
                .framebuffer(self.swapchain.framebuffers[image_index as usize])
                .render_area(vk::Rect2D {
                    offset: vk::Offset2D::default(),
                    extent,
                })
                .clear_values(&clear_values);
            device.cmd_begin_render_pass(cmd, &render_pass_info, vk::SubpassContents::INLINE);

            device.cmd_bind_pipeline(cmd, vk::PipelineBindPoint::GRAPHICS, self.pipeline.pipeline);

            let viewport = vk::Viewport {
                x: 0.0,
                y: 0.0,
                width: extent.width as f32,
                height: extent.height as f32,
                min_depth: 0.0,
                max_depth: 1.0,
            };
            device.cmd_set_viewport(cmd, 0, &[viewport]);

            let scissor = vk::Rect2D {
                offset: vk::Offset2D::default(),
                extent,
            };
            device.cmd_set_scissor(cmd, 0, &[scissor]);
        }

        self.cycle.begin(image_index)?;
        Ok(true)
    }

    /// Close the frame: end recording, submit, present, advance the slot.
    pub fn end_frame(&mut self) -> Result<()> {
        let slot = self.cycle.slot();
        let Some(image_index) = self.cycle.recording_image() else {
            return Err(GpuError::InvalidState(
                "end_frame called without a frame being recorded".into(),
            ));
        };

        let frame = &self.frames[slot];
        let cmd = self.graphics_buffers[slot];
        let device = self.device.device();

        // SAFETY: A frame is open on this buffer; all referenced objects
        // are owned by self.
        unsafe {
            device.cmd_end_render_pass(cmd);
            device.end_command_buffer(cmd)?;

            let wait_semaphores = [frame.image_available];
            let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
            let command_buffers = [cmd];
            let signal_semaphores = [frame.render_finished];

            let submit_info = vk::SubmitInfo::default()
                .wait_semaphores(&wait_semaphores)
                .wait_dst_stage_mask(&wait_stages)
                .command_buffers(&command_buffers)
                .signal_semaphores(&signal_semaphores);

            device.queue_submit(
                self.device.graphics_queue(),
                &[submit_info],
                frame.in_flight,
            )?;
        }

        let needs_recreation =
            self.swapchain
                .present(self.device.present_queue(), image_index, frame.render_finished)?;
        if needs_recreation {
            tracing::warn!(
                "Swapchain suboptimal or out of date on present; recreation deferred"
            );
        }

        self.cycle.end()?;
        Ok(())
    }

    /// Block until the device finishes all submitted work. Used at
    /// shutdown before resources are torn down.
    pub fn wait_idle(&self) -> Result<()> {
        self.device.wait_idle()
    }

    /// The swapchain extent.
    #[must_use]
    pub fn extent(&self) -> vk::Extent2D {
        self.swapchain.extent
    }

    /// Number of swapchain images.
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.swapchain.image_count()
    }

    /// The current frame slot in `[0, MAX_FRAMES_IN_FLIGHT)`.
    #[must_use]
    pub fn frame_slot(&self) -> usize {
        self.cycle.slot()
    }

    /// The acquired image index of the open frame, if one is recording.
    #[must_use]
    pub fn recording_image(&self) -> Option<u32> {
        self.cycle.recording_image()
    }

    /// The graphics command buffer for the current slot.
    #[must_use]
    pub fn graphics_command_buffer(&self) -> vk::CommandBuffer {
        self.graphics_buffers[self.cycle.slot()]
    }

    /// The transfer command buffer.
    #[must_use]
    pub fn transfer_command_buffer(&self) -> vk::CommandBuffer {
        self.transfer_buffers[0]
    }

    /// The compute command buffer.
    #[must_use]
    pub fn compute_command_buffer(&self) -> vk::CommandBuffer {
        self.compute_buffers[0]
    }

    /// The graphics command pool.
    #[must_use]
    pub fn graphics_pool(&self) -> &CommandPool {
        &self.graphics_pool
    }

    /// The transfer command pool.
    #[must_use]
    pub fn transfer_pool(&self) -> &CommandPool {
        &self.transfer_pool
    }

    /// The compute command pool.
    #[must_use]
    pub fn compute_pool(&self) -> &CommandPool {
        &self.compute_pool
    }

    /// The device context.
    #[must_use]
    pub fn device(&self) -> &DeviceContext {
        &self.device
    }

    /// The surface context.
    #[must_use]
    pub fn surface(&self) -> &SurfaceContext {
        &self.surface
    }

    /// The instance context.
    #[must_use]
    pub fn instance(&self) -> &InstanceContext {
        &self.instance
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if let Err(e) = self.device.wait_idle() {
            tracing::error!("Device wait failed during renderer teardown: {e}");
        }
        tracing::info!("Renderer terminated");
        // Fields drop in declaration order: frame sync and command objects,
        // pipeline, swapchain, device, surface, instance.
    }
}
