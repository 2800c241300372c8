//! Sandbox: the smallest useful Arclight application.
//!
//! Opens a window, clears it to a dark teal, and exits on Escape. The
//! shader binaries are compiled from the GLSL sources in `shaders/`:
//!
//! ```sh
//! glslc shaders/triangle.vert -o shaders/triangle.vert.spv
//! glslc shaders/triangle.frag -o shaders/triangle.frag.spv
//! ```

use arclight_app::{run, Application, EngineConfig, EngineContext, FrameContext, KeyCode};
use arclight_core::{MemoryTag, TrackedArray};
use tracing::info;

struct Sandbox {
    // Scratch kept around to watch the tagged accounting move.
    frame_times: TrackedArray<f32>,
}

impl Application for Sandbox {
    fn init(ctx: &mut EngineContext) -> anyhow::Result<Self> {
        info!(
            "Sandbox up: {}x{}, {} swapchain images",
            ctx.width(),
            ctx.height(),
            ctx.renderer.image_count()
        );
        info!("{}", ctx.memory.usage_report());

        Ok(Self {
            frame_times: TrackedArray::with_capacity(&ctx.memory, MemoryTag::Game, 256),
        })
    }

    fn update(&mut self, ctx: &mut EngineContext, dt: f32) -> anyhow::Result<()> {
        if ctx.input.is_key_pressed(KeyCode::Escape) {
            info!("Escape pressed, quitting");
            ctx.request_quit();
        }

        if ctx.input.is_key_pressed(KeyCode::KeyM) {
            info!("{}", ctx.memory.usage_report());
        }

        self.frame_times.push(dt);
        if self.frame_times.len() == 256 {
            let average: f32 = self.frame_times.iter().sum::<f32>() / 256.0;
            info!("Average frame time: {:.2} ms", average * 1000.0);
            self.frame_times.clear();
        }

        Ok(())
    }

    fn render(&mut self, _ctx: &mut EngineContext, _frame: &FrameContext) -> anyhow::Result<()> {
        // The engine clears and presents; nothing to record yet.
        Ok(())
    }

    fn terminate(&mut self, ctx: &mut EngineContext) {
        info!("Sandbox shutting down after {} frames", ctx.frame_count);
    }
}

fn main() -> anyhow::Result<()> {
    run::<Sandbox>(
        EngineConfig::new("Arclight sandbox")
            .with_size(1280, 720)
            .with_version(0, 1, 0)
            .with_shaders("shaders/triangle.vert.spv", "shaders/triangle.frag.spv")
            .with_clear_color([0.05, 0.12, 0.14, 1.0]),
    )
}
