//! `Application` trait definition.

use winit::event::WindowEvent;

use crate::context::EngineContext;
use crate::frame::FrameContext;

/// Trait an Arclight application implements.
///
/// The framework owns the window, renderer, input, and event bus; the
/// application supplies the four lifecycle functions.
pub trait Application: Sized {
    /// Called once after every engine subsystem is up.
    fn init(ctx: &mut EngineContext) -> anyhow::Result<Self>;

    /// Called every frame before rendering, with the delta time in
    /// seconds. An error aborts the run loop.
    fn update(&mut self, ctx: &mut EngineContext, dt: f32) -> anyhow::Result<()>;

    /// Called every frame between `begin_frame` and `end_frame`, with the
    /// open frame's command buffer available through `frame`. Skipped when
    /// the frame was dropped on acquire.
    fn render(&mut self, ctx: &mut EngineContext, frame: &FrameContext) -> anyhow::Result<()>;

    /// Called for each window event before the engine processes it.
    /// Return `true` to consume the event.
    #[allow(unused_variables)]
    fn on_event(&mut self, event: &WindowEvent) -> bool {
        false
    }

    /// Called once before the engine tears down. The device is idle when
    /// this runs.
    #[allow(unused_variables)]
    fn terminate(&mut self, ctx: &mut EngineContext) {}
}
