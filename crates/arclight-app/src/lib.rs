//! Application framework for the Arclight engine.
//!
//! This crate wires the engine subsystems together and handles the
//! boilerplate an application would otherwise repeat:
//! - Window creation and the event loop
//! - Renderer initialization
//! - Input state and event-bus plumbing
//! - The per-frame update/render cycle
//!
//! # Example
//!
//! ```no_run
//! use arclight_app::{run, Application, EngineConfig, EngineContext, FrameContext};
//!
//! struct MyGame;
//!
//! impl Application for MyGame {
//!     fn init(_ctx: &mut EngineContext) -> anyhow::Result<Self> {
//!         Ok(Self)
//!     }
//!
//!     fn update(&mut self, _ctx: &mut EngineContext, _dt: f32) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//!
//!     fn render(&mut self, _ctx: &mut EngineContext, _frame: &FrameContext) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     run::<MyGame>(EngineConfig::new("My game"))
//! }
//! ```

mod app;
mod context;
mod frame;
mod runner;

pub use app::Application;
pub use context::EngineContext;
pub use frame::FrameContext;
pub use runner::{run, EngineConfig};

// Re-export commonly used types for convenience
pub use arclight_events::{Event, EventBus, EventKind};
pub use arclight_gpu::{Renderer, RendererConfig};
pub use arclight_input::{InputManager, KeyCode, MouseButton};
pub use winit::event::WindowEvent;
