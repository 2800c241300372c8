//! Core services for the Arclight engine.
//!
//! This crate provides the foundational pieces shared by every subsystem:
//! - Tagged memory accounting ([`MemoryTracker`])
//! - A tracked growable array ([`TrackedArray`])
//! - A simple stopwatch ([`Clock`])
//! - The engine-wide error type

pub mod clock;
pub mod darray;
pub mod error;
pub mod memory;

pub use clock::Clock;
pub use darray::TrackedArray;
pub use error::{Error, Result};
pub use memory::{MemoryTag, MemoryTracker};

/// Engine name reported to the graphics driver.
pub const ENGINE_NAME: &str = "Arclight";

/// Engine version as (major, minor, patch).
pub const ENGINE_VERSION: (u32, u32, u32) = (0, 1, 0);
