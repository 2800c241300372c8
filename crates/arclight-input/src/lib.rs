//! Input polling for the Arclight engine.
//!
//! Keyboard and mouse state with per-frame transition tracking. Queries
//! follow the down / pressed / released / up vocabulary:
//!
//! - *down*: the button is held right now
//! - *pressed*: the button went down this frame
//! - *released*: the button went up this frame
//! - *up*: the button is not held
//!
//! [`InputManager::process_window_event`] feeds winit events into the state
//! and publishes the matching [`arclight_events::Event`]s onto the bus, so
//! subsystems can either poll or subscribe.

mod button_state;
mod input;
mod keyboard;
mod modifiers;
mod mouse;

pub use button_state::ButtonState;
pub use input::InputManager;
pub use keyboard::KeyboardState;
pub use modifiers::Modifiers;
pub use mouse::MouseState;

// The shared button vocabulary lives with the event type.
pub use arclight_events::MouseButton;

// Re-export winit types commonly used with input
pub use winit::event::WindowEvent;
pub use winit::keyboard::KeyCode;
