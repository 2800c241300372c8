//! Input manager tying state tracking to the event bus.

use arclight_events::{Event, EventBus, MouseButton};
use glam::Vec2;
use winit::event::WindowEvent;
use winit::keyboard::KeyCode;

use crate::keyboard::KeyboardState;
use crate::modifiers::Modifiers;
use crate::mouse::MouseState;

/// Input manager combining keyboard and mouse state.
///
/// Feed every window event through [`process_window_event`]; state changes
/// are published onto the bus as engine events, so subsystems can subscribe
/// instead of polling. Call [`end_frame`] once per frame after the update
/// step so the pressed/released queries stay single-frame.
///
/// [`process_window_event`]: Self::process_window_event
/// [`end_frame`]: Self::end_frame
#[derive(Debug, Default)]
pub struct InputManager {
    keyboard: KeyboardState,
    mouse: MouseState,
}

impl InputManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a window event into the input state and publish the matching
    /// engine event.
    ///
    /// Returns `true` if the event was recognized as input.
    pub fn process_window_event(&mut self, event: &WindowEvent, bus: &mut EventBus) -> bool {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some((key, pressed)) = self.keyboard.process_key_event(event) {
                    let event = if pressed {
                        Event::KeyPressed { key }
                    } else {
                        Event::KeyReleased { key }
                    };
                    bus.publish(&event);
                }
                true
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.keyboard.set_modifiers(Modifiers::from(modifiers.state()));
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse.set_position(position.x, position.y);
                let cursor = self.mouse.position();
                bus.publish(&Event::MouseMoved {
                    x: cursor.x,
                    y: cursor.y,
                });
                true
            }
            WindowEvent::MouseInput { button, state, .. } => {
                if let Some((button, pressed)) = self.mouse.process_button(*button, *state) {
                    let event = if pressed {
                        Event::MouseButtonPressed { button }
                    } else {
                        Event::MouseButtonReleased { button }
                    };
                    bus.publish(&event);
                }
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = self.mouse.process_scroll(*delta);
                if lines != 0.0 {
                    bus.publish(&Event::MouseWheel { delta: lines });
                }
                true
            }
            _ => false,
        }
    }

    /// Decay transition states and reset per-frame accumulators.
    ///
    /// Must run once at the end of every update cycle.
    pub fn end_frame(&mut self) {
        self.keyboard.end_frame();
        self.mouse.end_frame();
    }

    /// Forget all input state.
    pub fn clear(&mut self) {
        self.keyboard.clear();
        self.mouse.clear();
    }

    // ===== Keyboard queries =====

    #[must_use]
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keyboard.is_key_down(key)
    }

    #[must_use]
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keyboard.is_key_pressed(key)
    }

    #[must_use]
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keyboard.is_key_released(key)
    }

    #[must_use]
    pub fn is_key_up(&self, key: KeyCode) -> bool {
        self.keyboard.is_key_up(key)
    }

    #[must_use]
    pub const fn modifiers(&self) -> Modifiers {
        self.keyboard.modifiers()
    }

    // ===== Mouse queries =====

    #[must_use]
    pub const fn mouse_position(&self) -> Vec2 {
        self.mouse.position()
    }

    #[must_use]
    pub const fn mouse_delta(&self) -> Vec2 {
        self.mouse.delta()
    }

    #[must_use]
    pub const fn mouse_wheel(&self) -> f32 {
        self.mouse.wheel()
    }

    #[must_use]
    pub const fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.mouse.is_button_down(button)
    }

    #[must_use]
    pub const fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse.is_button_pressed(button)
    }

    #[must_use]
    pub const fn is_mouse_button_released(&self, button: MouseButton) -> bool {
        self.mouse.is_button_released(button)
    }

    #[must_use]
    pub const fn is_mouse_button_up(&self, button: MouseButton) -> bool {
        self.mouse.is_button_up(button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_manager_reads_idle() {
        let input = InputManager::new();
        assert!(input.is_key_up(KeyCode::Space));
        assert!(!input.is_key_down(KeyCode::Space));
        assert!(input.is_mouse_button_up(MouseButton::Left));
        assert_eq!(input.mouse_position(), Vec2::ZERO);
        assert_eq!(input.mouse_wheel(), 0.0);
    }
}
