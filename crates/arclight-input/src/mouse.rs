//! Mouse state tracking.

use glam::Vec2;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta};

use crate::button_state::ButtonState;
use crate::MouseButton;

fn map_button(button: WinitMouseButton) -> Option<MouseButton> {
    match button {
        WinitMouseButton::Left => Some(MouseButton::Left),
        WinitMouseButton::Right => Some(MouseButton::Right),
        WinitMouseButton::Middle => Some(MouseButton::Middle),
        WinitMouseButton::Back => Some(MouseButton::Back),
        WinitMouseButton::Forward => Some(MouseButton::Forward),
        WinitMouseButton::Other(_) => None,
    }
}

/// Mouse state: cursor position, per-frame delta, wheel, and buttons.
#[derive(Debug, Default)]
pub struct MouseState {
    position: Vec2,
    delta: Vec2,
    wheel: f32,
    buttons: [ButtonState; 5],
}

impl MouseState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cursor move; accumulates into the per-frame delta.
    #[allow(clippy::cast_possible_truncation)]
    pub fn set_position(&mut self, x: f64, y: f64) {
        let new_position = Vec2::new(x as f32, y as f32);
        self.delta += new_position - self.position;
        self.position = new_position;
    }

    /// Record a button event. Returns the mapped button and whether it went
    /// down, when the event changed anything.
    pub fn process_button(
        &mut self,
        button: WinitMouseButton,
        state: ElementState,
    ) -> Option<(MouseButton, bool)> {
        let button = map_button(button)?;
        let button_state = &mut self.buttons[button as usize];

        match state {
            ElementState::Pressed => {
                if button_state.is_down() {
                    return None;
                }
                button_state.press();
                Some((button, true))
            }
            ElementState::Released => {
                if button_state.is_up() {
                    return None;
                }
                button_state.release();
                Some((button, false))
            }
        }
    }

    /// Record a scroll event; returns the vertical line delta applied.
    #[allow(clippy::cast_possible_truncation)]
    pub fn process_scroll(&mut self, delta: MouseScrollDelta) -> f32 {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            // Approximate pixel deltas from precision devices as lines.
            MouseScrollDelta::PixelDelta(position) => position.y as f32 / 100.0,
        };
        self.wheel += lines;
        lines
    }

    /// Cursor position in window coordinates.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Cursor movement accumulated this frame.
    #[must_use]
    pub const fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Wheel movement accumulated this frame, in lines.
    #[must_use]
    pub const fn wheel(&self) -> f32 {
        self.wheel
    }

    /// Returns `true` while the button is held.
    #[must_use]
    pub const fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons[button as usize].is_down()
    }

    /// Returns `true` only on the frame the button went down.
    #[must_use]
    pub const fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons[button as usize].is_pressed()
    }

    /// Returns `true` only on the frame the button went up.
    #[must_use]
    pub const fn is_button_released(&self, button: MouseButton) -> bool {
        self.buttons[button as usize].is_released()
    }

    /// Returns `true` while the button is not held.
    #[must_use]
    pub const fn is_button_up(&self, button: MouseButton) -> bool {
        self.buttons[button as usize].is_up()
    }

    /// Decay transition states and reset the per-frame accumulators.
    pub fn end_frame(&mut self) {
        for button in &mut self.buttons {
            button.end_frame();
        }
        self.delta = Vec2::ZERO;
        self.wheel = 0.0;
    }

    /// Forget all mouse state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_and_delta() {
        let mut mouse = MouseState::new();

        mouse.set_position(100.0, 200.0);
        mouse.set_position(130.0, 210.0);
        assert_eq!(mouse.position(), Vec2::new(130.0, 210.0));
        assert_eq!(mouse.delta(), Vec2::new(130.0, 210.0));

        mouse.end_frame();
        assert_eq!(mouse.delta(), Vec2::ZERO);

        mouse.set_position(131.0, 209.0);
        assert_eq!(mouse.delta(), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn button_transitions() {
        let mut mouse = MouseState::new();
        assert!(mouse.is_button_up(MouseButton::Left));

        let change = mouse.process_button(WinitMouseButton::Left, ElementState::Pressed);
        assert_eq!(change, Some((MouseButton::Left, true)));
        assert!(mouse.is_button_pressed(MouseButton::Left));

        mouse.end_frame();
        assert!(mouse.is_button_down(MouseButton::Left));
        assert!(!mouse.is_button_pressed(MouseButton::Left));

        let change = mouse.process_button(WinitMouseButton::Left, ElementState::Released);
        assert_eq!(change, Some((MouseButton::Left, false)));
        assert!(mouse.is_button_released(MouseButton::Left));
    }

    #[test]
    fn repeated_press_reports_nothing() {
        let mut mouse = MouseState::new();
        mouse.process_button(WinitMouseButton::Right, ElementState::Pressed);
        let repeat = mouse.process_button(WinitMouseButton::Right, ElementState::Pressed);
        assert_eq!(repeat, None);
    }

    #[test]
    fn wheel_accumulates() {
        let mut mouse = MouseState::new();
        mouse.process_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        mouse.process_scroll(MouseScrollDelta::LineDelta(0.0, 0.5));
        assert_eq!(mouse.wheel(), 1.5);

        mouse.end_frame();
        assert_eq!(mouse.wheel(), 0.0);
    }
}
