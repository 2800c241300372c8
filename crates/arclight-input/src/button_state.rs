//! Per-button transition tracking.

/// State of a single key or mouse button across frame boundaries.
///
/// `Pressed` and `Released` are the single-frame transition states; they
/// decay to `Down`/`Up` when the frame ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    /// Went down this frame.
    Pressed,
    /// Held down.
    Down,
    /// Went up this frame.
    Released,
    /// Not held.
    #[default]
    Up,
}

impl ButtonState {
    /// Returns `true` while the button is held (including the press frame).
    #[inline]
    #[must_use]
    pub const fn is_down(self) -> bool {
        matches!(self, Self::Pressed | Self::Down)
    }

    /// Returns `true` only on the frame the button went down.
    #[inline]
    #[must_use]
    pub const fn is_pressed(self) -> bool {
        matches!(self, Self::Pressed)
    }

    /// Returns `true` only on the frame the button went up.
    #[inline]
    #[must_use]
    pub const fn is_released(self) -> bool {
        matches!(self, Self::Released)
    }

    /// Returns `true` while the button is not held.
    #[inline]
    #[must_use]
    pub const fn is_up(self) -> bool {
        matches!(self, Self::Released | Self::Up)
    }

    /// Record the button going down. Repeats while already down are ignored.
    #[inline]
    pub fn press(&mut self) {
        if !self.is_down() {
            *self = Self::Pressed;
        }
    }

    /// Record the button going up. Repeats while already up are ignored.
    #[inline]
    pub fn release(&mut self) {
        if self.is_down() {
            *self = Self::Released;
        }
    }

    /// Decay transition states at the end of a frame.
    #[inline]
    pub fn end_frame(&mut self) {
        match *self {
            Self::Pressed => *self = Self::Down,
            Self::Released => *self = Self::Up,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_hold_release_cycle() {
        let mut state = ButtonState::Up;
        assert!(state.is_up());

        state.press();
        assert!(state.is_pressed());
        assert!(state.is_down());

        state.end_frame();
        assert!(state.is_down());
        assert!(!state.is_pressed());

        state.release();
        assert!(state.is_released());
        assert!(state.is_up());

        state.end_frame();
        assert!(state.is_up());
        assert!(!state.is_released());
    }

    #[test]
    fn repeats_do_not_retrigger() {
        let mut state = ButtonState::Up;
        state.press();
        state.end_frame();
        state.press();
        assert_eq!(state, ButtonState::Down);

        state.release();
        state.end_frame();
        state.release();
        assert_eq!(state, ButtonState::Up);
    }
}
