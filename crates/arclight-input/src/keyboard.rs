//! Keyboard state tracking.

use hashbrown::HashMap;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::button_state::ButtonState;
use crate::modifiers::Modifiers;

/// Keyboard state with per-key transition tracking.
#[derive(Debug, Default)]
pub struct KeyboardState {
    keys: HashMap<KeyCode, ButtonState>,
    modifiers: Modifiers,
}

impl KeyboardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a winit key event into the state.
    ///
    /// Returns the key code and whether it went down, when the event changed
    /// anything (key repeats while held report nothing).
    pub fn process_key_event(&mut self, event: &KeyEvent) -> Option<(KeyCode, bool)> {
        let PhysicalKey::Code(key) = event.physical_key else {
            return None;
        };

        let state = self.keys.entry(key).or_default();
        match event.state {
            ElementState::Pressed => {
                if state.is_down() {
                    return None;
                }
                state.press();
                Some((key, true))
            }
            ElementState::Released => {
                if state.is_up() {
                    return None;
                }
                state.release();
                Some((key, false))
            }
        }
    }

    /// Update the modifier key state.
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// Returns `true` while the key is held.
    #[must_use]
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.get(&key).is_some_and(|s| s.is_down())
    }

    /// Returns `true` only on the frame the key went down.
    #[must_use]
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys.get(&key).is_some_and(|s| s.is_pressed())
    }

    /// Returns `true` only on the frame the key went up.
    #[must_use]
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys.get(&key).is_some_and(|s| s.is_released())
    }

    /// Returns `true` while the key is not held.
    #[must_use]
    pub fn is_key_up(&self, key: KeyCode) -> bool {
        self.keys.get(&key).map_or(true, |s| s.is_up())
    }

    /// Current modifier key state.
    #[must_use]
    pub const fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Decay transition states at the end of a frame.
    pub fn end_frame(&mut self) {
        for state in self.keys.values_mut() {
            state.end_frame();
        }
    }

    /// Forget all key state.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.modifiers = Modifiers::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_transitions() {
        let mut keyboard = KeyboardState::new();
        assert!(keyboard.is_key_up(KeyCode::KeyW));
        assert!(!keyboard.is_key_down(KeyCode::KeyW));

        keyboard.keys.entry(KeyCode::KeyW).or_default().press();
        assert!(keyboard.is_key_down(KeyCode::KeyW));
        assert!(keyboard.is_key_pressed(KeyCode::KeyW));

        keyboard.end_frame();
        assert!(keyboard.is_key_down(KeyCode::KeyW));
        assert!(!keyboard.is_key_pressed(KeyCode::KeyW));

        keyboard.keys.entry(KeyCode::KeyW).or_default().release();
        assert!(keyboard.is_key_released(KeyCode::KeyW));
        assert!(keyboard.is_key_up(KeyCode::KeyW));

        keyboard.end_frame();
        assert!(keyboard.is_key_up(KeyCode::KeyW));
        assert!(!keyboard.is_key_released(KeyCode::KeyW));
    }

    #[test]
    fn unseen_keys_read_as_up() {
        let keyboard = KeyboardState::new();
        assert!(keyboard.is_key_up(KeyCode::Space));
        assert!(!keyboard.is_key_down(KeyCode::Space));
        assert!(!keyboard.is_key_pressed(KeyCode::Space));
        assert!(!keyboard.is_key_released(KeyCode::Space));
    }

    #[test]
    fn modifiers_roundtrip() {
        let mut keyboard = KeyboardState::new();
        keyboard.set_modifiers(Modifiers::CTRL | Modifiers::SHIFT);
        assert!(keyboard.modifiers().ctrl());
        assert!(keyboard.modifiers().shift());
        assert!(!keyboard.modifiers().alt());
    }
}
