//! Modifier key flags.

use bitflags::bitflags;
use winit::keyboard::ModifiersState;

bitflags! {
    /// State of the modifier keys.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const CTRL  = 0b0000_0010;
        const ALT   = 0b0000_0100;
        const SUPER = 0b0000_1000;
    }
}

impl Modifiers {
    #[inline]
    #[must_use]
    pub const fn shift(self) -> bool {
        self.contains(Self::SHIFT)
    }

    #[inline]
    #[must_use]
    pub const fn ctrl(self) -> bool {
        self.contains(Self::CTRL)
    }

    #[inline]
    #[must_use]
    pub const fn alt(self) -> bool {
        self.contains(Self::ALT)
    }

    #[inline]
    #[must_use]
    pub const fn super_key(self) -> bool {
        self.contains(Self::SUPER)
    }
}

impl From<ModifiersState> for Modifiers {
    fn from(state: ModifiersState) -> Self {
        let mut modifiers = Self::empty();
        if state.shift_key() {
            modifiers |= Self::SHIFT;
        }
        if state.control_key() {
            modifiers |= Self::CTRL;
        }
        if state.alt_key() {
            modifiers |= Self::ALT;
        }
        if state.super_key() {
            modifiers |= Self::SUPER;
        }
        modifiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_queries() {
        let mods = Modifiers::SHIFT | Modifiers::ALT;
        assert!(mods.shift());
        assert!(mods.alt());
        assert!(!mods.ctrl());
        assert!(!mods.super_key());
    }
}
