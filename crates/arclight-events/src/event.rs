//! Engine event type.

use winit::keyboard::KeyCode;

/// Mouse button identifier shared between the event and input subsystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
}

/// An engine event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// The application has been asked to quit.
    Quit,
    /// The window surface changed size.
    WindowResized { width: u32, height: u32 },
    /// A keyboard key went down.
    KeyPressed { key: KeyCode },
    /// A keyboard key went up.
    KeyReleased { key: KeyCode },
    /// A mouse button went down.
    MouseButtonPressed { button: MouseButton },
    /// A mouse button went up.
    MouseButtonReleased { button: MouseButton },
    /// The cursor moved to a new window position.
    MouseMoved { x: f32, y: f32 },
    /// The scroll wheel turned; positive `delta` scrolls up.
    MouseWheel { delta: f32 },
}

/// Discriminant used to route subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Quit,
    WindowResized,
    KeyPressed,
    KeyReleased,
    MouseButtonPressed,
    MouseButtonReleased,
    MouseMoved,
    MouseWheel,
}

impl Event {
    /// The subscription kind this event is delivered under.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Quit => EventKind::Quit,
            Self::WindowResized { .. } => EventKind::WindowResized,
            Self::KeyPressed { .. } => EventKind::KeyPressed,
            Self::KeyReleased { .. } => EventKind::KeyReleased,
            Self::MouseButtonPressed { .. } => EventKind::MouseButtonPressed,
            Self::MouseButtonReleased { .. } => EventKind::MouseButtonReleased,
            Self::MouseMoved { .. } => EventKind::MouseMoved,
            Self::MouseWheel { .. } => EventKind::MouseWheel,
        }
    }
}
