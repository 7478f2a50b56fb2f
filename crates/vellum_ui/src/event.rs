//! Input events delivered to the GUI root.
//!
//! Events arrive in strict order from the caller's window loop, zero or
//! more per frame. The library never polls; everything is a reaction to
//! an already-delivered event.

use vellum_shared::Vec2;

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button (scroll wheel click).
    Middle,
}

/// Keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Space,
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Num0, Num1, Num2, Num3, Num4, Num5, Num6, Num7, Num8, Num9,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Control key is held.
    pub ctrl: bool,
    /// Alt key is held.
    pub alt: bool,
    /// Super/Command key is held.
    pub super_key: bool,
}

/// An input or window event, in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// A mouse button went down.
    MouseButtonPressed {
        /// Which button.
        button: MouseButton,
        /// Pointer position.
        pos: Vec2,
    },
    /// A mouse button went up.
    MouseButtonReleased {
        /// Which button.
        button: MouseButton,
        /// Pointer position.
        pos: Vec2,
    },
    /// The pointer moved.
    MouseMoved {
        /// New pointer position.
        pos: Vec2,
    },
    /// The scroll wheel turned. Positive delta scrolls up.
    MouseWheelScrolled {
        /// Scroll distance in notches.
        delta: f32,
        /// Pointer position at the time of the scroll.
        pos: Vec2,
    },
    /// The pointer left the window.
    MouseLeft,
    /// A key went down.
    KeyPressed {
        /// Which key.
        key: Key,
        /// Modifier state at the time of the press.
        modifiers: Modifiers,
    },
    /// The window was resized.
    Resized {
        /// New view size.
        size: Vec2,
    },
    /// The window lost input focus. Forces every in-flight pointer
    /// interaction back to its idle state.
    LostFocus,
}
