pub use winit::event::MouseButton;
pub use winit::keyboard::{KeyCode, PhysicalKey};

/// Transition reported for a key or mouse button.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Action {
    Pressed,
    Released,
    /// Key held long enough for the platform to auto-repeat it.
    Repeated,
}

/// Modifier keys state.
///
/// Stored as booleans rather than bitflags to keep it explicit and stable.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Physical key transition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KeyEvent {
    pub key: PhysicalKey,
    /// Platform scancode for `key`; `0` when the platform does not report one.
    pub scancode: u32,
    pub action: Action,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Returns the key code when the platform could identify the key.
    pub fn code(&self) -> Option<KeyCode> {
        match self.key {
            PhysicalKey::Code(code) => Some(code),
            PhysicalKey::Unidentified(_) => None,
        }
    }
}

/// Mouse button transition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ButtonEvent {
    pub button: MouseButton,
    pub action: Action,
    pub modifiers: Modifiers,
}

/// Cursor position in physical pixels, relative to the window's top-left corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CursorEvent {
    pub x: f64,
    pub y: f64,
}

/// Platform-agnostic input events produced by the event pump.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    ModifiersChanged(Modifiers),
    Key(KeyEvent),
    Button(ButtonEvent),
    Cursor(CursorEvent),
    /// One committed Unicode character.
    Char(char),
    /// Cursor left the window surface.
    CursorLeft,
    /// Window focus change.
    Focused(bool),
}
