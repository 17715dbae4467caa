//! Input subsystem.
//!
//! The window's event pump translates winit window events into `InputEvent`s,
//! folds them into `InputState`, then hands them to whichever listeners are set.

mod listener;
mod platform;
mod state;
mod types;

pub use listener::{CharListener, KeyListener, Listeners, MouseListener};
pub(crate) use platform::translate_window_event;
pub use state::InputState;
pub use types::{
    Action,
    ButtonEvent,
    CursorEvent,
    InputEvent,
    KeyCode,
    KeyEvent,
    Modifiers,
    MouseButton,
    PhysicalKey,
};
