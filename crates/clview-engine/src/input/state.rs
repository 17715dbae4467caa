use std::collections::HashSet;

use super::types::{Action, ButtonEvent, CursorEvent, InputEvent, KeyEvent, Modifiers, MouseButton, PhysicalKey};

/// Current input state of the window.
///
/// Mouse button events carry no modifiers on every platform, so the pump
/// stamps them with the tracked state.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,

    pub focused: bool,

    /// Cursor position in physical pixels.
    pub cursor: Option<(f64, f64)>,

    pub keys_down: HashSet<PhysicalKey>,

    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::ModifiersChanged(m) => self.modifiers = *m,

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // On focus loss, clear "down" sets to avoid stuck keys/buttons.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::Cursor(CursorEvent { x, y }) => self.cursor = Some((*x, *y)),

            InputEvent::CursorLeft => self.cursor = None,

            InputEvent::Key(KeyEvent { key, action, modifiers, .. }) => {
                self.modifiers = *modifiers;
                match action {
                    Action::Pressed | Action::Repeated => {
                        self.keys_down.insert(*key);
                    }
                    Action::Released => {
                        self.keys_down.remove(key);
                    }
                }
            }

            InputEvent::Button(ButtonEvent { button, action, .. }) => match action {
                Action::Pressed | Action::Repeated => {
                    self.buttons_down.insert(*button);
                }
                Action::Released => {
                    self.buttons_down.remove(button);
                }
            },

            InputEvent::Char(_) => {}
        }
    }

    pub fn key_down(&self, key: PhysicalKey) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }
}
