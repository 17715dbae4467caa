use super::types::{Action, ButtonEvent, InputEvent, KeyEvent, Modifiers, MouseButton};

/// Receives keyboard transitions.
pub trait KeyListener {
    fn on_key(&mut self, event: &KeyEvent);
}

/// Receives mouse button transitions and cursor movement.
pub trait MouseListener {
    fn on_mouse_button(&mut self, button: MouseButton, action: Action, modifiers: Modifiers);

    /// `x`/`y` are physical pixels from the window's top-left corner.
    fn on_mouse_cursor(&mut self, x: f64, y: f64) {
        let _ = (x, y);
    }
}

/// Receives committed text, one character at a time.
pub trait CharListener {
    fn on_char(&mut self, ch: char);
}

impl<F: FnMut(&KeyEvent)> KeyListener for F {
    fn on_key(&mut self, event: &KeyEvent) {
        self(event)
    }
}

impl<F: FnMut(char)> CharListener for F {
    fn on_char(&mut self, ch: char) {
        self(ch)
    }
}

/// At most one listener per category. Events for an empty slot are dropped.
#[derive(Default)]
pub struct Listeners {
    pub key: Option<Box<dyn KeyListener>>,
    pub mouse: Option<Box<dyn MouseListener>>,
    pub chars: Option<Box<dyn CharListener>>,
}

impl Listeners {
    pub fn dispatch(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::Key(k) => {
                if let Some(l) = self.key.as_mut() {
                    l.on_key(k);
                }
            }
            InputEvent::Button(ButtonEvent { button, action, modifiers }) => {
                if let Some(l) = self.mouse.as_mut() {
                    l.on_mouse_button(*button, *action, *modifiers);
                }
            }
            InputEvent::Cursor(c) => {
                if let Some(l) = self.mouse.as_mut() {
                    l.on_mouse_cursor(c.x, c.y);
                }
            }
            InputEvent::Char(ch) => {
                if let Some(l) = self.chars.as_mut() {
                    l.on_char(*ch);
                }
            }
            InputEvent::ModifiersChanged(_) | InputEvent::CursorLeft | InputEvent::Focused(_) => {}
        }
    }
}
