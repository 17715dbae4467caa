use winit::event::{ElementState, Ime, WindowEvent};
use winit::keyboard::{ModifiersState, PhysicalKey};

use crate::input::{Action, ButtonEvent, CursorEvent, InputEvent, InputState, KeyEvent, Modifiers};

/// Translates a winit `WindowEvent` into zero or more `InputEvent`s.
///
/// A key press carrying text yields a `Key` followed by one `Char` per
/// printable character. Cursor positions stay in physical pixels.
pub fn translate_window_event(state: &InputState, event: &WindowEvent, out: &mut Vec<InputEvent>) {
    match event {
        WindowEvent::ModifiersChanged(m) => {
            out.push(InputEvent::ModifiersChanged(map_modifiers(m.state())));
        }

        WindowEvent::Focused(f) => out.push(InputEvent::Focused(*f)),

        WindowEvent::CursorLeft { .. } => out.push(InputEvent::CursorLeft),

        WindowEvent::CursorMoved { position, .. } => {
            out.push(InputEvent::Cursor(CursorEvent { x: position.x, y: position.y }));
        }

        WindowEvent::MouseInput { state: st, button, .. } => {
            let action = match st {
                ElementState::Pressed => Action::Pressed,
                ElementState::Released => Action::Released,
            };

            // winit 0.30 does not expose `Window::modifiers()`; use the tracked state.
            out.push(InputEvent::Button(ButtonEvent {
                button: *button,
                action,
                modifiers: state.modifiers,
            }));
        }

        WindowEvent::KeyboardInput { event, .. } => {
            let action = match (event.state, event.repeat) {
                (ElementState::Pressed, false) => Action::Pressed,
                (ElementState::Pressed, true) => Action::Repeated,
                (ElementState::Released, _) => Action::Released,
            };

            out.push(InputEvent::Key(KeyEvent {
                key: event.physical_key,
                scancode: scancode(event.physical_key),
                action,
                modifiers: state.modifiers,
            }));

            if event.state == ElementState::Pressed {
                if let Some(text) = event.text.as_ref() {
                    push_chars(text, out);
                }
            }
        }

        WindowEvent::Ime(Ime::Commit(text)) => push_chars(text, out),

        _ => {}
    }
}

fn push_chars(text: &str, out: &mut Vec<InputEvent>) {
    out.extend(text.chars().filter(|c| !c.is_control()).map(InputEvent::Char));
}

fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

#[cfg(any(
    windows,
    target_os = "macos",
    all(unix, not(target_vendor = "apple"), not(target_os = "android"))
))]
fn scancode(key: PhysicalKey) -> u32 {
    use winit::platform::scancode::PhysicalKeyExtScancode;
    key.to_scancode().unwrap_or(0)
}

#[cfg(not(any(
    windows,
    target_os = "macos",
    all(unix, not(target_vendor = "apple"), not(target_os = "android"))
)))]
fn scancode(_key: PhysicalKey) -> u32 {
    0
}

#[cfg(test)]
mod tests {
    use winit::dpi::PhysicalPosition;
    use winit::event::{DeviceId, MouseButton};

    use super::*;

    fn translate(state: &InputState, event: WindowEvent) -> Vec<InputEvent> {
        let mut out = Vec::new();
        translate_window_event(state, &event, &mut out);
        out
    }

    #[test]
    fn cursor_position_stays_physical() {
        let device_id = DeviceId::dummy();
        let out = translate(
            &InputState::default(),
            WindowEvent::CursorMoved { device_id, position: PhysicalPosition::new(640.0, 12.5) },
        );
        assert_eq!(out, vec![InputEvent::Cursor(CursorEvent { x: 640.0, y: 12.5 })]);
    }

    #[test]
    fn mouse_button_uses_tracked_modifiers() {
        let mut state = InputState::default();
        state.modifiers.ctrl = true;

        let device_id = DeviceId::dummy();
        let out = translate(
            &state,
            WindowEvent::MouseInput { device_id, state: ElementState::Pressed, button: MouseButton::Left },
        );

        assert_eq!(
            out,
            vec![InputEvent::Button(ButtonEvent {
                button: MouseButton::Left,
                action: Action::Pressed,
                modifiers: Modifiers { ctrl: true, ..Modifiers::default() },
            })]
        );
    }

    #[test]
    fn ime_commit_skips_control_characters() {
        let out = translate(&InputState::default(), WindowEvent::Ime(Ime::Commit("a\u{8}é".into())));
        assert_eq!(out, vec![InputEvent::Char('a'), InputEvent::Char('é')]);
    }

    #[test]
    fn modifiers_map_super_to_meta() {
        let out = translate(
            &InputState::default(),
            WindowEvent::ModifiersChanged((ModifiersState::SHIFT | ModifiersState::SUPER).into()),
        );
        assert_eq!(
            out,
            vec![InputEvent::ModifiersChanged(Modifiers { shift: true, meta: true, ..Modifiers::default() })]
        );
    }

    #[test]
    fn unrelated_events_produce_nothing() {
        assert!(translate(&InputState::default(), WindowEvent::CloseRequested).is_empty());
    }
}
