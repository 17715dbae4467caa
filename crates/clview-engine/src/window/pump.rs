use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::WindowId;

use crate::input::{translate_window_event, InputEvent, InputState, Listeners};

/// Receives window events while the loop is pumped.
///
/// Close requests and resizes are latched for the owning window to act on;
/// input is tracked and forwarded to the registered listeners.
#[derive(Default)]
pub(crate) struct EventPump {
    pub(crate) listeners: Listeners,
    pub(crate) input: InputState,
    close_requested: bool,
    pending_resize: Option<PhysicalSize<u32>>,
    scratch: Vec<InputEvent>,
}

impl EventPump {
    pub(crate) fn close_requested(&self) -> bool {
        self.close_requested
    }

    pub(crate) fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub(crate) fn take_resize(&mut self) -> Option<PhysicalSize<u32>> {
        self.pending_resize.take()
    }

    pub(crate) fn handle(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => self.close_requested = true,
            WindowEvent::Resized(size) => self.pending_resize = Some(*size),
            _ => {
                let mut out = std::mem::take(&mut self.scratch);
                translate_window_event(&self.input, event, &mut out);
                for ev in out.drain(..) {
                    self.input.apply_event(&ev);
                    self.listeners.dispatch(&ev);
                }
                self.scratch = out;
            }
        }
    }
}

impl ApplicationHandler for EventPump {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        self.handle(&event);
    }
}
