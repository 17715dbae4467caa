use std::time::Duration;

use winit::dpi::LogicalSize;
use winit::event_loop::EventLoop;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::Window;

use crate::compute::opencl::{ClQueue, MemObject, OpenCl};
use crate::compute::KernelArg;
use crate::device::ComputeDevice;
use crate::error::{Error, FrameCode, Result};
use crate::graphics::GlGraphics;
use crate::input::{CharListener, InputState, KeyListener, MouseListener};
use crate::session::Session;
use crate::surface::GlSurface;

use super::pump::EventPump;
use super::WindowConfig;

/// Session over the system OpenCL runtime and a glutin window.
pub type GlSession = Session<OpenCl, GlGraphics, GlSurface>;

/// One window whose framebuffer is rendered by an OpenCL kernel.
///
/// The caller drives the loop:
///
/// ```no_run
/// # fn main() -> clview_engine::Result<()> {
/// use clview_engine::{ClWindow, WindowConfig};
///
/// const SOURCE: &str = r#"
/// __kernel void render(__write_only image2d_t out, int2 size) {
///     int2 p = (int2)(get_global_id(0), get_global_id(1));
///     write_imagef(out, p, (float4)((float)p.x / size.x, (float)p.y / size.y, 0.5f, 1.0f));
/// }
/// "#;
///
/// let mut window = ClWindow::new(WindowConfig::default())?;
/// window.set_program_code(SOURCE, "")?;
/// window.show()?;
/// while !window.should_close() {
///     window.render()?;
///     window.swap_buffer()?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct ClWindow {
    // Session (and with it the window) goes before the event loop.
    session: GlSession,
    pump: EventPump,
    event_loop: EventLoop<()>,
}

impl ClWindow {
    /// Opens a hidden window, makes its GL context current, selects a compute
    /// device and creates the interop context and queue.
    pub fn new(config: WindowConfig) -> Result<Self> {
        Self::open(config).inspect_err(|e| log::error!("window initialization failed: {e}"))
    }

    fn open(config: WindowConfig) -> Result<Self> {
        let event_loop = EventLoop::new().map_err(|e| Error::Window(format!("cannot create event loop: {e}")))?;

        let attributes = Window::default_attributes()
            .with_title(config.title.as_str())
            .with_inner_size(config.initial_size);
        let (surface, gl) = GlSurface::new(&event_loop, attributes, config.gl_version)?;

        let session = Session::new(OpenCl, GlGraphics::new(gl), surface, &config.device_policy)?;

        Ok(Self {
            session,
            pump: EventPump::default(),
            event_loop,
        })
    }

    pub fn set_title(&self, title: &str) {
        self.window().set_title(title);
    }

    /// Requests a new client area size in logical pixels.
    ///
    /// The shared render target keeps the size it was created with.
    pub fn set_size(&self, width: u32, height: u32) {
        let applied = self
            .window()
            .request_inner_size(LogicalSize::new(width as f64, height as f64));
        if let Some(size) = applied {
            self.session.surface().resize(size);
        }
    }

    /// Removes decorations and maximizes the window.
    pub fn set_borderless_fullscreen(&self) {
        let window = self.window();
        window.set_decorations(false);
        window.set_maximized(true);
    }

    /// Builds `source` and makes its `render` kernel active.
    ///
    /// On failure the previously active kernel, if any, stays active.
    pub fn set_program_code(&mut self, source: &str, options: &str) -> Result<()> {
        self.session
            .set_program_code(source, options)
            .inspect_err(|e| log::error!("{e}"))
    }

    /// Sets argument `index` (2 and up) of the active kernel.
    pub fn set_kernel_arg(&self, index: u32, arg: KernelArg<'_, MemObject>) -> Result<()> {
        self.session.set_kernel_arg(index, arg)
    }

    /// Makes the window visible and presents a first frame.
    pub fn show(&mut self) -> Result<FrameCode> {
        self.session.show()
    }

    /// Processes pending window events, then reports whether a close was requested.
    pub fn should_close(&mut self) -> bool {
        let status = self.event_loop.pump_app_events(Some(Duration::ZERO), &mut self.pump);
        if let PumpStatus::Exit(code) = status {
            log::debug!("event loop exited with {code}");
            self.pump.request_close();
        }

        if let Some(size) = self.pump.take_resize() {
            self.session.surface().resize(size);
        }

        self.pump.close_requested()
    }

    /// Runs the kernel over the shared target. See [`Session::render`].
    pub fn render(&mut self) -> Result<FrameCode> {
        self.session.render()
    }

    /// Blits the shared target to the window and swaps buffers.
    pub fn swap_buffer(&mut self) -> Result<()> {
        self.session
            .present()
            .inspect_err(|e| log::error!("{e}"))
    }

    /// Closes the window, releasing compute objects before GL objects.
    pub fn destroy(self) {
        drop(self);
    }

    pub fn set_key_listener(&mut self, listener: impl KeyListener + 'static) {
        self.pump.listeners.key = Some(Box::new(listener));
    }

    pub fn set_mouse_listener(&mut self, listener: impl MouseListener + 'static) {
        self.pump.listeners.mouse = Some(Box::new(listener));
    }

    pub fn set_char_listener(&mut self, listener: impl CharListener + 'static) {
        self.pump.listeners.chars = Some(Box::new(listener));
    }

    pub fn input(&self) -> &InputState {
        &self.pump.input
    }

    /// Active kernel, once a program was built successfully.
    pub fn kernel(&self) -> Option<&opencl3::kernel::Kernel> {
        self.session.kernel()
    }

    pub fn context(&self) -> &opencl3::context::Context {
        self.session.context()
    }

    pub fn queue(&self) -> &ClQueue {
        self.session.queue()
    }

    pub fn device(&self) -> &ComputeDevice<OpenCl> {
        self.session.device()
    }

    pub fn gl(&self) -> &glow::Context {
        self.session.graphics().gl()
    }

    pub fn window(&self) -> &Window {
        self.session.surface().window()
    }

    pub fn session(&self) -> &GlSession {
        &self.session
    }
}
