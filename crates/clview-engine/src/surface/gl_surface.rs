use std::num::NonZeroU32;

use glutin::config::{ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    AsRawContext, ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext,
    PossiblyCurrentContext, RawContext, Version,
};
use glutin::display::{AsRawDisplay, Display, DisplayApiPreference, GetGlDisplay, GlDisplay, RawDisplay};
use glutin::surface::{GlSurface as _, Surface as GlutinSurface, WindowSurface};
use glutin_winit::GlWindow;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawWindowHandle};
use winit::dpi::PhysicalSize;
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowAttributes};

use crate::compute::InteropProperties;
use crate::error::{Error, Result};

use super::Surface;

// cl_gl context property keys.
#[cfg(not(target_vendor = "apple"))]
const CL_GL_CONTEXT_KHR: isize = 0x2008;
#[cfg(any(windows, all(unix, not(target_vendor = "apple"))))]
const CL_EGL_DISPLAY_KHR: isize = 0x2009;
#[cfg(all(unix, not(target_vendor = "apple"), not(target_os = "android")))]
const CL_GLX_DISPLAY_KHR: isize = 0x200A;
#[cfg(windows)]
const CL_WGL_HDC_KHR: isize = 0x200B;
#[cfg(target_os = "macos")]
const CL_CONTEXT_PROPERTY_USE_CGL_SHAREGROUP_APPLE: isize = 0x1000_0000;

#[cfg(windows)]
#[link(name = "opengl32")]
unsafe extern "system" {
    fn wglGetCurrentDC() -> *mut std::ffi::c_void;
}

#[cfg(target_os = "macos")]
#[link(name = "OpenGL", kind = "framework")]
unsafe extern "C" {
    fn CGLGetShareGroup(ctx: *mut std::ffi::c_void) -> *mut std::ffi::c_void;
}

/// A winit window with a current GL context and its window surface.
///
/// Created hidden and non-resizable, without depth or stencil buffers.
pub struct GlSurface {
    // Context before surface before window.
    gl_context: PossiblyCurrentContext,
    gl_surface: GlutinSurface<WindowSurface>,
    window: Window,
}

impl GlSurface {
    /// Opens the window, creates a core-profile context of `gl_version`, makes
    /// it current and loads the GL function pointers.
    pub fn new(
        event_loop: &EventLoop<()>,
        attributes: WindowAttributes,
        gl_version: (u8, u8),
    ) -> Result<(Self, glow::Context)> {
        let attributes = attributes.with_visible(false).with_resizable(false);

        // WGL needs a window before configs can be queried; elsewhere the
        // window is created from the chosen config.
        #[cfg(windows)]
        let window = Some(open_window(event_loop, attributes.clone())?);
        #[cfg(not(windows))]
        let window: Option<Window> = None;
        let raw_window = window
            .as_ref()
            .and_then(|w| w.window_handle().ok())
            .map(|h| h.as_raw());

        let raw_display = event_loop
            .display_handle()
            .map_err(|e| Error::Window(format!("no display handle: {e}")))?
            .as_raw();
        let display = unsafe { Display::new(raw_display, display_preference(raw_window)) }
            .map_err(|e| Error::Window(format!("cannot open GL display: {e}")))?;

        let mut template = ConfigTemplateBuilder::new()
            .with_depth_size(0)
            .with_stencil_size(0);
        if let Some(handle) = raw_window {
            template = template.compatible_with_native_window(handle);
        }
        let gl_config = unsafe { display.find_configs(template.build()) }
            .map_err(|e| Error::Window(format!("cannot query GL configs: {e}")))?
            .min_by_key(|config| config.num_samples())
            .ok_or_else(|| Error::Window("no GL config matches the window".to_string()))?;

        let window = match window {
            Some(window) => window,
            None => glutin_winit::finalize_window(event_loop, attributes, &gl_config)
                .map_err(|e| Error::Window(format!("cannot create window: {e}")))?,
        };

        let raw_window = window.window_handle().ok().map(|h| h.as_raw());
        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(gl_version.0, gl_version.1))))
            .build(raw_window);

        let not_current = unsafe { display.create_context(&gl_config, &context_attributes) }
            .map_err(|e| Error::Window(format!("cannot create GL {}.{} context: {e}", gl_version.0, gl_version.1)))?;

        let surface_attributes = window
            .build_surface_attributes(Default::default())
            .map_err(|e| Error::Window(format!("cannot describe window surface: {e}")))?;
        let gl_surface = unsafe { display.create_window_surface(&gl_config, &surface_attributes) }
            .map_err(|e| Error::Window(format!("cannot create window surface: {e}")))?;

        let gl_context = not_current
            .make_current(&gl_surface)
            .map_err(|e| Error::Window(format!("cannot make GL context current: {e}")))?;

        let gl = unsafe { glow::Context::from_loader_function_cstr(|name| display.get_proc_address(name)) };

        log::debug!(
            "GL context {}.{} current on window {:?}",
            gl_version.0,
            gl_version.1,
            window.id()
        );

        Ok((
            Self {
                gl_context,
                gl_surface,
                window,
            },
            gl,
        ))
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Resizes the drawable after the window changed size.
    pub fn resize(&self, size: PhysicalSize<u32>) {
        if let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) {
            self.gl_surface.resize(&self.gl_context, w, h);
        }
    }
}

impl Surface for GlSurface {
    fn framebuffer_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn interop_properties(&self) -> Result<InteropProperties> {
        let context = self.gl_context.raw_context();
        let display = self.gl_context.display().raw_display();
        interop_properties(context, display)
    }

    fn show(&self) {
        self.window.set_visible(true);
    }

    fn swap_buffers(&self) -> Result<()> {
        self.gl_surface
            .swap_buffers(&self.gl_context)
            .map_err(|e| Error::Present(e.to_string()))
    }
}

#[cfg(windows)]
#[allow(deprecated)]
fn open_window(event_loop: &EventLoop<()>, attributes: WindowAttributes) -> Result<Window> {
    event_loop
        .create_window(attributes)
        .map_err(|e| Error::Window(format!("cannot create window: {e}")))
}

#[cfg(all(unix, not(target_vendor = "apple"), not(target_os = "android")))]
fn display_preference(_window: Option<RawWindowHandle>) -> DisplayApiPreference {
    DisplayApiPreference::EglThenGlx(Box::new(winit::platform::x11::register_xlib_error_hook))
}

#[cfg(target_os = "android")]
fn display_preference(_window: Option<RawWindowHandle>) -> DisplayApiPreference {
    DisplayApiPreference::Egl
}

#[cfg(windows)]
fn display_preference(window: Option<RawWindowHandle>) -> DisplayApiPreference {
    DisplayApiPreference::WglThenEgl(window)
}

#[cfg(target_os = "macos")]
fn display_preference(_window: Option<RawWindowHandle>) -> DisplayApiPreference {
    DisplayApiPreference::Cgl
}

#[allow(unreachable_patterns, unused_variables)]
fn interop_properties(context: RawContext, display: RawDisplay) -> Result<InteropProperties> {
    match (context, display) {
        #[cfg(all(unix, not(target_vendor = "apple"), not(target_os = "android")))]
        (RawContext::Glx(ctx), RawDisplay::Glx(dpy)) => Ok(InteropProperties::new()
            .with(CL_GL_CONTEXT_KHR, ctx as isize)
            .with(CL_GLX_DISPLAY_KHR, dpy as isize)),

        #[cfg(any(windows, all(unix, not(target_vendor = "apple"))))]
        (RawContext::Egl(ctx), RawDisplay::Egl(dpy)) => Ok(InteropProperties::new()
            .with(CL_GL_CONTEXT_KHR, ctx as isize)
            .with(CL_EGL_DISPLAY_KHR, dpy as isize)),

        #[cfg(windows)]
        (RawContext::Wgl(ctx), _) => {
            let hdc = unsafe { wglGetCurrentDC() };
            Ok(InteropProperties::new()
                .with(CL_GL_CONTEXT_KHR, ctx as isize)
                .with(CL_WGL_HDC_KHR, hdc as isize))
        }

        #[cfg(target_os = "macos")]
        (RawContext::Cgl(ctx), _) => {
            let group = unsafe { CGLGetShareGroup(ctx as *mut std::ffi::c_void) };
            Ok(InteropProperties::new().with(CL_CONTEXT_PROPERTY_USE_CGL_SHAREGROUP_APPLE, group as isize))
        }

        _ => Err(Error::InteropUnavailable(
            "unsupported GL platform for cl_gl sharing".to_string(),
        )),
    }
}
