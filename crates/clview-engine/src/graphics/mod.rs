//! Graphics-side seam.
//!
//! The session only needs three things from GL: an off-screen framebuffer
//! backed by a shareable renderbuffer, a blit of that framebuffer onto the
//! default one, and deletion. [`gl`] implements them on `glow`.

pub mod gl;

use crate::error::StatusCode;

pub use gl::GlGraphics;

/// Graphics operations used by the shared render target and the present step.
///
/// Implementations are cheap handles (`Clone`) onto one GL context so that
/// owned GL objects can delete themselves.
pub trait GraphicsApi: Clone {
    type Framebuffer: Copy;
    type Renderbuffer: Copy;

    /// Creates a framebuffer object whose color attachment 0 is a new
    /// `width × height` RGBA32F renderbuffer.
    ///
    /// Fails with the GL error, or the framebuffer status if incomplete.
    fn create_render_target(
        &self,
        width: u32,
        height: u32,
    ) -> Result<(Self::Framebuffer, Self::Renderbuffer), StatusCode>;

    /// GL object name of `renderbuffer`, as handed to the compute runtime.
    fn renderbuffer_name(&self, renderbuffer: Self::Renderbuffer) -> u32;

    /// Clears the default framebuffer, then copies `source` onto it with
    /// nearest filtering over the full `width × height` rectangle.
    fn blit_to_default(&self, source: Self::Framebuffer, width: u32, height: u32);

    fn delete_render_target(&self, framebuffer: Self::Framebuffer, renderbuffer: Self::Renderbuffer);
}
