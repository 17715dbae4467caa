//! Presentation surface.
//!
//! Owns the window's drawable and its GL context. Event pumping lives in
//! [`crate::window`]; this layer only answers size queries, exposes the
//! native handles needed for interop, and presents.

mod gl_surface;

use crate::compute::InteropProperties;
use crate::error::Result;

pub use gl_surface::GlSurface;

/// Presentation surface contract used by the session.
pub trait Surface {
    /// Current drawable size in physical pixels.
    fn framebuffer_size(&self) -> (u32, u32);

    /// Context properties that bind a compute context to this surface's
    /// GL context. Only meaningful while that context is current.
    fn interop_properties(&self) -> Result<InteropProperties>;

    fn show(&self);

    fn swap_buffers(&self) -> Result<()>;
}
