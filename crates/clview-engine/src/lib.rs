//! clview engine crate.
//!
//! Renders a window's framebuffer with an OpenCL kernel: the kernel writes
//! into a GL renderbuffer shared with the compute context, which is then
//! blitted to the window and presented.

pub mod compute;
pub mod device;
pub mod error;
pub mod graphics;
pub mod input;
pub mod interop;
pub mod logging;
pub mod program;
pub mod session;
pub mod surface;
pub mod target;
pub mod window;

#[cfg(test)]
mod mock;

pub use compute::opencl::{MemObject, OpenCl};
pub use compute::KernelArg;
pub use device::DevicePolicy;
pub use error::{Error, FrameCode, Result, StatusCode};
pub use session::{FrameStage, Session};
pub use window::{ClWindow, GlSession, WindowConfig};
