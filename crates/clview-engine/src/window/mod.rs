//! The window facade.
//!
//! Owns the winit event loop and a [`GlSession`]. Events are pumped on demand
//! from [`ClWindow::should_close`], so the caller keeps the render loop.

mod cl_window;
mod config;
mod pump;

pub use cl_window::{ClWindow, GlSession};
pub use config::WindowConfig;
