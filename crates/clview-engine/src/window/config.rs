use winit::dpi::LogicalSize;

use crate::device::DevicePolicy;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Requested core-profile GL version.
    pub gl_version: (u8, u8),
    pub device_policy: DevicePolicy,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "default".to_string(),
            initial_size: LogicalSize::new(500.0, 500.0),
            gl_version: (3, 3),
            device_policy: DevicePolicy::Last,
        }
    }
}

impl WindowConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.initial_size = LogicalSize::new(width as f64, height as f64);
        self
    }

    pub fn with_gl_version(mut self, major: u8, minor: u8) -> Self {
        self.gl_version = (major, minor);
        self
    }

    pub fn with_device_policy(mut self, policy: DevicePolicy) -> Self {
        self.device_policy = policy;
        self
    }
}
