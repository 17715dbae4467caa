use crate::compute::{ComputeRuntime, DeviceInfo};
use crate::error::{Error, Result};

use super::policy::SelectionPolicy;

/// Version tokens accepted for a platform, most preferred first.
///
/// The last tier is the minimum supported major version.
pub const PLATFORM_TIERS: [&str; 2] = ["OpenCL 3.", "OpenCL 2."];

/// Extensions that allow a context to share objects with GL.
const GL_SHARING_EXTENSIONS: [&str; 2] = ["cl_khr_gl_sharing", "cl_APPLE_gl_sharing"];

/// The selected compute device.
///
/// Selected once per session and never changed afterwards.
pub struct ComputeDevice<R: ComputeRuntime> {
    device: R::Device,
    info: DeviceInfo,
    platform_version: String,
}

impl<R: ComputeRuntime> ComputeDevice<R> {
    pub fn handle(&self) -> &R::Device {
        &self.device
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn extensions(&self) -> &str {
        &self.info.extensions
    }

    /// Version string of the owning platform.
    pub fn platform_version(&self) -> &str {
        &self.platform_version
    }
}

/// Returns the index of the platform to use given each platform's version string.
///
/// A platform of a newer tier always beats an older one; within a tier the
/// first platform seen wins.
pub fn select_platform<S: AsRef<str>>(versions: &[S]) -> Option<usize> {
    PLATFORM_TIERS
        .iter()
        .find_map(|tier| versions.iter().position(|v| v.as_ref().contains(tier)))
}

/// Probes the runtime and picks the platform + GPU device for the session.
pub fn select_device<R: ComputeRuntime>(
    runtime: &R,
    policy: &dyn SelectionPolicy,
) -> Result<ComputeDevice<R>> {
    let mut platforms = runtime
        .platforms()
        .map_err(|code| Error::PlatformQuery { code })?;

    let versions: Vec<String> = platforms
        .iter()
        .map(|p| {
            runtime.platform_version(p).unwrap_or_else(|code| {
                log::warn!("failed to read platform version (code {code}); skipping platform");
                String::new()
            })
        })
        .collect();

    let index = select_platform(&versions).ok_or(Error::NoCompatiblePlatform)?;
    let platform = platforms.swap_remove(index);
    let platform_version = versions[index].clone();
    log::info!("selected platform: {platform_version}");

    let mut devices = runtime
        .gpu_devices(&platform)
        .map_err(|code| Error::PlatformQuery { code })?;

    let infos = devices
        .iter()
        .map(|d| runtime.device_info(d))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|code| Error::PlatformQuery { code })?;

    let chosen = policy
        .choose(&infos)
        .ok_or_else(|| Error::NoCompatibleDevice { platform: platform_version.clone() })?;

    let device = devices.swap_remove(chosen);
    let info = infos
        .into_iter()
        .nth(chosen)
        .unwrap_or_default();

    log::info!("selected device {} ({} of {})", info.name, chosen + 1, devices.len() + 1);
    log::info!("device extensions: {}", info.extensions);

    if !GL_SHARING_EXTENSIONS.iter().any(|e| info.supports(e)) {
        log::warn!("device {} does not advertise GL sharing; context creation may fail", info.name);
    }

    Ok(ComputeDevice {
        device,
        info,
        platform_version,
    })
}
