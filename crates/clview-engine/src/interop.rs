//! Compute context creation bound to the current GL context.

use crate::compute::ComputeRuntime;
use crate::device::ComputeDevice;
use crate::error::{Error, Result};
use crate::surface::Surface;

/// Creates the interop context for `device` and its single execution queue.
///
/// `surface` must own the GL context that is current on this thread; its
/// native handles are what tie the two contexts together.
pub fn create_interop_context<R, S>(
    runtime: &R,
    device: &ComputeDevice<R>,
    surface: &S,
) -> Result<(R::Context, R::Queue)>
where
    R: ComputeRuntime,
    S: Surface,
{
    let properties = surface.interop_properties()?;
    log::debug!("creating interop context with {} properties", properties.pairs().len());

    let context = runtime
        .create_context(device.handle(), &properties)
        .map_err(|code| Error::ContextCreationFailed { code })?;

    // No retry: a session without a queue cannot render anything.
    let queue = runtime
        .create_queue(&context, device.handle())
        .map_err(|code| Error::QueueCreationFailed { code })?;

    log::debug!("interop context and queue ready on {}", device.name());
    Ok((context, queue))
}
