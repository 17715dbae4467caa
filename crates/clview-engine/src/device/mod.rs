//! Compute device selection.
//!
//! This module is responsible for:
//! - choosing the platform by version tier
//! - enumerating the platform's GPU devices
//! - delegating the final pick to a replaceable [`SelectionPolicy`]

mod policy;
mod selector;

pub use policy::{ByIndex, DevicePolicy, LastEnumerated, SelectionPolicy};
pub use selector::{select_device, select_platform, ComputeDevice, PLATFORM_TIERS};
