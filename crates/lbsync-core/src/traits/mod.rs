//! Core traits for the adapter
//!
//! - [`DeviceClient`]: call surface of the remote traffic-management device
//! - [`ProvisionHooks`]: injected side effects fired at provisioning milestones

pub mod device_client;
pub mod hooks;

pub use device_client::{DeviceClient, DeviceClientFactory, DeviceError, DeviceResult};
pub use hooks::{NoHooks, ProvisionHooks, ThrottleReset};
