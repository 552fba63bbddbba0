//! Reconciliation adapter
//!
//! The `VirtualServiceAdapter` is responsible for moving one load balancer's
//! remote-side state to a caller-specified desired state:
//! - Virtual-IP bindings: attach and delete listener-to-traffic-group
//!   associations, with rollback on failed deletion
//! - Access lists: replace a protection object's allow/deny lists
//! - Connection logging: format, destination and enabled flag of a listener
//!
//! ## Call discipline
//!
//! Each operation decomposes into ordered remote calls against a device that
//! offers no transactions. Every call is awaited to completion before the
//! next one is issued; no call is retried. Where a defined compensation
//! exists (VIP deletion), it is attempted exactly once and its own failure is
//! logged but never replaces the original cause.
//!
//! Callers must serialize concurrent operations against the same load
//! balancer; the device offers no optimistic-concurrency tokens, so two
//! interleaved fetch-then-commit sequences on one listener can race.

mod access_list;
mod logging;
mod vips;

pub use logging::{DEFAULT_LOG_FORMAT, HTTP_LOG_FORMAT, PROTOCOL_HTTP};

use crate::config::AdapterConfig;
use crate::error::Result;
use crate::naming::{AccountNaming, NamingScheme};
use crate::traits::{DeviceClient, ProvisionHooks, ThrottleReset};

/// Adapter reconciling one logical load balancer against the remote device
///
/// Construction wires the default capability set: account-scoped naming and
/// the throttle-clearing creation hook. Both can be overridden for devices
/// or accounts with different policies.
pub struct VirtualServiceAdapter {
    /// Device control API
    device: Box<dyn DeviceClient>,

    /// Naming strategy for remote-side objects
    naming: Box<dyn NamingScheme>,

    /// Side effects fired at provisioning milestones
    hooks: Box<dyn ProvisionHooks>,

    /// Remote path the device writes connection logs to
    log_file_location: String,
}

impl VirtualServiceAdapter {
    /// Create a new adapter over the given device client
    pub fn new(device: Box<dyn DeviceClient>, config: &AdapterConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            device,
            naming: Box::new(AccountNaming),
            hooks: Box::new(ThrottleReset),
            log_file_location: config.log_file_location.clone(),
        })
    }

    /// Override the naming strategy
    pub fn with_naming(mut self, naming: Box<dyn NamingScheme>) -> Self {
        self.naming = naming;
        self
    }

    /// Override the provisioning hooks
    pub fn with_hooks(mut self, hooks: Box<dyn ProvisionHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub(crate) fn device(&self) -> &dyn DeviceClient {
        self.device.as_ref()
    }

    pub(crate) fn naming(&self) -> &dyn NamingScheme {
        self.naming.as_ref()
    }

    pub(crate) fn hooks(&self) -> &dyn ProvisionHooks {
        self.hooks.as_ref()
    }

    pub(crate) fn log_file_location(&self) -> &str {
        &self.log_file_location
    }
}
