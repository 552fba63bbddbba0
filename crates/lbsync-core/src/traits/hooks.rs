//! Provisioning side-effect hooks
//!
//! Some devices couple otherwise-independent settings: on the appliance this
//! adapter was written for, a freshly created protection object inherits a
//! stale connection-throttle state that must be cleared before the object is
//! usable. That coupling is account-specific policy rather than core
//! reconciliation logic, so it is injected as a strategy.

use async_trait::async_trait;

use crate::error::Result;
use crate::traits::device_client::DeviceClient;

/// Side effects fired at provisioning milestones
#[async_trait]
pub trait ProvisionHooks: Send + Sync {
    /// Called exactly once, immediately after a protection object is first
    /// created on the device
    ///
    /// Never called when creation detects an already-existing object.
    async fn protection_created(
        &self,
        device: &dyn DeviceClient,
        account_id: u32,
        lb_id: u32,
    ) -> Result<()>;
}

/// Default hook: clear the device's coupled connection-throttle settings
///
/// A protection object created on the device otherwise inherits a
/// conflicting throttle state from whatever previously held its name.
pub struct ThrottleReset;

#[async_trait]
impl ProvisionHooks for ThrottleReset {
    async fn protection_created(
        &self,
        device: &dyn DeviceClient,
        account_id: u32,
        lb_id: u32,
    ) -> Result<()> {
        device.zero_throttle_config(account_id, lb_id).await?;
        Ok(())
    }
}

/// No-op hooks for devices without coupled throttle state
pub struct NoHooks;

#[async_trait]
impl ProvisionHooks for NoHooks {
    async fn protection_created(
        &self,
        _device: &dyn DeviceClient,
        _account_id: u32,
        _lb_id: u32,
    ) -> Result<()> {
        Ok(())
    }
}
