// # Device Client Trait
//
// Defines the interface to the remote traffic-management device's control API.
//
// ## Implementations
//
// - VTM REST appliance: `lbsync-device-vtm` crate
// - Test double: `tests/common/mod.rs`
//
// ## Error reporting
//
// Every call returns `Result<_, DeviceError>` with an explicit error-kind
// enumeration. Callers branch on the kind, never on a downcast type:
//
// ```rust,ignore
// match device.delete_protection(&name).await {
//     Err(DeviceError::NotFound(_)) => { /* already gone */ }
//     Err(DeviceError::InUse(_)) => { /* still referenced */ }
//     other => other?,
// }
// ```

use std::collections::BTreeSet;

use async_trait::async_trait;
use thiserror::Error;

/// Failure kinds reported by the device control API
///
/// `NotFound` and `InUse` are semantic conditions the device distinguishes;
/// everything else (network, serialization, unexpected responses) collapses
/// into `Transport`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The call could not be completed
    #[error("transport failure: {0}")]
    Transport(String),

    /// The targeted object does not exist on the device
    #[error("object does not exist: {0}")]
    NotFound(String),

    /// The targeted object is still referenced by another device object
    #[error("object is in use: {0}")]
    InUse(String),
}

impl DeviceError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a "does not exist" error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create an "in use" error
    pub fn in_use(name: impl Into<String>) -> Self {
        Self::InUse(name.into())
    }
}

/// Result type alias for device calls
pub type DeviceResult<T> = std::result::Result<T, DeviceError>;

/// Call surface of the remote traffic-management device
///
/// All calls are synchronous from the adapter's point of view: each is
/// awaited to completion before the next is issued. Implementations must not
/// retry internally; the adapter performs exactly one attempt per call plus,
/// where defined, one compensating attempt.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait DeviceClient: Send + Sync {
    /// Fetch the set of traffic-group names a listener currently listens on
    ///
    /// The device reports this set unordered and without duplicates.
    async fn listen_groups(&self, listener: &str) -> DeviceResult<BTreeSet<String>>;

    /// Replace a listener's listen-set in a single call
    async fn set_listen_groups(
        &self,
        listener: &str,
        groups: &BTreeSet<String>,
    ) -> DeviceResult<()>;

    /// Additively attach traffic groups to a listener
    ///
    /// Creates each named group if it does not exist yet and extends the
    /// listener's listen-set. Idempotent: attaching a group twice is a no-op.
    async fn add_listen_groups(
        &self,
        listener: &str,
        groups: &BTreeSet<String>,
    ) -> DeviceResult<()>;

    /// Enable or disable a set of traffic groups
    async fn set_groups_enabled(&self, groups: &[String], enabled: bool) -> DeviceResult<()>;

    /// Delete a set of traffic groups
    async fn delete_groups(&self, groups: &[String]) -> DeviceResult<()>;

    /// Create a protection object, reporting whether it was newly created
    ///
    /// Idempotent: returns `Ok(false)` when the object already existed.
    async fn create_protection(&self, name: &str) -> DeviceResult<bool>;

    /// Fetch a protection object's allow-list
    async fn allowed_addresses(&self, name: &str) -> DeviceResult<Vec<String>>;

    /// Replace a protection object's allow-list
    async fn set_allowed_addresses(&self, name: &str, addresses: &[String]) -> DeviceResult<()>;

    /// Remove entries from a protection object's allow-list
    async fn remove_allowed_addresses(&self, name: &str, addresses: &[String])
    -> DeviceResult<()>;

    /// Fetch a protection object's deny-list
    async fn banned_addresses(&self, name: &str) -> DeviceResult<Vec<String>>;

    /// Replace a protection object's deny-list
    async fn set_banned_addresses(&self, name: &str, addresses: &[String]) -> DeviceResult<()>;

    /// Remove entries from a protection object's deny-list
    async fn remove_banned_addresses(&self, name: &str, addresses: &[String]) -> DeviceResult<()>;

    /// Delete a protection object
    ///
    /// Fails with `DeviceError::NotFound` when the object does not exist and
    /// `DeviceError::InUse` when another device object still references it.
    async fn delete_protection(&self, name: &str) -> DeviceResult<()>;

    /// Zero out the connection-throttle settings coupled to a load balancer's
    /// protection object
    async fn zero_throttle_config(&self, account_id: u32, lb_id: u32) -> DeviceResult<()>;

    /// Set a listener's connection-log format string
    async fn set_log_format(&self, listener: &str, format: &str) -> DeviceResult<()>;

    /// Set the file the device writes a listener's connection log to
    async fn set_log_destination(&self, listener: &str, destination: &str) -> DeviceResult<()>;

    /// Enable or disable a listener's connection logging
    async fn set_log_enabled(&self, listener: &str, enabled: bool) -> DeviceResult<()>;

    /// Get the device client name (for logging/debugging)
    fn device_name(&self) -> &'static str;
}

/// Helper trait for constructing device clients from configuration
pub trait DeviceClientFactory: Send + Sync {
    /// Create a DeviceClient instance from configuration
    fn create(
        &self,
        config: &crate::config::DeviceConfig,
    ) -> crate::error::Result<Box<dyn DeviceClient>>;
}
