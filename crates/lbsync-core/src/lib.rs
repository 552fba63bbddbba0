// # lbsync-core
//
// Core library for reconciling a logical load-balancer configuration against
// a remote, non-transactional traffic-management device.
//
// ## Architecture Overview
//
// - **DeviceClient**: trait for the device's control API (the only way the
//   core touches remote state)
// - **VirtualServiceAdapter**: the reconciliation operations — virtual-IP
//   bindings, access lists, connection logging — each owning its own
//   rollback behavior
// - **NamingScheme** / **ProvisionHooks**: injected capability set; the
//   defaults are account-scoped naming and the throttle-clearing creation
//   hook
//
// ## Design Principles
//
// 1. **Single attempt**: no call is retried; failure paths perform at most
//    one best-effort compensation and always surface the original cause
// 2. **Explicit error kinds**: the device contract reports NotFound/InUse as
//    enum variants, never as downcastable exception types
// 3. **Pure set computation**: listen-set differences are computed from
//    names, never from positional state, and never by mutating shared
//    collections

pub mod adapter;
pub mod config;
pub mod error;
pub mod model;
pub mod naming;
pub mod traits;

// Re-export core types for convenience
pub use adapter::VirtualServiceAdapter;
pub use config::{AdapterConfig, DeviceConfig};
pub use error::{Error, Result};
pub use model::{AccessListEntry, AccessListKind, LoadBalancer};
pub use naming::{AccountNaming, NamingScheme};
pub use traits::{DeviceClient, DeviceClientFactory, DeviceError, ProvisionHooks};
