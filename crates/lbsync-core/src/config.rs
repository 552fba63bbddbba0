//! Configuration types for the adapter
//!
//! This module defines the configuration structures the adapter and its
//! device clients are built from.

use serde::{Deserialize, Serialize};

/// Adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Device endpoint configuration
    pub device: DeviceConfig,

    /// Remote path the device writes connection logs to
    pub log_file_location: String,
}

impl AdapterConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.log_file_location.is_empty() {
            return Err(crate::Error::config("log file location cannot be empty"));
        }

        self.device.validate()
    }
}

/// Device endpoint configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceConfig {
    /// REST control API of a virtual-traffic-manager appliance
    Rest {
        /// Base URL of the control API (e.g. "https://vtm1.example.net:9070")
        endpoint: String,
        /// Administrative user
        username: String,
        /// Administrative password
        password: String,
        /// Request timeout; the client default applies when unset
        timeout_secs: Option<u64>,
    },

    /// Custom device client
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl DeviceConfig {
    /// Validate the device configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            DeviceConfig::Rest {
                endpoint, username, ..
            } => {
                if endpoint.is_empty() {
                    return Err(crate::Error::config("device endpoint cannot be empty"));
                }
                if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                    return Err(crate::Error::config(format!(
                        "device endpoint must be an http(s) URL, got '{endpoint}'"
                    )));
                }
                if username.is_empty() {
                    return Err(crate::Error::config("device username cannot be empty"));
                }
                Ok(())
            }
            DeviceConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "custom device factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config("custom device config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the device type name
    pub fn type_name(&self) -> &str {
        match self {
            DeviceConfig::Rest { .. } => "rest",
            DeviceConfig::Custom { factory, .. } => factory,
        }
    }
}

// The password never appears in Debug output.
impl std::fmt::Debug for DeviceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceConfig::Rest {
                endpoint,
                username,
                timeout_secs,
                ..
            } => f
                .debug_struct("Rest")
                .field("endpoint", endpoint)
                .field("username", username)
                .field("password", &"<REDACTED>")
                .field("timeout_secs", timeout_secs)
                .finish(),
            DeviceConfig::Custom { factory, .. } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .finish_non_exhaustive(),
        }
    }
}
