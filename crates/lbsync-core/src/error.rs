//! Error types for the adapter core.
//!
//! This module defines the failure taxonomy every adapter operation reports.

use thiserror::Error;

use crate::traits::device_client::DeviceError;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for adapter operations
#[derive(Error, Debug)]
pub enum Error {
    /// The remote call could not be completed (network/serialization)
    #[error("device transport error: {0}")]
    Transport(String),

    /// The targeted remote object does not exist
    #[error("remote object does not exist: {0}")]
    NotFound(String),

    /// The targeted remote object cannot be deleted due to a live dependency
    #[error("remote object is in use: {0}")]
    InUse(String),

    /// Failure reported after a compensating action was attempted
    ///
    /// The original cause is attached as the error source and is never
    /// replaced by a failure of the compensation itself.
    #[error("{message}")]
    Rollback {
        /// What was canceled
        message: String,
        /// The failure that triggered the compensation
        #[source]
        source: Box<Error>,
    },

    /// Rejected input, detected before any remote call was issued
    #[error("validation failed: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a rollback error wrapping the failure that triggered compensation
    pub fn rollback(message: impl Into<String>, cause: impl Into<Error>) -> Self {
        Self::Rollback {
            message: message.into(),
            source: Box::new(cause.into()),
        }
    }

    /// Whether this error was raised after a compensating action
    pub fn is_rollback(&self) -> bool {
        matches!(self, Self::Rollback { .. })
    }
}

impl From<DeviceError> for Error {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::Transport(msg) => Self::Transport(msg),
            DeviceError::NotFound(name) => Self::NotFound(name),
            DeviceError::InUse(name) => Self::InUse(name),
        }
    }
}

/// Helper for converting anyhow::Error from custom device clients
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
