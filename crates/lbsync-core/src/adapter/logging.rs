//! Connection-logging configuration
//!
//! Three ordered writes (format, destination, enabled flag) treated as
//! independent idempotent settings: a partial application is acceptable to
//! leave as-is, so no compensation is attempted — only the error is
//! surfaced.

use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::traits::DeviceError;

use super::VirtualServiceAdapter;

/// The distinguished protocol value that selects the HTTP log format
pub const PROTOCOL_HTTP: &str = "HTTP";

/// Connection-log format used for every protocol other than HTTP
pub const DEFAULT_LOG_FORMAT: &str = "%v %t %h %A:%p %n %B %b %T";

/// HTTP connection-log format, with request line and client headers
pub const HTTP_LOG_FORMAT: &str =
    "%v %{Host}i %h %l %u %t \"%r\" %s %b \"%{Referer}i\" \"%{User-Agent}i\"";

const LOGGING_CANCELED: &str = "update connection logging request canceled";

impl VirtualServiceAdapter {
    /// Configure a listener's connection logging
    ///
    /// The format is keyed on protocol equality with [`PROTOCOL_HTTP`]:
    /// exactly two formats exist, not a per-protocol table. The destination
    /// comes from the adapter configuration. Any failure, including a
    /// missing listener, reports a rollback-class error with no compensation.
    pub async fn update_connection_logging(
        &self,
        account_id: u32,
        lb_id: u32,
        enabled: bool,
        protocol: &str,
    ) -> Result<()> {
        let listener = self.naming().listener_name(account_id, lb_id);

        if enabled {
            debug!("enabling connection logging for listener '{listener}'");
        } else {
            debug!("disabling connection logging for listener '{listener}'");
        }

        let format = if protocol == PROTOCOL_HTTP {
            HTTP_LOG_FORMAT
        } else {
            DEFAULT_LOG_FORMAT
        };

        if let Err(cause) = self.apply_logging(&listener, format, enabled).await {
            if matches!(cause, DeviceError::NotFound(_)) {
                error!("listener '{listener}' does not exist, cannot update connection logging");
            }
            return Err(Error::rollback(LOGGING_CANCELED, cause));
        }

        info!("successfully updated connection logging for listener '{listener}'");
        Ok(())
    }

    async fn apply_logging(
        &self,
        listener: &str,
        format: &str,
        enabled: bool,
    ) -> std::result::Result<(), DeviceError> {
        self.device().set_log_format(listener, format).await?;
        self.device()
            .set_log_destination(listener, self.log_file_location())
            .await?;
        self.device().set_log_enabled(listener, enabled).await
    }
}
