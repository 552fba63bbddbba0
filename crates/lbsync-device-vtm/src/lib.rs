// # VTM REST Device Client
//
// This crate implements the `DeviceClient` contract over the REST control
// API of a virtual-traffic-manager appliance.
//
// ## API Reference
//
// All configuration lives under `/api/tm/7.0/config/active/`:
//
// - Virtual servers: GET/PUT `virtual_servers/{name}` —
//   `properties.basic.listen_on_traffic_ips`, `properties.log.{format,
//   filename, enabled}`
// - Traffic IP groups: PUT `traffic_ip_groups/{name}` (create or update,
//   `properties.basic.enabled`), DELETE `traffic_ip_groups/{name}`
// - Protection classes: GET/PUT/DELETE `protection/{name}` —
//   `properties.access_restriction.{allowed, banned}`,
//   `properties.connection_limiting`
//
// PUT creates the object when it does not exist (201) and updates it
// otherwise (200); that distinction backs `create_protection`'s `created`
// flag. The appliance has no partial-update primitive for address lists, so
// removal is composed client-side: fetch, subtract, PUT the remainder.
//
// ## Error mapping
//
// - HTTP 404 → `DeviceError::NotFound`
// - HTTP 409 → `DeviceError::InUse` (object still referenced)
// - connect/serialize failures and every other status → `DeviceError::Transport`
//
// ## Security
//
// The administrative password never appears in logs or Debug output.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use lbsync_core::config::DeviceConfig;
use lbsync_core::naming;
use lbsync_core::traits::{DeviceClient, DeviceClientFactory, DeviceError, DeviceResult};
use lbsync_core::{Error, Result};

/// Path of the active configuration tree on the appliance
const CONFIG_BASE: &str = "api/tm/7.0/config/active";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// REST client for a virtual-traffic-manager appliance
pub struct VtmClient {
    /// Base URL of the control API, without a trailing slash
    endpoint: String,

    /// Administrative user
    username: String,

    /// Administrative password
    /// ⚠️ NEVER log this value
    password: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the password
impl std::fmt::Debug for VtmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VtmClient")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

impl VtmClient {
    /// Create a new client for the appliance at `endpoint`
    ///
    /// # Parameters
    ///
    /// - `endpoint`: base URL of the control API
    ///   (e.g. "https://vtm1.example.net:9070")
    /// - `username` / `password`: administrative credentials
    /// - `timeout_secs`: request timeout; defaults to 30 seconds
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        timeout_secs: Option<u64>,
    ) -> Self {
        let timeout = timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_HTTP_TIMEOUT);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
            client,
        }
    }

    fn url(&self, class: &str, name: &str) -> String {
        format!("{}/{}/{}/{}", self.endpoint, CONFIG_BASE, class, name)
    }

    /// GET an object's configuration document
    async fn get_json(&self, class: &str, name: &str) -> DeviceResult<Value> {
        let response = self
            .client
            .get(self.url(class, name))
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| DeviceError::transport(format!("GET {class}/{name}: {e}")))?;

        let response = check_status(class, name, response).await?;

        response
            .json()
            .await
            .map_err(|e| DeviceError::transport(format!("GET {class}/{name}: {e}")))
    }

    /// PUT an object's configuration document, returning the response status
    async fn put_json(
        &self,
        class: &str,
        name: &str,
        body: &Value,
    ) -> DeviceResult<reqwest::StatusCode> {
        let response = self
            .client
            .put(self.url(class, name))
            .basic_auth(&self.username, Some(&self.password))
            .json(body)
            .send()
            .await
            .map_err(|e| DeviceError::transport(format!("PUT {class}/{name}: {e}")))?;

        let response = check_status(class, name, response).await?;
        Ok(response.status())
    }

    /// DELETE an object
    async fn delete(&self, class: &str, name: &str) -> DeviceResult<()> {
        let response = self
            .client
            .delete(self.url(class, name))
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| DeviceError::transport(format!("DELETE {class}/{name}: {e}")))?;

        check_status(class, name, response).await?;
        Ok(())
    }
}

/// Map non-success statuses into device error kinds
async fn check_status(
    class: &str,
    name: &str,
    response: reqwest::Response,
) -> DeviceResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unreadable response body".to_string());

    Err(match status.as_u16() {
        404 => DeviceError::not_found(format!("{class}/{name}")),
        409 => DeviceError::in_use(format!("{class}/{name}")),
        _ => DeviceError::transport(format!("{class}/{name}: {status} - {body}")),
    })
}

/// Document replacing a virtual server's listen-set
fn listen_ips_payload(groups: &BTreeSet<String>) -> Value {
    json!({
        "properties": {
            "basic": {
                "listen_on_traffic_ips": groups.iter().collect::<Vec<_>>()
            }
        }
    })
}

/// Extract a virtual server's listen-set from its configuration document
fn parse_listen_ips(doc: &Value) -> DeviceResult<BTreeSet<String>> {
    let ips = doc["properties"]["basic"]["listen_on_traffic_ips"]
        .as_array()
        .ok_or_else(|| {
            DeviceError::transport("unexpected document shape: listen_on_traffic_ips missing")
        })?;

    Ok(ips
        .iter()
        .filter_map(|v| v.as_str())
        .map(|s| s.to_string())
        .collect())
}

/// Document creating or toggling a traffic IP group
fn group_enabled_payload(enabled: bool) -> Value {
    json!({
        "properties": {
            "basic": { "enabled": enabled }
        }
    })
}

/// Document replacing one of a protection class's address lists
fn addresses_payload(list: &str, addresses: &[String]) -> Value {
    json!({
        "properties": {
            "access_restriction": { list: addresses }
        }
    })
}

/// Extract one of a protection class's address lists
///
/// The appliance omits empty lists from the document.
fn parse_addresses(doc: &Value, list: &str) -> Vec<String> {
    doc["properties"]["access_restriction"][list]
        .as_array()
        .map(|values| {
            values
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Document zeroing a protection class's connection-limiting settings
fn zeroed_throttle_payload() -> Value {
    json!({
        "properties": {
            "connection_limiting": {
                "max_connection_rate": 0,
                "max_concurrent_connections": 0,
                "min_connections": 0
            }
        }
    })
}

/// Document updating one scalar of a virtual server's log section
fn log_payload(key: &str, value: Value) -> Value {
    json!({
        "properties": {
            "log": { key: value }
        }
    })
}

#[async_trait]
impl DeviceClient for VtmClient {
    async fn listen_groups(&self, listener: &str) -> DeviceResult<BTreeSet<String>> {
        let doc = self.get_json("virtual_servers", listener).await?;
        parse_listen_ips(&doc)
    }

    async fn set_listen_groups(
        &self,
        listener: &str,
        groups: &BTreeSet<String>,
    ) -> DeviceResult<()> {
        self.put_json("virtual_servers", listener, &listen_ips_payload(groups))
            .await?;
        Ok(())
    }

    async fn add_listen_groups(
        &self,
        listener: &str,
        groups: &BTreeSet<String>,
    ) -> DeviceResult<()> {
        // Create-or-reuse each group, enabled
        for group in groups {
            self.put_json("traffic_ip_groups", group, &group_enabled_payload(true))
                .await?;
        }

        // Extend the listen-set; a PUT of the union keeps the call additive
        let current = self.listen_groups(listener).await?;
        let merged: BTreeSet<String> = current.union(groups).cloned().collect();
        if merged == current {
            tracing::debug!("listen-set of '{listener}' already contains every group");
            return Ok(());
        }

        self.set_listen_groups(listener, &merged).await
    }

    async fn set_groups_enabled(&self, groups: &[String], enabled: bool) -> DeviceResult<()> {
        for group in groups {
            self.put_json("traffic_ip_groups", group, &group_enabled_payload(enabled))
                .await?;
        }
        Ok(())
    }

    async fn delete_groups(&self, groups: &[String]) -> DeviceResult<()> {
        for group in groups {
            self.delete("traffic_ip_groups", group).await?;
        }
        Ok(())
    }

    async fn create_protection(&self, name: &str) -> DeviceResult<bool> {
        let status = self
            .put_json("protection", name, &json!({ "properties": {} }))
            .await?;
        Ok(status == reqwest::StatusCode::CREATED)
    }

    async fn allowed_addresses(&self, name: &str) -> DeviceResult<Vec<String>> {
        let doc = self.get_json("protection", name).await?;
        Ok(parse_addresses(&doc, "allowed"))
    }

    async fn set_allowed_addresses(&self, name: &str, addresses: &[String]) -> DeviceResult<()> {
        self.put_json("protection", name, &addresses_payload("allowed", addresses))
            .await?;
        Ok(())
    }

    async fn remove_allowed_addresses(
        &self,
        name: &str,
        addresses: &[String],
    ) -> DeviceResult<()> {
        let current = self.allowed_addresses(name).await?;
        let remaining: Vec<String> = current
            .into_iter()
            .filter(|a| !addresses.contains(a))
            .collect();
        self.set_allowed_addresses(name, &remaining).await
    }

    async fn banned_addresses(&self, name: &str) -> DeviceResult<Vec<String>> {
        let doc = self.get_json("protection", name).await?;
        Ok(parse_addresses(&doc, "banned"))
    }

    async fn set_banned_addresses(&self, name: &str, addresses: &[String]) -> DeviceResult<()> {
        self.put_json("protection", name, &addresses_payload("banned", addresses))
            .await?;
        Ok(())
    }

    async fn remove_banned_addresses(&self, name: &str, addresses: &[String]) -> DeviceResult<()> {
        let current = self.banned_addresses(name).await?;
        let remaining: Vec<String> = current
            .into_iter()
            .filter(|a| !addresses.contains(a))
            .collect();
        self.set_banned_addresses(name, &remaining).await
    }

    async fn delete_protection(&self, name: &str) -> DeviceResult<()> {
        self.delete("protection", name).await
    }

    async fn zero_throttle_config(&self, account_id: u32, lb_id: u32) -> DeviceResult<()> {
        let name = naming::listener_name(account_id, lb_id);
        self.put_json("protection", &name, &zeroed_throttle_payload())
            .await?;
        Ok(())
    }

    async fn set_log_format(&self, listener: &str, format: &str) -> DeviceResult<()> {
        self.put_json("virtual_servers", listener, &log_payload("format", json!(format)))
            .await?;
        Ok(())
    }

    async fn set_log_destination(&self, listener: &str, destination: &str) -> DeviceResult<()> {
        self.put_json(
            "virtual_servers",
            listener,
            &log_payload("filename", json!(destination)),
        )
        .await?;
        Ok(())
    }

    async fn set_log_enabled(&self, listener: &str, enabled: bool) -> DeviceResult<()> {
        self.put_json(
            "virtual_servers",
            listener,
            &log_payload("enabled", json!(enabled)),
        )
        .await?;
        Ok(())
    }

    fn device_name(&self) -> &'static str {
        "vtm-rest"
    }
}

/// Factory for creating VTM clients from configuration
pub struct VtmClientFactory;

impl DeviceClientFactory for VtmClientFactory {
    fn create(&self, config: &DeviceConfig) -> Result<Box<dyn DeviceClient>> {
        match config {
            DeviceConfig::Rest {
                endpoint,
                username,
                password,
                timeout_secs,
            } => {
                config.validate()?;
                Ok(Box::new(VtmClient::new(
                    endpoint,
                    username,
                    password,
                    *timeout_secs,
                )))
            }
            _ => Err(Error::config("invalid config for the VTM REST device client")),
        }
    }
}
