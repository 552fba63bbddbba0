//! Test doubles and common utilities for adapter contract tests
//!
//! The mock device keeps real (if simplified) remote-side state so the tests
//! can assert on outcomes, and supports scripted failures on the Nth call of
//! any method to exercise the compensation paths.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use lbsync_core::config::{AdapterConfig, DeviceConfig};
use lbsync_core::traits::{DeviceClient, DeviceError, DeviceResult};

/// Remote-side state of one listener
#[derive(Debug, Default, Clone)]
pub struct ListenerState {
    pub listen: BTreeSet<String>,
    pub log_format: Option<String>,
    pub log_destination: Option<String>,
    pub log_enabled: Option<bool>,
}

/// Remote-side state of one protection object
#[derive(Debug, Default, Clone)]
pub struct ProtectionState {
    pub allowed: Vec<String>,
    pub banned: Vec<String>,
}

#[derive(Debug, Default)]
struct DeviceState {
    listeners: HashMap<String, ListenerState>,
    /// Traffic groups and their enabled flag
    groups: HashMap<String, bool>,
    protections: HashMap<String, ProtectionState>,
    /// (account_id, lb_id) pairs whose throttle config was zeroed
    throttle_zeroed: Vec<(u32, u32)>,
}

/// A mock device with scripted failures and a per-method call log
#[derive(Clone, Default)]
pub struct MockDevice {
    state: Arc<Mutex<DeviceState>>,
    calls: Arc<Mutex<Vec<&'static str>>>,
    counts: Arc<Mutex<HashMap<&'static str, usize>>>,
    failures: Arc<Mutex<HashMap<&'static str, (usize, DeviceError)>>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a listener listening on the given (enabled) traffic groups
    pub fn with_listener(self, name: &str, groups: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let listener = state.listeners.entry(name.to_string()).or_default();
            for group in groups {
                listener.listen.insert(group.to_string());
            }
            for group in groups {
                state.groups.insert(group.to_string(), true);
            }
        }
        self
    }

    /// Seed an existing protection object
    pub fn with_protection(self, name: &str, allowed: &[&str], banned: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.protections.insert(
                name.to_string(),
                ProtectionState {
                    allowed: allowed.iter().map(|a| a.to_string()).collect(),
                    banned: banned.iter().map(|a| a.to_string()).collect(),
                },
            );
        }
        self
    }

    /// Fail the `nth` call (1-based) of `method` with `err`
    pub fn fail_on(&self, method: &'static str, nth: usize, err: DeviceError) {
        self.failures.lock().unwrap().insert(method, (nth, err));
    }

    /// Every device call issued, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// How many times `method` was called
    pub fn call_count(&self, method: &'static str) -> usize {
        self.counts.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    /// Current listen-set of a listener, if it exists
    pub fn listen_set(&self, listener: &str) -> Option<BTreeSet<String>> {
        self.state
            .lock()
            .unwrap()
            .listeners
            .get(listener)
            .map(|l| l.listen.clone())
    }

    pub fn group_exists(&self, name: &str) -> bool {
        self.state.lock().unwrap().groups.contains_key(name)
    }

    pub fn group_enabled(&self, name: &str) -> Option<bool> {
        self.state.lock().unwrap().groups.get(name).copied()
    }

    pub fn protection(&self, name: &str) -> Option<ProtectionState> {
        self.state.lock().unwrap().protections.get(name).cloned()
    }

    pub fn throttle_zeroed(&self) -> Vec<(u32, u32)> {
        self.state.lock().unwrap().throttle_zeroed.clone()
    }

    pub fn listener_state(&self, listener: &str) -> Option<ListenerState> {
        self.state.lock().unwrap().listeners.get(listener).cloned()
    }

    /// Record the call and fail it if a failure is scheduled for this
    /// occurrence
    fn track(&self, method: &'static str) -> DeviceResult<()> {
        self.calls.lock().unwrap().push(method);

        let occurrence = {
            let mut counts = self.counts.lock().unwrap();
            let n = counts.entry(method).or_insert(0);
            *n += 1;
            *n
        };

        if let Some((nth, err)) = self.failures.lock().unwrap().get(method)
            && *nth == occurrence
        {
            return Err(err.clone());
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl DeviceClient for MockDevice {
    async fn listen_groups(&self, listener: &str) -> DeviceResult<BTreeSet<String>> {
        self.track("listen_groups")?;
        self.state
            .lock()
            .unwrap()
            .listeners
            .get(listener)
            .map(|l| l.listen.clone())
            .ok_or_else(|| DeviceError::not_found(listener))
    }

    async fn set_listen_groups(
        &self,
        listener: &str,
        groups: &BTreeSet<String>,
    ) -> DeviceResult<()> {
        self.track("set_listen_groups")?;
        let mut state = self.state.lock().unwrap();
        let entry = state
            .listeners
            .get_mut(listener)
            .ok_or_else(|| DeviceError::not_found(listener))?;
        entry.listen = groups.clone();
        Ok(())
    }

    async fn add_listen_groups(
        &self,
        listener: &str,
        groups: &BTreeSet<String>,
    ) -> DeviceResult<()> {
        self.track("add_listen_groups")?;
        let mut state = self.state.lock().unwrap();
        for group in groups {
            state.groups.entry(group.clone()).or_insert(true);
        }
        let entry = state.listeners.entry(listener.to_string()).or_default();
        entry.listen.extend(groups.iter().cloned());
        Ok(())
    }

    async fn set_groups_enabled(&self, groups: &[String], enabled: bool) -> DeviceResult<()> {
        self.track("set_groups_enabled")?;
        let mut state = self.state.lock().unwrap();
        for group in groups {
            state.groups.insert(group.clone(), enabled);
        }
        Ok(())
    }

    async fn delete_groups(&self, groups: &[String]) -> DeviceResult<()> {
        self.track("delete_groups")?;
        let mut state = self.state.lock().unwrap();
        for group in groups {
            state.groups.remove(group);
        }
        Ok(())
    }

    async fn create_protection(&self, name: &str) -> DeviceResult<bool> {
        self.track("create_protection")?;
        let mut state = self.state.lock().unwrap();
        if state.protections.contains_key(name) {
            return Ok(false);
        }
        state
            .protections
            .insert(name.to_string(), ProtectionState::default());
        Ok(true)
    }

    async fn allowed_addresses(&self, name: &str) -> DeviceResult<Vec<String>> {
        self.track("allowed_addresses")?;
        self.state
            .lock()
            .unwrap()
            .protections
            .get(name)
            .map(|p| p.allowed.clone())
            .ok_or_else(|| DeviceError::not_found(name))
    }

    async fn set_allowed_addresses(&self, name: &str, addresses: &[String]) -> DeviceResult<()> {
        self.track("set_allowed_addresses")?;
        let mut state = self.state.lock().unwrap();
        let entry = state
            .protections
            .get_mut(name)
            .ok_or_else(|| DeviceError::not_found(name))?;
        entry.allowed = addresses.to_vec();
        Ok(())
    }

    async fn remove_allowed_addresses(
        &self,
        name: &str,
        addresses: &[String],
    ) -> DeviceResult<()> {
        self.track("remove_allowed_addresses")?;
        let mut state = self.state.lock().unwrap();
        let entry = state
            .protections
            .get_mut(name)
            .ok_or_else(|| DeviceError::not_found(name))?;
        entry.allowed.retain(|a| !addresses.contains(a));
        Ok(())
    }

    async fn banned_addresses(&self, name: &str) -> DeviceResult<Vec<String>> {
        self.track("banned_addresses")?;
        self.state
            .lock()
            .unwrap()
            .protections
            .get(name)
            .map(|p| p.banned.clone())
            .ok_or_else(|| DeviceError::not_found(name))
    }

    async fn set_banned_addresses(&self, name: &str, addresses: &[String]) -> DeviceResult<()> {
        self.track("set_banned_addresses")?;
        let mut state = self.state.lock().unwrap();
        let entry = state
            .protections
            .get_mut(name)
            .ok_or_else(|| DeviceError::not_found(name))?;
        entry.banned = addresses.to_vec();
        Ok(())
    }

    async fn remove_banned_addresses(&self, name: &str, addresses: &[String]) -> DeviceResult<()> {
        self.track("remove_banned_addresses")?;
        let mut state = self.state.lock().unwrap();
        let entry = state
            .protections
            .get_mut(name)
            .ok_or_else(|| DeviceError::not_found(name))?;
        entry.banned.retain(|a| !addresses.contains(a));
        Ok(())
    }

    async fn delete_protection(&self, name: &str) -> DeviceResult<()> {
        self.track("delete_protection")?;
        let mut state = self.state.lock().unwrap();
        state
            .protections
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| DeviceError::not_found(name))
    }

    async fn zero_throttle_config(&self, account_id: u32, lb_id: u32) -> DeviceResult<()> {
        self.track("zero_throttle_config")?;
        self.state
            .lock()
            .unwrap()
            .throttle_zeroed
            .push((account_id, lb_id));
        Ok(())
    }

    async fn set_log_format(&self, listener: &str, format: &str) -> DeviceResult<()> {
        self.track("set_log_format")?;
        let mut state = self.state.lock().unwrap();
        let entry = state
            .listeners
            .get_mut(listener)
            .ok_or_else(|| DeviceError::not_found(listener))?;
        entry.log_format = Some(format.to_string());
        Ok(())
    }

    async fn set_log_destination(&self, listener: &str, destination: &str) -> DeviceResult<()> {
        self.track("set_log_destination")?;
        let mut state = self.state.lock().unwrap();
        let entry = state
            .listeners
            .get_mut(listener)
            .ok_or_else(|| DeviceError::not_found(listener))?;
        entry.log_destination = Some(destination.to_string());
        Ok(())
    }

    async fn set_log_enabled(&self, listener: &str, enabled: bool) -> DeviceResult<()> {
        self.track("set_log_enabled")?;
        let mut state = self.state.lock().unwrap();
        let entry = state
            .listeners
            .get_mut(listener)
            .ok_or_else(|| DeviceError::not_found(listener))?;
        entry.log_enabled = Some(enabled);
        Ok(())
    }

    fn device_name(&self) -> &'static str {
        "mock"
    }
}

/// Remote log path used by the test configuration
pub const TEST_LOG_LOCATION: &str = "/var/log/lb/%v.log";

/// Helper to create a minimal AdapterConfig for testing
pub fn test_config() -> AdapterConfig {
    AdapterConfig {
        device: DeviceConfig::Rest {
            endpoint: "https://vtm.test:9070".to_string(),
            username: "admin".to_string(),
            password: "test-password".to_string(),
            timeout_secs: None,
        },
        log_file_location: TEST_LOG_LOCATION.to_string(),
    }
}
