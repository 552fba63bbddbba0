//! Domain-facing types the adapter consumes
//!
//! These are read-only projections of the domain layer's entities: the
//! adapter inspects identifying fields and binding sets, it never persists
//! or mutates them.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A logical load balancer's identifying fields and virtual-IP bindings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancer {
    /// Owning account
    pub account_id: u32,

    /// Load balancer id, unique within the account
    pub id: u32,

    /// IPv4 virtual-IP bindings
    #[serde(default)]
    pub virtual_ip_ids: BTreeSet<u32>,

    /// IPv6 virtual-IP bindings
    #[serde(default)]
    pub virtual_ip6_ids: BTreeSet<u32>,
}

impl LoadBalancer {
    /// Create a load balancer reference with no virtual-IP bindings
    pub fn new(account_id: u32, id: u32) -> Self {
        Self {
            account_id,
            id,
            virtual_ip_ids: BTreeSet::new(),
            virtual_ip6_ids: BTreeSet::new(),
        }
    }

    /// Attach IPv4 and IPv6 virtual-IP bindings
    pub fn with_virtual_ips(
        mut self,
        ipv4_ids: BTreeSet<u32>,
        ipv6_ids: BTreeSet<u32>,
    ) -> Self {
        self.virtual_ip_ids = ipv4_ids;
        self.virtual_ip6_ids = ipv6_ids;
        self
    }
}

/// One allow/deny rule of an access list
///
/// A caller-supplied collection of entries is the *complete* desired list;
/// duplicates within a kind are passed through to the device unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessListEntry {
    /// Address or CIDR block the rule applies to
    pub ip_address: String,

    /// Whether the address is allowed or denied
    pub kind: AccessListKind,
}

impl AccessListEntry {
    /// Create an ALLOW entry
    pub fn allow(ip_address: impl Into<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            kind: AccessListKind::Allow,
        }
    }

    /// Create a DENY entry
    pub fn deny(ip_address: impl Into<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            kind: AccessListKind::Deny,
        }
    }
}

/// Rule kind of an access-list entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessListKind {
    /// Address is granted access
    Allow,
    /// Address is banned
    Deny,
}

impl FromStr for AccessListKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "deny" => Ok(Self::Deny),
            other => Err(Error::validation(format!(
                "unsupported access-list rule kind '{other}'"
            ))),
        }
    }
}
