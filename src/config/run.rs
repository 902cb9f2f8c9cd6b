// file: src/config/run.rs
// version: 1.0.0
// guid: c0f085c7-8ac0-40cf-9f66-295259504aba

//! Operator-supplied run configuration

use crate::{BridgeError, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

fn ipv4_shape() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| {
        Regex::new(r"^([0-9]{1,3}\.){3}[0-9]{1,3}$").expect("static IPv4 pattern compiles")
    })
}

/// Check that `input` is four dot-separated groups of one to three digits.
///
/// Only the shape is checked; octet ranges are not.
pub fn is_valid_ipv4_format(input: &str) -> bool {
    ipv4_shape().is_match(input)
}

/// A 16-character hexadecimal overlay network identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NetworkId(String);

impl NetworkId {
    pub const LEN: usize = 16;

    /// Parse operator input; anything that is not 16 hex characters counts as absent
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.len() == Self::LEN && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(Self(trimmed.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configuration collected from the operator once, immutable afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Physical interface enslaved to the bridge (e.g. eth0)
    pub physical_interface: String,
    /// Static address of the bridge
    pub bridge_ip: String,
    pub netmask: String,
    pub gateway: String,
    /// Space-separated DNS servers, written verbatim
    pub dns: String,
    /// Overlay network to join, if any
    pub network_id: Option<NetworkId>,
}

impl RunConfig {
    pub const DEFAULT_INTERFACE: &'static str = "eth0";
    pub const DEFAULT_NETMASK: &'static str = "255.255.255.0";
    pub const DEFAULT_DNS: &'static str = "8.8.8.8 8.8.4.4";

    /// Build a configuration, rejecting malformed addresses
    pub fn new(
        physical_interface: impl Into<String>,
        bridge_ip: impl Into<String>,
        netmask: impl Into<String>,
        gateway: impl Into<String>,
        dns: impl Into<String>,
        network_id: Option<&str>,
    ) -> Result<Self> {
        let config = Self {
            physical_interface: physical_interface.into(),
            bridge_ip: bridge_ip.into(),
            netmask: netmask.into(),
            gateway: gateway.into(),
            dns: dns.into(),
            network_id: network_id.and_then(NetworkId::parse),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the run configuration
    pub fn validate(&self) -> Result<()> {
        if self.physical_interface.trim().is_empty() {
            return Err(BridgeError::validation("Physical interface cannot be empty"));
        }

        if self.physical_interface.contains(char::is_whitespace) {
            return Err(BridgeError::validation(format!(
                "Invalid interface name: {}",
                self.physical_interface
            )));
        }

        for (label, value) in [
            ("bridge IP", &self.bridge_ip),
            ("netmask", &self.netmask),
            ("gateway", &self.gateway),
        ] {
            if !is_valid_ipv4_format(value) {
                return Err(BridgeError::validation(format!(
                    "Invalid {} address: {}",
                    label, value
                )));
            }
        }

        Ok(())
    }

    /// The /24 the bridge sits in, as advertised in the managed route
    pub fn lan_route(&self) -> String {
        match self.bridge_ip.rsplit_once('.') {
            Some((prefix, _)) => format!("{}.0/24", prefix),
            None => format!("{}/24", self.bridge_ip),
        }
    }
}
