// file: src/config/settings.rs
// version: 1.0.0
// guid: 40fc6359-6fef-4c77-9bbc-2a3ae3023de2

//! Host-level paths and constants

use crate::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Paths, names and timings used by every stage.
///
/// The defaults describe a stock Raspberry Pi OS Bookworm host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// dhcpcd configuration file receiving the denyinterfaces directives
    pub dhcpcd_conf: PathBuf,
    /// ifupdown interfaces file, fully regenerated
    pub interfaces_file: PathBuf,
    /// Name of the bridge interface
    pub bridge_name: String,
    /// Scratch directory for downloaded .deb files
    pub download_dir: PathBuf,
    /// A download must be strictly larger than this to be accepted
    pub min_download_bytes: u64,
    /// Debian mirror base URLs tried with the package index filename
    pub mirrors: Vec<String>,
    /// Service that fights ifupdown over interface ownership
    pub conflicting_service: String,
    /// Name prefix of the interfaces created by the overlay client
    pub overlay_interface_prefix: String,
    /// Seconds to wait after joining before looking for the interface
    pub join_settle_secs: u64,
    /// Seconds the boot action sleeps before attaching the interface
    pub boot_delay_secs: u64,
    /// Output of the boot action is appended here
    pub boot_log: PathBuf,
    pub brctl_path: PathBuf,
    /// Presence of this binary means the overlay client is installed
    pub overlay_cli_path: PathBuf,
    /// Vendor installer script piped to bash
    pub overlay_install_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dhcpcd_conf: PathBuf::from("/etc/dhcpcd.conf"),
            interfaces_file: PathBuf::from("/etc/network/interfaces"),
            bridge_name: "br0".to_string(),
            download_dir: PathBuf::from("/tmp/zerotier_packages"),
            min_download_bytes: 1000,
            mirrors: vec![
                "http://ftp.debian.org/debian/".to_string(),
                "http://deb.debian.org/debian/".to_string(),
                "http://ftp.ch.debian.org/debian/".to_string(),
                "http://ftp.de.debian.org/debian/".to_string(),
            ],
            conflicting_service: "NetworkManager".to_string(),
            overlay_interface_prefix: "zt".to_string(),
            join_settle_secs: 2,
            boot_delay_secs: 45,
            boot_log: PathBuf::from("/tmp/bridge-setup.log"),
            brctl_path: PathBuf::from("/usr/sbin/brctl"),
            overlay_cli_path: PathBuf::from("/usr/sbin/zerotier-cli"),
            overlay_install_url: "https://install.zerotier.com/".to_string(),
        }
    }
}

impl Settings {
    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.bridge_name.is_empty() || self.bridge_name.len() > 15 {
            return Err(BridgeError::validation(format!(
                "Invalid bridge name: '{}'",
                self.bridge_name
            )));
        }

        if self.overlay_interface_prefix.is_empty() {
            return Err(BridgeError::validation(
                "Overlay interface prefix cannot be empty",
            ));
        }

        if self.mirrors.is_empty() {
            return Err(BridgeError::validation("At least one mirror must be configured"));
        }

        for mirror in &self.mirrors {
            url::Url::parse(mirror).map_err(|e| {
                BridgeError::validation(format!("Invalid mirror URL '{}': {}", mirror, e))
            })?;
        }

        url::Url::parse(&self.overlay_install_url).map_err(|e| {
            BridgeError::validation(format!(
                "Invalid installer URL '{}': {}",
                self.overlay_install_url, e
            ))
        })?;

        Ok(())
    }

    /// Mirror base URLs, each guaranteed to end with a slash
    pub fn mirror_bases(&self) -> impl Iterator<Item = String> + '_ {
        self.mirrors.iter().map(|m| {
            if m.ends_with('/') {
                m.clone()
            } else {
                format!("{}/", m)
            }
        })
    }
}
