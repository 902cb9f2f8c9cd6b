// file: src/config/mod.rs
// version: 2.0.0
// guid: a1b2c3d4-e5f6-7a8b-9c0d-1e2f3a4b5c6d

//! Configuration module for the bridge setup
//!
//! [`RunConfig`] holds what the operator typed; [`Settings`] holds host-level
//! paths and constants, optionally overridden from a YAML file.

pub mod loader;
pub mod run;
pub mod settings;

pub use run::{is_valid_ipv4_format, NetworkId, RunConfig};
pub use settings::Settings;

use std::fmt;

/// Debian architecture identifiers the package catalogue knows about
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Architecture {
    Armhf,
    Arm64,
    Amd64,
    Other(String),
}

impl Architecture {
    /// Raspberry Pi OS 32-bit, used when detection fails
    pub const FALLBACK: Architecture = Architecture::Armhf;

    /// Get the architecture as a string
    pub fn as_str(&self) -> &str {
        match self {
            Architecture::Armhf => "armhf",
            Architecture::Arm64 => "arm64",
            Architecture::Amd64 => "amd64",
            Architecture::Other(name) => name,
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Architecture {
    type Err = crate::BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(crate::BridgeError::validation("Empty architecture name")),
            "armhf" => Ok(Architecture::Armhf),
            "arm64" | "aarch64" => Ok(Architecture::Arm64),
            "amd64" | "x86_64" => Ok(Architecture::Amd64),
            other => Ok(Architecture::Other(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_architecture_parse_known_names() {
        assert_eq!("armhf".parse::<Architecture>().unwrap(), Architecture::Armhf);
        assert_eq!("aarch64".parse::<Architecture>().unwrap(), Architecture::Arm64);
        assert_eq!("amd64\n".parse::<Architecture>().unwrap(), Architecture::Amd64);
    }

    #[test]
    fn test_architecture_parse_unknown_is_kept() {
        let arch: Architecture = "riscv64".parse().unwrap();
        assert_eq!(arch, Architecture::Other("riscv64".to_string()));
        assert_eq!(arch.as_str(), "riscv64");
    }

    #[test]
    fn test_architecture_parse_empty_fails() {
        assert!("  ".parse::<Architecture>().is_err());
    }
}
