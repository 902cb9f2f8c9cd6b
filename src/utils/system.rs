// file: src/utils/system.rs
// version: 2.0.0
// guid: w3x4y5z6-a7b8-9012-3456-789012wxyzab

//! System utility functions

use crate::{BridgeError, Result};
use std::path::Path;

/// Whether the process may change system configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegeStatus {
    Elevated,
    Unprivileged,
}

impl PrivilegeStatus {
    /// Inspect the effective user of this process
    pub fn detect() -> Self {
        if SystemUtils::is_root() {
            PrivilegeStatus::Elevated
        } else {
            PrivilegeStatus::Unprivileged
        }
    }

    /// Fail unless the process has administrative rights
    pub fn require_elevated(self) -> Result<()> {
        match self {
            PrivilegeStatus::Elevated => Ok(()),
            PrivilegeStatus::Unprivileged => Err(BridgeError::permission(
                "This program must be run as root (try: sudo zerotier-bridge-setup)",
            )),
        }
    }
}

/// System utility functions
pub struct SystemUtils;

impl SystemUtils {
    /// Check if running as root
    pub fn is_root() -> bool {
        // SAFETY: geteuid has no preconditions and cannot fail.
        unsafe { libc::geteuid() == 0 }
    }

    /// Check whether an executable file exists at `path`
    pub async fn binary_present(path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elevated_passes_gate() {
        assert!(PrivilegeStatus::Elevated.require_elevated().is_ok());
    }

    #[test]
    fn test_unprivileged_fails_gate() {
        let result = PrivilegeStatus::Unprivileged.require_elevated();
        assert!(matches!(result, Err(BridgeError::Permission(_))));
    }

    #[test]
    fn test_detect_matches_is_root() {
        let expected = if SystemUtils::is_root() {
            PrivilegeStatus::Elevated
        } else {
            PrivilegeStatus::Unprivileged
        };
        assert_eq!(PrivilegeStatus::detect(), expected);
    }

    #[tokio::test]
    async fn test_binary_present() {
        assert!(SystemUtils::binary_present(Path::new("/bin/sh")).await);
        assert!(!SystemUtils::binary_present(Path::new("/nonexistent/zerotier-cli")).await);
    }
}
