// file: src/provision/apt.rs
// version: 1.0.0
// guid: faee7d9a-f6cc-442d-9bda-3f60d6545a33

//! Package management through apt and dpkg

use crate::network::{CommandExecutor, Disposition};
use crate::utils::shell::quote;
use crate::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// The system package manager, narrowed to what provisioning needs
#[async_trait::async_trait]
pub trait PackageManager: Send + Sync {
    /// Refresh the package index
    async fn refresh_index(&self) -> Result<bool>;

    /// Native architecture name, `None` when it cannot be queried
    async fn architecture(&self) -> Result<Option<String>>;

    async fn is_installed(&self, package: &str) -> Result<bool>;

    /// Install from the configured repositories
    async fn install(&self, package: &str) -> Result<bool>;

    /// Install a downloaded package file
    async fn install_file(&self, file: &Path) -> Result<bool>;

    /// Resolve broken dependencies left by a local install
    async fn fix_broken(&self) -> Result<bool>;

    /// Pool-relative filename of `package` from the local index
    async fn index_filename(&self, package: &str) -> Result<Option<String>>;
}

/// First `Filename:` field of `apt-cache show` output
pub fn parse_index_filename(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.strip_prefix("Filename:"))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// [`PackageManager`] backed by apt-get, apt-cache and dpkg
pub struct AptPackageManager {
    executor: Arc<dyn CommandExecutor>,
}

impl AptPackageManager {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    async fn succeeds(&self, command: &str) -> Result<bool> {
        let result = self
            .executor
            .execute(command, Disposition::Recoverable)
            .await?;
        Ok(result.success())
    }
}

#[async_trait::async_trait]
impl PackageManager for AptPackageManager {
    async fn refresh_index(&self) -> Result<bool> {
        self.succeeds("apt-get update").await
    }

    async fn architecture(&self) -> Result<Option<String>> {
        let result = self
            .executor
            .execute("dpkg --print-architecture", Disposition::Recoverable)
            .await?;
        let arch = result.stdout.trim();
        if result.success() && !arch.is_empty() {
            Ok(Some(arch.to_string()))
        } else {
            Ok(None)
        }
    }

    async fn is_installed(&self, package: &str) -> Result<bool> {
        let command = format!(
            "dpkg-query -W -f='${{db:Status-Abbrev}}' {}",
            quote(package)
        );
        let result = self
            .executor
            .execute(&command, Disposition::Recoverable)
            .await?;
        debug!("{} status: '{}'", package, result.stdout.trim());
        Ok(result.success() && result.stdout.starts_with("ii"))
    }

    async fn install(&self, package: &str) -> Result<bool> {
        self.succeeds(&format!(
            "DEBIAN_FRONTEND=noninteractive apt-get install -y {}",
            quote(package)
        ))
        .await
    }

    async fn install_file(&self, file: &Path) -> Result<bool> {
        self.succeeds(&format!("dpkg -i {}", quote(&file.to_string_lossy())))
            .await
    }

    async fn fix_broken(&self) -> Result<bool> {
        self.succeeds("DEBIAN_FRONTEND=noninteractive apt-get install -f -y")
            .await
    }

    async fn index_filename(&self, package: &str) -> Result<Option<String>> {
        let result = self
            .executor
            .execute(
                &format!("apt-cache show {}", quote(package)),
                Disposition::Recoverable,
            )
            .await?;
        if !result.success() {
            return Ok(None);
        }
        Ok(parse_index_filename(&result.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APT_CACHE_SHOW: &str = "\
Package: ifupdown
Version: 0.8.41
Architecture: armhf
Filename: pool/main/i/ifupdown/ifupdown_0.8.41_armhf.deb
Size: 62184

Package: ifupdown
Version: 0.8.40
Filename: pool/main/i/ifupdown/ifupdown_0.8.40_armhf.deb
";

    #[test]
    fn test_parse_index_filename_takes_first() {
        assert_eq!(
            parse_index_filename(APT_CACHE_SHOW),
            Some("pool/main/i/ifupdown/ifupdown_0.8.41_armhf.deb".to_string())
        );
    }

    #[test]
    fn test_parse_index_filename_missing() {
        assert_eq!(parse_index_filename("Package: ifupdown\n"), None);
        assert_eq!(parse_index_filename("Filename:   \n"), None);
    }
}
