// file: src/provision/provisioner.rs
// version: 1.1.0
// guid: 6f1e937c-b2dc-4d56-ba97-2e5e1ed4301f

//! Ensures the required packages and the overlay client are installed

use super::apt::PackageManager;
use super::catalog::{required_packages, PackageSpec};
use super::tiers::{Tier, DEFAULT_TIERS};
use crate::config::{Architecture, Settings};
use crate::console::Console;
use crate::network::download::{file_name_from_url, Downloader};
use crate::overlay::OverlayClient;
use crate::prompt::{ask_yes_no, Prompter};
use crate::{BridgeError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// How a single package ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageOutcome {
    AlreadyInstalled,
    Installed(Tier),
    /// Every tier was exhausted
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    pub name: String,
    pub critical: bool,
    pub outcome: PackageOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayClientStatus {
    AlreadyPresent,
    Installed,
}

/// Result of the provisioning step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    pub architecture: Architecture,
    pub packages: Vec<PackageReport>,
    /// Filled once the overlay client has been checked
    pub overlay_client: Option<OverlayClientStatus>,
}

impl ProvisionReport {
    pub fn failed(&self) -> impl Iterator<Item = &PackageReport> {
        self.packages
            .iter()
            .filter(|report| report.outcome == PackageOutcome::Failed)
    }

    pub fn failed_names(&self) -> Vec<String> {
        self.failed().map(|report| report.name.clone()).collect()
    }
}

fn recoverable(result: Result<bool>, what: &str) -> bool {
    result.unwrap_or_else(|e| {
        warn!("{} failed: {}", what, e);
        false
    })
}

/// Installs OS packages through an ordered chain of fallback tiers
pub struct PackageProvisioner {
    packages: Arc<dyn PackageManager>,
    downloader: Arc<dyn Downloader>,
    catalog: Vec<PackageSpec>,
    tiers: Vec<Tier>,
    download_dir: PathBuf,
    min_download_bytes: u64,
    mirrors: Vec<String>,
}

impl PackageProvisioner {
    pub fn new(
        packages: Arc<dyn PackageManager>,
        downloader: Arc<dyn Downloader>,
        settings: &Settings,
    ) -> Self {
        Self {
            packages,
            downloader,
            catalog: required_packages(),
            tiers: DEFAULT_TIERS.to_vec(),
            download_dir: settings.download_dir.clone(),
            min_download_bytes: settings.min_download_bytes,
            mirrors: settings.mirror_bases().collect(),
        }
    }

    /// Replace the tier order
    pub fn with_tiers(mut self, tiers: Vec<Tier>) -> Self {
        self.tiers = tiers;
        self
    }

    /// Query the native architecture once, falling back to armhf
    pub async fn detect_architecture(&self, console: &Console) -> Architecture {
        console.info("Detecting system architecture");
        let detected = match self.packages.architecture().await {
            Ok(Some(name)) => name.parse().ok(),
            Ok(None) => None,
            Err(e) => {
                debug!("Architecture query failed: {}", e);
                None
            }
        };

        match detected {
            Some(arch) => {
                console.info(&format!("Detected architecture: {}", arch));
                arch
            }
            None => {
                console.warning(&format!(
                    "Could not detect architecture, assuming {}",
                    Architecture::FALLBACK
                ));
                Architecture::FALLBACK
            }
        }
    }

    /// Install one package, walking the tiers until one succeeds
    pub async fn install_package(
        &self,
        spec: &PackageSpec,
        arch: &Architecture,
        console: &Console,
    ) -> PackageOutcome {
        console.info(&format!("--- Installing {} ---", spec.name));

        if recoverable(self.packages.is_installed(spec.name).await, "Package query") {
            console.success(&format!("{} is already installed", spec.name));
            return PackageOutcome::AlreadyInstalled;
        }

        for tier in &self.tiers {
            console.info(&format!("Attempting to install {} via {}...", spec.name, tier));
            if self.attempt_tier(*tier, spec, arch, console).await {
                console.success(&format!("Successfully installed {} via {}", spec.name, tier));
                return PackageOutcome::Installed(*tier);
            }
            console.warning(&format!("{} failed for {}", tier, spec.name));
        }

        console.error(&format!("Could not install {}", spec.name));
        PackageOutcome::Failed
    }

    async fn attempt_tier(
        &self,
        tier: Tier,
        spec: &PackageSpec,
        arch: &Architecture,
        console: &Console,
    ) -> bool {
        if !tier.downloads() {
            return recoverable(self.packages.install(spec.name).await, "Package install");
        }

        let index_filename = if tier == Tier::MirrorSearch {
            match self.packages.index_filename(spec.name).await {
                Ok(name) => name,
                Err(e) => {
                    debug!("Index lookup for {} failed: {}", spec.name, e);
                    None
                }
            }
        } else {
            None
        };

        let urls = tier.candidate_urls(
            spec,
            arch,
            index_filename.as_deref(),
            self.mirrors.iter().map(String::as_str),
        );
        if urls.is_empty() {
            debug!("No {} candidates for {} on {}", tier, spec.name, arch);
            return false;
        }

        for url in urls {
            if let Some(file) = self.fetch(&url, console).await {
                return self.install_local(&file, console).await;
            }
        }

        false
    }

    /// Download `url`, keeping the file only if it is larger than the threshold
    async fn fetch(&self, url: &str, console: &Console) -> Option<PathBuf> {
        let Some(file_name) = file_name_from_url(url) else {
            warn!("Cannot derive a file name from {}", url);
            return None;
        };

        if let Err(e) = tokio::fs::create_dir_all(&self.download_dir).await {
            warn!(
                "Cannot create download directory {}: {}",
                self.download_dir.display(),
                e
            );
            return None;
        }

        let dest = self.download_dir.join(file_name);
        console.info(&format!("Downloading from: {}", url));

        if let Err(e) = self.downloader.download(url, &dest).await {
            console.warning(&format!("Download failed: {}", e));
            let _ = tokio::fs::remove_file(&dest).await;
            return None;
        }

        let size = tokio::fs::metadata(&dest)
            .await
            .map(|meta| meta.len())
            .unwrap_or(0);

        if size > self.min_download_bytes {
            console.success(&format!("Downloaded successfully ({} bytes)", size));
            Some(dest)
        } else {
            console.warning(&format!(
                "Downloaded file is only {} bytes, treating it as failed",
                size
            ));
            let _ = tokio::fs::remove_file(&dest).await;
            None
        }
    }

    /// Install a package file, resolving broken dependencies once on failure
    async fn install_local(&self, file: &Path, console: &Console) -> bool {
        let label = file
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| file.display().to_string());
        console.info(&format!("Installing {}...", label));

        if recoverable(self.packages.install_file(file).await, "Local install") {
            return true;
        }

        console.warning("Package installation had errors, trying to fix dependencies...");
        recoverable(self.packages.fix_broken().await, "Dependency repair");

        recoverable(self.packages.install_file(file).await, "Local install retry")
    }

    /// Install every catalogue package; failures are recorded, not raised
    pub async fn install_packages(&self, console: &Console) -> ProvisionReport {
        console.info("Updating package lists...");
        if !recoverable(self.packages.refresh_index().await, "Index refresh") {
            console.warning("Package list update had issues, continuing anyway...");
        }

        let architecture = self.detect_architecture(console).await;

        let mut packages = Vec::with_capacity(self.catalog.len());
        for spec in &self.catalog {
            let outcome = self.install_package(spec, &architecture, console).await;
            packages.push(PackageReport {
                name: spec.name.to_string(),
                critical: spec.critical,
                outcome,
            });
        }

        ProvisionReport {
            architecture,
            packages,
            overlay_client: None,
        }
    }

    /// Install the overlay client unless present; failure stops the run
    pub async fn ensure_overlay_client(
        &self,
        overlay: &dyn OverlayClient,
        console: &Console,
    ) -> Result<OverlayClientStatus> {
        console.info("--- Installing ZeroTier ---");

        if overlay.is_installed().await {
            console.success("ZeroTier is already installed");
            return Ok(OverlayClientStatus::AlreadyPresent);
        }

        console.info("Installing ZeroTier via official script...");
        if recoverable(overlay.install().await, "ZeroTier install") {
            console.success("ZeroTier installed successfully");
            Ok(OverlayClientStatus::Installed)
        } else {
            Err(BridgeError::overlay(
                "ZeroTier client installation failed, cannot continue without ZeroTier",
            ))
        }
    }

    /// The whole provisioning step: packages, summary, overlay client,
    /// then the operator's decision on critical failures
    pub async fn provision(
        &self,
        overlay: &dyn OverlayClient,
        prompter: &mut dyn Prompter,
        console: &Console,
    ) -> Result<ProvisionReport> {
        console.header("Installing Required Packages");

        let mut report = self.install_packages(console).await;

        let failed = report.failed_names();
        if !failed.is_empty() {
            console.warning(&format!("Failed to install: {}", failed.join(", ")));
            console.info("You can try installing manually after setup completes:");
            for name in &failed {
                console.line(&format!("  sudo apt-get install -y {}", name));
            }
        }

        report.overlay_client = Some(self.ensure_overlay_client(overlay, console).await?);

        let critical: Vec<String> = report
            .failed()
            .filter(|package| package.critical)
            .map(|package| package.name.clone())
            .collect();

        if !critical.is_empty() {
            for name in &critical {
                console.warning(&format!("WARNING: {} failed to install!", name));
                console.info(&format!("After setup, try: sudo apt-get install -y {}", name));
            }
            if !ask_yes_no(prompter, console, "Continue anyway?").await? {
                return Err(BridgeError::prerequisite(format!(
                    "critical packages missing: {}",
                    critical.join(", ")
                )));
            }
        }

        console.success("Package installation complete!");
        Ok(report)
    }
}
