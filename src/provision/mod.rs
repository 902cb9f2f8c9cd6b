// file: src/provision/mod.rs
// version: 1.0.0
// guid: 0d2c52b8-77b4-4d0b-9a4f-1a3fb0d0a1c6

//! Package provisioning with fallback tiers

pub mod apt;
pub mod catalog;
pub mod provisioner;
pub mod tiers;

pub use apt::{AptPackageManager, PackageManager};
pub use catalog::{required_packages, PackageSpec};
pub use provisioner::{
    OverlayClientStatus, PackageOutcome, PackageProvisioner, PackageReport, ProvisionReport,
};
pub use tiers::{Tier, DEFAULT_TIERS};
