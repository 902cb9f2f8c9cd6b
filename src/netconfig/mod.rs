// file: src/netconfig/mod.rs
// version: 1.0.0
// guid: 2ec2a1c8-5495-4cfe-9d0d-c728c169d98a

//! Host network configuration: dhcpcd exclusions, the ifupdown interfaces
//! file, and the services and links around them

pub mod backup;
pub mod dhcpcd;
pub mod interfaces;
pub mod links;
pub mod service;

pub use backup::{backup_file, BackupRecord};
pub use dhcpcd::{DhcpExclusionWriter, DhcpOutcome, DhcpReport};
pub use interfaces::{render_interfaces, write_interfaces};
pub use links::{IpLinkInspector, LinkInspector};
pub use service::{resolve_conflicting_service, ServiceController, ServiceResolution, SystemctlController};
