// file: src/netconfig/interfaces.rs
// version: 1.0.0
// guid: a3988095-0fdb-4193-8300-803e51473365

//! ifupdown interfaces file generation

use super::backup::{backup_file, BackupRecord};
use crate::config::RunConfig;
use crate::Result;
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Render the complete interfaces body for the bridge layout
pub fn render_interfaces(config: &RunConfig, bridge_name: &str) -> String {
    let physical = &config.physical_interface;
    format!(
        r#"# /etc/network/interfaces
# Configured by zerotier-bridge-setup

# Loopback interface
auto lo
iface lo inet loopback

# Physical interface - no IP configuration (manual mode)
auto {physical}
iface {physical} inet manual

# Bridge interface
auto {bridge}
iface {bridge} inet static
    address {address}
    netmask {netmask}
    gateway {gateway}
    dns-nameservers {dns}
    bridge_ports {physical}
    bridge_stp off
    bridge_fd 0
    bridge_maxwait 0
"#,
        physical = physical,
        bridge = bridge_name,
        address = config.bridge_ip,
        netmask = config.netmask,
        gateway = config.gateway,
        dns = config.dns,
    )
}

/// Replace `path` with `body` in one rename, keeping the old file mode
pub fn write_atomically(path: &Path, body: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mode = fs::metadata(path)
        .map(|meta| meta.permissions().mode())
        .unwrap_or(0o644);

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(body.as_bytes())?;
    temp.as_file().sync_all()?;
    fs::set_permissions(temp.path(), fs::Permissions::from_mode(mode))?;
    temp.persist(path).map_err(|e| e.error)?;

    debug!("Wrote {} ({} bytes)", path.display(), body.len());
    Ok(())
}

/// Back up and regenerate the interfaces file
pub fn write_interfaces(
    path: &Path,
    config: &RunConfig,
    bridge_name: &str,
) -> Result<Option<BackupRecord>> {
    let backup = match backup_file(path) {
        Ok(record) => record,
        Err(e) => {
            warn!("Could not back up {}: {}", path.display(), e);
            None
        }
    };

    write_atomically(path, &render_interfaces(config, bridge_name))?;

    Ok(backup)
}
