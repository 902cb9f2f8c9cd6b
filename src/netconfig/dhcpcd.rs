// file: src/netconfig/dhcpcd.rs
// version: 1.0.0
// guid: e49bf7f2-8fd9-4069-9b2e-b3be17404f47

//! dhcpcd exclusion directives for the bridged interfaces

use super::backup::{backup_file, BackupRecord};
use crate::Result;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const FILE_HEADER: &str =
    "# dhcpcd configuration for ZeroTier bridge\n# Created by zerotier-bridge-setup\n\n";
const SECTION_HEADER: &str =
    "# ZeroTier Bridge Configuration\n# Prevent dhcpcd from managing bridge interfaces\n";

/// What the writer did to the exclusion file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DhcpOutcome {
    /// Both directives were already present; nothing written
    AlreadyConfigured,
    /// These directive lines were appended
    Appended(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhcpReport {
    /// The file did not exist and was created with a header
    pub created: bool,
    pub backup: Option<BackupRecord>,
    pub outcome: DhcpOutcome,
}

/// The two lines that keep dhcpcd away from the physical and overlay interfaces
pub fn required_directives(physical_interface: &str, overlay_prefix: &str) -> [String; 2] {
    [
        format!("denyinterfaces {}", physical_interface),
        format!("denyinterfaces {}*", overlay_prefix),
    ]
}

/// Directives with no exactly matching line in `content`
pub fn missing_directives<'a>(content: &str, directives: &'a [String]) -> Vec<&'a String> {
    directives
        .iter()
        .filter(|directive| !content.lines().any(|line| line.trim() == directive.as_str()))
        .collect()
}

/// Keeps dhcpcd from assigning addresses to bridge members
pub struct DhcpExclusionWriter {
    path: PathBuf,
    overlay_prefix: String,
}

impl DhcpExclusionWriter {
    pub fn new(path: impl Into<PathBuf>, overlay_prefix: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            overlay_prefix: overlay_prefix.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure both directives are present, appending only what is missing
    pub fn configure(&self, physical_interface: &str) -> Result<DhcpReport> {
        let created = if self.path.exists() {
            false
        } else {
            debug!("Creating {}", self.path.display());
            fs::write(&self.path, FILE_HEADER)?;
            true
        };

        let backup = match backup_file(&self.path) {
            Ok(record) => record,
            Err(e) => {
                warn!("Could not back up {}: {}", self.path.display(), e);
                None
            }
        };

        let content = fs::read_to_string(&self.path)?;
        let directives = required_directives(physical_interface, &self.overlay_prefix);
        let missing = missing_directives(&content, &directives);

        if missing.is_empty() {
            return Ok(DhcpReport {
                created,
                backup,
                outcome: DhcpOutcome::AlreadyConfigured,
            });
        }

        let mut block = String::new();
        if !content.is_empty() && !content.ends_with('\n') {
            block.push('\n');
        }
        block.push('\n');
        block.push_str(SECTION_HEADER);
        for directive in &missing {
            block.push_str(directive);
            block.push('\n');
        }

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(block.as_bytes())?;
        file.sync_all()?;

        Ok(DhcpReport {
            created,
            backup,
            outcome: DhcpOutcome::Appended(missing.into_iter().cloned().collect()),
        })
    }
}
