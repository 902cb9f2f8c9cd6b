// file: src/schedule/scheduler.rs
// version: 1.0.0
// guid: 1a9d4b6c-e2f7-4083-8c5d-b7e0f3a21c64

//! Boot-time attachment of the overlay interface to the bridge

use super::crontab::JobTable;
use crate::config::Settings;
use crate::console::Console;
use crate::utils::shell::quote;
use crate::Result;
use std::sync::Arc;
use tracing::warn;

/// Line shown when there is no interface to schedule
pub const MANUAL_BOOT_LINE: &str = "@reboot sleep 60 && brctl addif br0 ZEROTIER_INTERFACE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    AlreadyPresent,
    Added,
    /// The table editor rejected the new table
    WriteFailed,
}

/// `@reboot` line that attaches `interface` to the bridge after the boot delay
pub fn boot_command(settings: &Settings, interface: &str) -> String {
    format!(
        "@reboot sleep {} && {} addif {} {} >> {} 2>&1",
        settings.boot_delay_secs,
        quote(&settings.brctl_path.to_string_lossy()),
        quote(&settings.bridge_name),
        quote(interface),
        quote(&settings.boot_log.to_string_lossy()),
    )
}

/// Append `line` to `table` unless an identical line exists
pub fn with_line(table: &str, line: &str) -> Option<String> {
    if table.lines().any(|existing| existing.trim() == line) {
        return None;
    }

    let mut updated = table.trim_end().to_string();
    if !updated.is_empty() {
        updated.push('\n');
    }
    updated.push_str(line);
    updated.push('\n');
    Some(updated)
}

/// Inserts the boot action into the job table exactly once
pub struct BootActionScheduler {
    table: Arc<dyn JobTable>,
    settings: Settings,
}

impl BootActionScheduler {
    pub fn new(table: Arc<dyn JobTable>, settings: &Settings) -> Self {
        Self {
            table,
            settings: settings.clone(),
        }
    }

    pub async fn schedule(&self, interface: &str, console: &Console) -> Result<ScheduleOutcome> {
        console.info("Creating boot-time bridge script...");
        let line = boot_command(&self.settings, interface);

        let current = self.table.read().await?.unwrap_or_default();
        let Some(updated) = with_line(&current, &line) else {
            console.info("Cron job already exists");
            return Ok(ScheduleOutcome::AlreadyPresent);
        };

        if self.table.write(&updated).await? {
            console.success("Added cron job to attach ZeroTier to bridge on boot");
            Ok(ScheduleOutcome::Added)
        } else {
            warn!("crontab rejected the updated table");
            console.warning("Could not update the crontab; add this line manually with 'sudo crontab -e':");
            console.line(&format!("  {}", console.highlight(&line)));
            Ok(ScheduleOutcome::WriteFailed)
        }
    }
}

/// Tell the operator how to add the boot action once the interface exists
pub fn print_manual_instructions(console: &Console) {
    console.warning("ZeroTier interface not detected. After joining and authorizing:");
    console.line("  1. Find the interface: ip link | grep zt");
    console.line("  2. Add it to the crontab with 'sudo crontab -e':");
    console.line(&format!("     {}", console.highlight(MANUAL_BOOT_LINE)));
}
