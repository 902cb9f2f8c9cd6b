// file: src/orchestrator/mod.rs
// version: 1.1.0
// guid: 9b4e7a21-c3d8-4f05-86e2-d1a0b5c7f349

//! Sequences the bridge setup stages
//!
//! Fatal stages propagate their error and end the run. Optional stages are
//! recorded as skipped when their precondition is absent. Nothing is rolled
//! back; the file backups taken along the way are listed in the summary.

use crate::config::{RunConfig, Settings};
use crate::console::Console;
use crate::logging::with_async_operation_span;
use crate::netconfig::{
    resolve_conflicting_service, write_interfaces, BackupRecord, DhcpExclusionWriter, DhcpOutcome,
    IpLinkInspector, LinkInspector, ServiceController, SystemctlController,
};
use crate::network::{CommandExecutor, Downloader, NetworkDownloader};
use crate::overlay::{NodeInfo, OverlayClient, OverlayJoiner, ZeroTierCli};
use crate::prompt::{collect_run_config, Prompter};
use crate::provision::{AptPackageManager, PackageManager, PackageProvisioner};
use crate::schedule::{print_manual_instructions, BootActionScheduler, CrontabEditor, JobTable};
use crate::utils::PrivilegeStatus;
use crate::Result;
use std::fmt;
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    PrivilegeCheck,
    CollectConfig,
    InstallPackages,
    ConfigureDhcpExclusions,
    WriteInterfacesFile,
    JoinOverlay,
    ConfigureManagedRoutes,
    ScheduleBootAction,
    PrintInstructions,
}

impl Stage {
    pub const ALL: [Stage; 9] = [
        Stage::PrivilegeCheck,
        Stage::CollectConfig,
        Stage::InstallPackages,
        Stage::ConfigureDhcpExclusions,
        Stage::WriteInterfacesFile,
        Stage::JoinOverlay,
        Stage::ConfigureManagedRoutes,
        Stage::ScheduleBootAction,
        Stage::PrintInstructions,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::PrivilegeCheck => "privilege-check",
            Stage::CollectConfig => "collect-config",
            Stage::InstallPackages => "install-packages",
            Stage::ConfigureDhcpExclusions => "configure-dhcp-exclusions",
            Stage::WriteInterfacesFile => "write-interfaces-file",
            Stage::JoinOverlay => "join-overlay",
            Stage::ConfigureManagedRoutes => "configure-managed-routes",
            Stage::ScheduleBootAction => "schedule-boot-action",
            Stage::PrintInstructions => "print-instructions",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Status of a finished stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    Completed,
    /// Precondition absent; carries the reason
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRecord {
    pub stage: Stage,
    pub status: StageStatus,
    pub elapsed: Duration,
}

/// What a completed run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub stages: Vec<StageRecord>,
    pub backups: Vec<BackupRecord>,
    pub failed_packages: Vec<String>,
    pub overlay_interface: Option<String>,
    pub node: Option<NodeInfo>,
}

impl RunSummary {
    pub fn status_of(&self, stage: Stage) -> Option<&StageStatus> {
        self.stages
            .iter()
            .find(|record| record.stage == stage)
            .map(|record| &record.status)
    }

    fn record(&mut self, stage: Stage, status: StageStatus, started: Instant) {
        info!(stage = stage.name(), ?status, "Stage finished");
        self.stages.push(StageRecord {
            stage,
            status,
            elapsed: started.elapsed(),
        });
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(RunSummary),
    /// The operator declined the configuration summary; nothing was changed
    Cancelled,
}

/// External tools the stages talk to
#[derive(Clone)]
pub struct Collaborators {
    pub packages: Arc<dyn PackageManager>,
    pub downloader: Arc<dyn Downloader>,
    pub overlay: Arc<dyn OverlayClient>,
    pub services: Arc<dyn ServiceController>,
    pub links: Arc<dyn LinkInspector>,
    pub jobs: Arc<dyn JobTable>,
}

impl Collaborators {
    /// Real implementations running commands through `executor`
    pub fn system(executor: Arc<dyn CommandExecutor>, settings: &Settings) -> Self {
        let mut downloader = NetworkDownloader::new();
        if !std::io::stderr().is_terminal() {
            downloader = downloader.without_progress();
        }

        Self {
            packages: Arc::new(AptPackageManager::new(executor.clone())),
            downloader: Arc::new(downloader),
            overlay: Arc::new(ZeroTierCli::new(
                executor.clone(),
                settings.overlay_cli_path.clone(),
                settings.overlay_install_url.clone(),
            )),
            services: Arc::new(SystemctlController::new(executor.clone())),
            links: Arc::new(IpLinkInspector::new(executor.clone())),
            jobs: Arc::new(CrontabEditor::new(executor)),
        }
    }
}

/// Everything a run needs, passed in explicitly
pub struct RunContext {
    pub privilege: PrivilegeStatus,
    pub console: Console,
    pub prompter: Box<dyn Prompter>,
    pub settings: Settings,
}

/// Drives one setup run from privilege check to closing instructions
pub struct Orchestrator {
    context: RunContext,
    tools: Collaborators,
    summary: RunSummary,
}

impl Orchestrator {
    pub fn new(context: RunContext, tools: Collaborators) -> Self {
        Self {
            context,
            tools,
            summary: RunSummary::default(),
        }
    }

    pub async fn run(mut self) -> Result<RunOutcome> {
        let started = Instant::now();
        self.context.privilege.require_elevated()?;
        self.summary
            .record(Stage::PrivilegeCheck, StageStatus::Completed, started);

        self.context
            .console
            .header("ZeroTier Bridge Setup for Raspberry Pi");

        let started = Instant::now();
        let config = match with_async_operation_span(Stage::CollectConfig.name(), || {
            self.collect_config()
        })
        .await?
        {
            Some(config) => config,
            None => return Ok(RunOutcome::Cancelled),
        };
        self.summary
            .record(Stage::CollectConfig, StageStatus::Completed, started);

        let started = Instant::now();
        with_async_operation_span(Stage::InstallPackages.name(), || self.install_packages()).await?;
        self.summary
            .record(Stage::InstallPackages, StageStatus::Completed, started);

        let started = Instant::now();
        with_async_operation_span(Stage::ConfigureDhcpExclusions.name(), || {
            self.configure_dhcp_exclusions(&config)
        })
        .await?;
        self.summary
            .record(Stage::ConfigureDhcpExclusions, StageStatus::Completed, started);

        let started = Instant::now();
        with_async_operation_span(Stage::WriteInterfacesFile.name(), || {
            self.write_interfaces_file(&config)
        })
        .await?;
        self.summary
            .record(Stage::WriteInterfacesFile, StageStatus::Completed, started);

        let started = Instant::now();
        let status =
            with_async_operation_span(Stage::JoinOverlay.name(), || self.join_overlay(&config)).await;
        self.summary.record(Stage::JoinOverlay, status, started);

        let started = Instant::now();
        let status = with_async_operation_span(Stage::ConfigureManagedRoutes.name(), || {
            self.configure_managed_routes(&config)
        })
        .await;
        self.summary
            .record(Stage::ConfigureManagedRoutes, status, started);

        let started = Instant::now();
        let status = with_async_operation_span(Stage::ScheduleBootAction.name(), || {
            self.schedule_boot_action()
        })
        .await?;
        self.summary.record(Stage::ScheduleBootAction, status, started);

        let started = Instant::now();
        with_async_operation_span(Stage::PrintInstructions.name(), || {
            self.print_instructions(&config)
        })
        .await;
        self.summary
            .record(Stage::PrintInstructions, StageStatus::Completed, started);

        Ok(RunOutcome::Completed(self.summary))
    }

    fn joiner(&self) -> OverlayJoiner {
        OverlayJoiner::new(
            self.tools.overlay.clone(),
            self.tools.links.clone(),
            &self.context.settings,
        )
    }

    async fn collect_config(&mut self) -> Result<Option<RunConfig>> {
        collect_run_config(
            self.context.prompter.as_mut(),
            &self.context.console,
            self.tools.links.as_ref(),
        )
        .await
    }

    async fn install_packages(&mut self) -> Result<()> {
        let provisioner = PackageProvisioner::new(
            self.tools.packages.clone(),
            self.tools.downloader.clone(),
            &self.context.settings,
        );
        let report = provisioner
            .provision(
                self.tools.overlay.as_ref(),
                self.context.prompter.as_mut(),
                &self.context.console,
            )
            .await?;
        self.summary.failed_packages = report.failed_names();
        Ok(())
    }

    async fn configure_dhcp_exclusions(&mut self, config: &RunConfig) -> Result<()> {
        let console = &self.context.console;
        console.header("Configuring Network Bridge");

        resolve_conflicting_service(
            self.tools.services.as_ref(),
            self.context.prompter.as_mut(),
            console,
            &self.context.settings.conflicting_service,
        )
        .await?;

        let writer = DhcpExclusionWriter::new(
            &self.context.settings.dhcpcd_conf,
            self.context.settings.overlay_interface_prefix.clone(),
        );
        console.info(&format!("Configuring {}...", writer.path().display()));

        let report = writer.configure(&config.physical_interface)?;

        if report.created {
            console.info(&format!("Created {}", writer.path().display()));
        }
        if let Some(backup) = report.backup {
            console.success(&format!("Backed up to {}", backup.backup.display()));
            self.summary.backups.push(backup);
        }
        match report.outcome {
            DhcpOutcome::AlreadyConfigured => console.info("dhcpcd.conf already configured"),
            DhcpOutcome::Appended(lines) => {
                debug!("Appended {:?}", lines);
                console.success("dhcpcd.conf updated");
            }
        }
        Ok(())
    }

    async fn write_interfaces_file(&mut self, config: &RunConfig) -> Result<()> {
        let console = &self.context.console;
        let path = &self.context.settings.interfaces_file;
        console.info(&format!("Configuring {}...", path.display()));

        let backup = write_interfaces(path, config, &self.context.settings.bridge_name)?;

        if let Some(backup) = backup {
            console.success(&format!("Backed up to {}", backup.backup.display()));
            self.summary.backups.push(backup);
        }
        console.success("Network interfaces configured");
        Ok(())
    }

    async fn join_overlay(&mut self, config: &RunConfig) -> StageStatus {
        let Some(network) = &config.network_id else {
            self.context
                .console
                .info("Skipping network join - you'll need to join manually");
            return StageStatus::Skipped("no network id supplied".to_string());
        };

        self.context.console.header("Joining ZeroTier Network");
        let report = self.joiner().join(network, &self.context.console).await;
        self.summary.overlay_interface = report.interface;
        StageStatus::Completed
    }

    async fn configure_managed_routes(&mut self, config: &RunConfig) -> StageStatus {
        let Some(interface) = self.summary.overlay_interface.clone() else {
            return StageStatus::Skipped("no overlay interface".to_string());
        };

        self.joiner()
            .configure_managed_routes(&interface, config.network_id.as_ref(), &self.context.console)
            .await;
        StageStatus::Completed
    }

    async fn schedule_boot_action(&mut self) -> Result<StageStatus> {
        let Some(interface) = self.summary.overlay_interface.clone() else {
            print_manual_instructions(&self.context.console);
            return Ok(StageStatus::Skipped("no overlay interface".to_string()));
        };

        let scheduler = BootActionScheduler::new(self.tools.jobs.clone(), &self.context.settings);
        scheduler.schedule(&interface, &self.context.console).await?;
        Ok(StageStatus::Completed)
    }

    async fn print_instructions(&mut self, config: &RunConfig) {
        self.summary.node = self.joiner().node_info().await;

        let console = &self.context.console;
        let bridge = &self.context.settings.bridge_name;
        console.header("Setup Complete!");

        match &self.summary.node {
            Some(node) => console.info(&format!(
                "Your ZeroTier Node ID: {}",
                console.highlight(&node.node_id)
            )),
            None => console.warning("Could not read the ZeroTier node ID (run: sudo zerotier-cli info)"),
        }

        console.line("In ZeroTier Central:");
        console.line("  1. Authorize this node and enable 'Allow Ethernet Bridging'");
        console.line(&format!(
            "  2. Add managed route: {} via {}",
            config.lan_route(),
            config.bridge_ip
        ));

        if let Some(interface) = &self.summary.overlay_interface {
            console.line(&format!("ZeroTier interface {} will join {} at boot", interface, bridge));
        }

        if !self.summary.backups.is_empty() {
            console.line("Backups:");
            for backup in &self.summary.backups {
                console.line(&format!("  {}", backup.backup.display()));
            }
        }

        if !self.summary.failed_packages.is_empty() {
            console.warning(&format!(
                "Still missing: {} (install before rebooting)",
                self.summary.failed_packages.join(", ")
            ));
        }

        console.line("After reboot, verify with:");
        console.line(&format!("  {}", console.highlight("brctl show")));
        console.line(&format!("  {}", console.highlight(&format!("ip addr show {}", bridge))));
        console.warning(&format!(
            "Reboot to apply the bridge configuration: {}",
            console.highlight("sudo reboot")
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_and_names() {
        assert_eq!(Stage::ALL.first(), Some(&Stage::PrivilegeCheck));
        assert_eq!(Stage::ALL.last(), Some(&Stage::PrintInstructions));
        assert_eq!(Stage::JoinOverlay.to_string(), "join-overlay");
    }

    #[test]
    fn test_status_of() {
        let mut summary = RunSummary::default();
        summary.record(
            Stage::JoinOverlay,
            StageStatus::Skipped("no network id supplied".to_string()),
            Instant::now(),
        );
        assert_eq!(
            summary.status_of(Stage::JoinOverlay),
            Some(&StageStatus::Skipped("no network id supplied".to_string()))
        );
        assert_eq!(summary.status_of(Stage::PrintInstructions), None);
    }
}
