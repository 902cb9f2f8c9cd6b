// file: tests/integration_test.rs
// version: 2.1.0
// guid: z6a7b8c9-d0e1-2345-6789-012345zabcde

//! Integration tests driving the whole setup run against fakes

use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use zerotier_bridge_setup::{
    config::{NetworkId, Settings},
    console::{Console, SharedBuffer},
    netconfig::{LinkInspector, ServiceController},
    network::Downloader,
    orchestrator::{Collaborators, Orchestrator, RunContext, RunOutcome, Stage, StageStatus},
    overlay::{NodeInfo, OverlayClient},
    prompt::ScriptedPrompter,
    provision::PackageManager,
    schedule::{boot_command, JobTable},
    utils::PrivilegeStatus,
    BridgeError, Result,
};

const NETWORK: &str = "8056c2e21c000001";

struct InstalledPackages;

#[async_trait::async_trait]
impl PackageManager for InstalledPackages {
    async fn refresh_index(&self) -> Result<bool> {
        Ok(true)
    }
    async fn architecture(&self) -> Result<Option<String>> {
        Ok(Some("arm64".to_string()))
    }
    async fn is_installed(&self, _package: &str) -> Result<bool> {
        Ok(true)
    }
    async fn install(&self, _package: &str) -> Result<bool> {
        Ok(true)
    }
    async fn install_file(&self, _file: &Path) -> Result<bool> {
        Ok(true)
    }
    async fn fix_broken(&self) -> Result<bool> {
        Ok(true)
    }
    async fn index_filename(&self, _package: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

struct NoDownloads;

#[async_trait::async_trait]
impl Downloader for NoDownloads {
    async fn download(&self, url: &str, _dest: &Path) -> Result<u64> {
        Err(BridgeError::network(format!("unexpected download of {url}")))
    }
}

#[derive(Default)]
struct FakeOverlay {
    calls: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl OverlayClient for FakeOverlay {
    async fn is_installed(&self) -> bool {
        true
    }
    async fn install(&self) -> Result<bool> {
        Ok(true)
    }
    async fn info(&self) -> Result<Option<NodeInfo>> {
        Ok(Some(NodeInfo {
            node_id: "89e92ceee5".to_string(),
            version: "1.12.2".to_string(),
            status: "ONLINE".to_string(),
        }))
    }
    async fn join(&self, network: &NetworkId) -> Result<bool> {
        self.calls.lock().unwrap().push(format!("join {network}"));
        Ok(true)
    }
    async fn list_networks(&self) -> Result<Option<String>> {
        Ok(None)
    }
    async fn set_allow_managed(&self, network: &str, allow: bool) -> Result<bool> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("set {network} allowManaged={}", u8::from(allow)));
        Ok(true)
    }
}

struct FakeServices {
    active: bool,
}

#[async_trait::async_trait]
impl ServiceController for FakeServices {
    async fn is_active(&self, _service: &str) -> bool {
        self.active
    }
    async fn stop(&self, _service: &str) -> Result<bool> {
        Ok(true)
    }
    async fn disable(&self, _service: &str) -> Result<bool> {
        Ok(true)
    }
}

struct FakeLinks;

#[async_trait::async_trait]
impl LinkInspector for FakeLinks {
    async fn link_names(&self) -> Result<Vec<String>> {
        Ok(["lo", "eth0", "wlan0", "zt7nnig26"]
            .iter()
            .map(|name| name.to_string())
            .collect())
    }
}

#[derive(Default)]
struct MemoryJobs {
    table: Mutex<Option<String>>,
}

#[async_trait::async_trait]
impl JobTable for MemoryJobs {
    async fn read(&self) -> Result<Option<String>> {
        Ok(self.table.lock().unwrap().clone())
    }
    async fn write(&self, table: &str) -> Result<bool> {
        *self.table.lock().unwrap() = Some(table.to_string());
        Ok(true)
    }
}

struct Harness {
    dir: TempDir,
    overlay: Arc<FakeOverlay>,
    jobs: Arc<MemoryJobs>,
    service_active: bool,
}

impl Harness {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            overlay: Arc::new(FakeOverlay::default()),
            jobs: Arc::new(MemoryJobs::default()),
            service_active: false,
        }
    }

    fn settings(&self) -> Settings {
        Settings {
            dhcpcd_conf: self.dir.path().join("dhcpcd.conf"),
            interfaces_file: self.dir.path().join("interfaces"),
            download_dir: self.dir.path().join("packages"),
            join_settle_secs: 0,
            ..Settings::default()
        }
    }

    async fn run(
        &self,
        privilege: PrivilegeStatus,
        answers: &[&str],
    ) -> (Result<RunOutcome>, SharedBuffer) {
        let (console, buffer) = Console::buffered();
        let context = RunContext {
            privilege,
            console,
            prompter: Box::new(ScriptedPrompter::new(answers.iter().copied())),
            settings: self.settings(),
        };
        let tools = Collaborators {
            packages: Arc::new(InstalledPackages),
            downloader: Arc::new(NoDownloads),
            overlay: self.overlay.clone(),
            services: Arc::new(FakeServices {
                active: self.service_active,
            }),
            links: Arc::new(FakeLinks),
            jobs: self.jobs.clone(),
        };

        let result = Orchestrator::new(context, tools).run().await;
        (result, buffer)
    }

    fn read(&self, name: &str) -> Option<String> {
        std::fs::read_to_string(self.dir.path().join(name)).ok()
    }
}

fn answers<'a>(network: &'a str, confirm: &'a str) -> Vec<&'a str> {
    vec!["", "192.168.1.2", "", "192.168.1.1", "", network, confirm]
}

#[tokio::test]
async fn test_full_run_configures_everything() {
    let harness = Harness::new();

    let (result, output) = harness
        .run(PrivilegeStatus::Elevated, &answers(NETWORK, "yes"))
        .await;

    let summary = match result.unwrap() {
        RunOutcome::Completed(summary) => summary,
        RunOutcome::Cancelled => panic!("run was cancelled"),
    };

    for stage in Stage::ALL {
        assert_eq!(summary.status_of(stage), Some(&StageStatus::Completed), "{stage}");
    }
    assert_eq!(summary.overlay_interface.as_deref(), Some("zt7nnig26"));
    assert_eq!(summary.node.as_ref().map(|n| n.node_id.as_str()), Some("89e92ceee5"));

    let dhcpcd = harness.read("dhcpcd.conf").unwrap();
    assert_eq!(dhcpcd.lines().filter(|l| *l == "denyinterfaces eth0").count(), 1);
    assert_eq!(dhcpcd.lines().filter(|l| *l == "denyinterfaces zt*").count(), 1);

    let interfaces = harness.read("interfaces").unwrap();
    assert!(interfaces.contains("iface eth0 inet manual"));
    assert!(interfaces.contains("address 192.168.1.2"));

    assert_eq!(
        *harness.overlay.calls.lock().unwrap(),
        vec![
            format!("join {NETWORK}"),
            format!("set {NETWORK} allowManaged=0"),
        ]
    );

    let table = harness.jobs.table.lock().unwrap().clone().unwrap();
    assert!(table.contains(&boot_command(&harness.settings(), "zt7nnig26")));

    let text = output.contents();
    assert!(text.contains("192.168.1.0/24 via 192.168.1.2"));
    assert!(text.contains("89e92ceee5"));
}

#[tokio::test]
async fn test_rerun_does_not_duplicate_configuration() {
    let harness = Harness::new();

    for _ in 0..2 {
        let (result, _) = harness
            .run(PrivilegeStatus::Elevated, &answers(NETWORK, "y"))
            .await;
        assert!(matches!(result.unwrap(), RunOutcome::Completed(_)));
    }

    let dhcpcd = harness.read("dhcpcd.conf").unwrap();
    assert_eq!(dhcpcd.matches("denyinterfaces eth0").count(), 1);

    let table = harness.jobs.table.lock().unwrap().clone().unwrap();
    assert_eq!(table.lines().count(), 1);

    let backups = std::fs::read_dir(harness.dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().contains(".backup."))
        .count();
    assert!(backups >= 2);
}

#[tokio::test]
async fn test_missing_network_id_skips_overlay_stages() {
    let harness = Harness::new();

    let (result, output) = harness
        .run(PrivilegeStatus::Elevated, &answers("", "yes"))
        .await;

    let RunOutcome::Completed(summary) = result.unwrap() else {
        panic!("run was cancelled");
    };

    for stage in [
        Stage::JoinOverlay,
        Stage::ConfigureManagedRoutes,
        Stage::ScheduleBootAction,
    ] {
        assert!(
            matches!(summary.status_of(stage), Some(StageStatus::Skipped(_))),
            "{stage}"
        );
    }
    assert_eq!(
        summary.status_of(Stage::PrintInstructions),
        Some(&StageStatus::Completed)
    );
    assert!(harness.overlay.calls.lock().unwrap().is_empty());
    assert!(harness.jobs.table.lock().unwrap().is_none());
    assert!(output
        .contents()
        .contains("@reboot sleep 60 && brctl addif br0 ZEROTIER_INTERFACE"));
}

#[tokio::test]
async fn test_short_network_id_is_treated_as_absent() {
    let harness = Harness::new();

    let (result, _) = harness
        .run(PrivilegeStatus::Elevated, &answers("8056c2e21c", "yes"))
        .await;

    let RunOutcome::Completed(summary) = result.unwrap() else {
        panic!("run was cancelled");
    };
    assert!(matches!(
        summary.status_of(Stage::JoinOverlay),
        Some(StageStatus::Skipped(_))
    ));
    assert!(harness.overlay.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_declined_confirmation_changes_nothing() {
    let harness = Harness::new();

    let (result, _) = harness
        .run(PrivilegeStatus::Elevated, &answers(NETWORK, "no"))
        .await;

    assert_eq!(result.unwrap(), RunOutcome::Cancelled);
    assert!(harness.read("dhcpcd.conf").is_none());
    assert!(harness.read("interfaces").is_none());
}

#[tokio::test]
async fn test_refusing_to_disable_conflicting_service_is_fatal() {
    let mut harness = Harness::new();
    harness.service_active = true;

    let mut script = answers(NETWORK, "yes");
    script.push("no");
    let (result, output) = harness.run(PrivilegeStatus::Elevated, &script).await;

    let err = result.unwrap_err();
    assert!(matches!(err, BridgeError::Prerequisite(_)));
    assert!(err
        .to_string()
        .contains("cannot continue with NetworkManager active"));
    assert!(harness.read("dhcpcd.conf").is_none());
    assert!(harness.read("interfaces").is_none());
    assert!(!output.contents().contains('✗'));
}

#[tokio::test]
async fn test_unprivileged_run_stops_before_prompting() {
    let harness = Harness::new();

    let (result, output) = harness.run(PrivilegeStatus::Unprivileged, &[]).await;

    let err = result.unwrap_err();
    assert!(matches!(err, BridgeError::Permission(_)));
    assert!(err.to_string().contains("must be run as root"));
    // Nothing is printed, not even the banner; the caller reports the error.
    assert!(output.contents().is_empty());
    assert!(harness.read("dhcpcd.conf").is_none());
}
