// file: src/overlay/joiner.rs
// version: 1.0.0
// guid: 3b0f6a8e-51a3-4f38-bf0c-3d0d1e9c7a52

//! Joining the overlay network and tuning it for the bridge

use super::client::{network_for_interface, NodeInfo, OverlayClient};
use crate::config::{NetworkId, Settings};
use crate::console::Console;
use crate::netconfig::LinkInspector;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Result of the join stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinReport {
    pub joined: bool,
    /// First link carrying the overlay prefix after the settle delay
    pub interface: Option<String>,
}

/// Joins a network, then looks for the interface it creates
pub struct OverlayJoiner {
    client: Arc<dyn OverlayClient>,
    links: Arc<dyn LinkInspector>,
    interface_prefix: String,
    settle: Duration,
}

impl OverlayJoiner {
    pub fn new(
        client: Arc<dyn OverlayClient>,
        links: Arc<dyn LinkInspector>,
        settings: &Settings,
    ) -> Self {
        Self {
            client,
            links,
            interface_prefix: settings.overlay_interface_prefix.clone(),
            settle: Duration::from_secs(settings.join_settle_secs),
        }
    }

    /// Join `network`; a failed join is reported and leaves no interface
    pub async fn join(&self, network: &NetworkId, console: &Console) -> JoinReport {
        console.info(&format!("Joining ZeroTier network: {}", network));

        let joined = self.client.join(network).await.unwrap_or_else(|e| {
            warn!("Join command failed: {}", e);
            false
        });

        if !joined {
            console.error("Failed to join network");
            console.info(&format!(
                "You can join manually later with: {}",
                console.highlight(&format!("sudo zerotier-cli join {}", network))
            ));
            return JoinReport {
                joined: false,
                interface: None,
            };
        }

        console.success("Joined network successfully");
        tokio::time::sleep(self.settle).await;

        let interface = self.discover_interface().await;
        match &interface {
            Some(name) => console.success(&format!("ZeroTier interface: {}", name)),
            None => console.warning(
                "ZeroTier interface not found yet - authorize this node in ZeroTier Central",
            ),
        }

        JoinReport {
            joined: true,
            interface,
        }
    }

    /// First link whose name starts with the overlay prefix
    pub async fn discover_interface(&self) -> Option<String> {
        match self.links.first_with_prefix(&self.interface_prefix).await {
            Ok(found) => found,
            Err(e) => {
                debug!("Link listing failed: {}", e);
                None
            }
        }
    }

    /// Stop the overlay controller from pushing managed routes to this node.
    ///
    /// The network id comes from the `listnetworks` line naming `interface`,
    /// falling back to `configured`. Returns whether the setting was applied.
    pub async fn configure_managed_routes(
        &self,
        interface: &str,
        configured: Option<&NetworkId>,
        console: &Console,
    ) -> bool {
        console.info("Configuring ZeroTier to allow bridging...");

        let listed = match self.client.list_networks().await {
            Ok(Some(listing)) => network_for_interface(&listing, interface),
            Ok(None) => None,
            Err(e) => {
                debug!("listnetworks failed: {}", e);
                None
            }
        };

        let Some(network) = listed.or_else(|| configured.map(|id| id.as_str().to_string())) else {
            console.warning("Could not determine the network for the ZeroTier interface");
            return false;
        };

        let applied = self
            .client
            .set_allow_managed(&network, false)
            .await
            .unwrap_or_else(|e| {
                warn!("Setting allowManaged failed: {}", e);
                false
            });

        if applied {
            console.success(&format!("Disabled managed addresses for network {}", network));
        } else {
            console.warning(&format!(
                "Could not disable managed addresses for network {}",
                network
            ));
        }
        applied
    }

    /// Local node identity for the closing instructions
    pub async fn node_info(&self) -> Option<NodeInfo> {
        self.client.info().await.unwrap_or_else(|e| {
            debug!("zerotier-cli info failed: {}", e);
            None
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use std::sync::Mutex;

    struct FakeClient {
        join_ok: bool,
        listing: Option<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeClient {
        fn new(join_ok: bool, listing: Option<&str>) -> Self {
            Self {
                join_ok,
                listing: listing.map(str::to_string),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl OverlayClient for FakeClient {
        async fn is_installed(&self) -> bool {
            true
        }
        async fn install(&self) -> Result<bool> {
            Ok(true)
        }
        async fn info(&self) -> Result<Option<NodeInfo>> {
            Ok(Some(NodeInfo {
                node_id: "a1b2c3d4e5".to_string(),
                version: "1.12.2".to_string(),
                status: "ONLINE".to_string(),
            }))
        }
        async fn join(&self, network: &NetworkId) -> Result<bool> {
            self.calls.lock().unwrap().push(format!("join {network}"));
            Ok(self.join_ok)
        }
        async fn list_networks(&self) -> Result<Option<String>> {
            Ok(self.listing.clone())
        }
        async fn set_allow_managed(&self, network: &str, allow: bool) -> Result<bool> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("set {network} allowManaged={}", u8::from(allow)));
            Ok(true)
        }
    }

    struct FakeLinks(Vec<&'static str>);

    #[async_trait::async_trait]
    impl LinkInspector for FakeLinks {
        async fn link_names(&self) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|name| name.to_string()).collect())
        }
    }

    fn joiner(client: Arc<FakeClient>, links: Vec<&'static str>) -> OverlayJoiner {
        let settings = Settings {
            join_settle_secs: 0,
            ..Settings::default()
        };
        OverlayJoiner::new(client, Arc::new(FakeLinks(links)), &settings)
    }

    fn network() -> NetworkId {
        NetworkId::parse("8056c2e21c000001").unwrap()
    }

    #[tokio::test]
    async fn test_join_discovers_first_prefixed_interface() {
        let client = Arc::new(FakeClient::new(true, None));
        let joiner = joiner(client.clone(), vec!["lo", "eth0", "ztmjfcpubr", "ztabc"]);
        let (console, _) = Console::buffered();

        let report = joiner.join(&network(), &console).await;

        assert_eq!(
            report,
            JoinReport {
                joined: true,
                interface: Some("ztmjfcpubr".to_string())
            }
        );
        assert_eq!(*client.calls.lock().unwrap(), vec!["join 8056c2e21c000001"]);
    }

    #[tokio::test]
    async fn test_join_without_interface_warns() {
        let joiner = joiner(Arc::new(FakeClient::new(true, None)), vec!["lo", "eth0"]);
        let (console, buffer) = Console::buffered();

        let report = joiner.join(&network(), &console).await;

        assert!(report.joined);
        assert!(report.interface.is_none());
        assert!(buffer.contents().contains("⚠ ZeroTier interface not found yet"));
    }

    #[tokio::test]
    async fn test_failed_join_skips_discovery() {
        let joiner = joiner(Arc::new(FakeClient::new(false, None)), vec!["ztmjfcpubr"]);
        let (console, buffer) = Console::buffered();

        let report = joiner.join(&network(), &console).await;

        assert!(!report.joined);
        assert!(report.interface.is_none());
        assert!(buffer
            .contents()
            .contains("sudo zerotier-cli join 8056c2e21c000001"));
    }

    #[tokio::test]
    async fn test_managed_routes_use_listed_network() {
        let listing = "200 listnetworks <nwid> <name> <mac> <status> <type> <dev> <ZT assigned ips>\n\
                       200 listnetworks 0123456789abcdef home 7a:11:22:33:44:55 OK PRIVATE ztmjfcpubr 10.147.17.4/24\n";
        let client = Arc::new(FakeClient::new(true, Some(listing)));
        let joiner = joiner(client.clone(), vec![]);
        let (console, _) = Console::buffered();

        assert!(
            joiner
                .configure_managed_routes("ztmjfcpubr", Some(&network()), &console)
                .await
        );
        assert_eq!(
            *client.calls.lock().unwrap(),
            vec!["set 0123456789abcdef allowManaged=0"]
        );
    }

    #[tokio::test]
    async fn test_managed_routes_fall_back_to_configured_network() {
        let client = Arc::new(FakeClient::new(true, None));
        let joiner = joiner(client.clone(), vec![]);
        let (console, _) = Console::buffered();

        assert!(
            joiner
                .configure_managed_routes("ztmjfcpubr", Some(&network()), &console)
                .await
        );
        assert_eq!(
            *client.calls.lock().unwrap(),
            vec!["set 8056c2e21c000001 allowManaged=0"]
        );
    }

    #[tokio::test]
    async fn test_managed_routes_without_any_network_id() {
        let client = Arc::new(FakeClient::new(true, None));
        let joiner = joiner(client.clone(), vec![]);
        let (console, _) = Console::buffered();

        assert!(!joiner.configure_managed_routes("ztx", None, &console).await);
        assert!(client.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_node_info() {
        let joiner = joiner(Arc::new(FakeClient::new(true, None)), vec![]);
        assert_eq!(joiner.node_info().await.unwrap().node_id, "a1b2c3d4e5");
    }
}
