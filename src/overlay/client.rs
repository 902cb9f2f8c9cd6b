// file: src/overlay/client.rs
// version: 1.0.0
// guid: a62a9446-f3d4-4fbe-9e90-db382acd8a16

//! ZeroTier command-line client

use crate::config::NetworkId;
use crate::network::{CommandExecutor, Disposition};
use crate::utils::shell::quote;
use crate::utils::SystemUtils;
use crate::Result;
use regex::Regex;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Identity of the local overlay node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub node_id: String,
    pub version: String,
    pub status: String,
}

/// Parse `zerotier-cli info` output: `200 info <node> <version> <status>`
pub fn parse_node_info(output: &str) -> Option<NodeInfo> {
    let parts: Vec<&str> = output.split_whitespace().collect();
    if parts.len() < 3 {
        return None;
    }

    Some(NodeInfo {
        node_id: parts[2].to_string(),
        version: parts.get(3).unwrap_or(&"unknown").to_string(),
        status: parts.get(4).unwrap_or(&"unknown").to_string(),
    })
}

fn network_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b([a-f0-9]{16})\b").expect("static network id pattern compiles"))
}

/// Network id on the first `listnetworks` line that mentions `interface`
pub fn network_for_interface(listing: &str, interface: &str) -> Option<String> {
    listing
        .lines()
        .filter(|line| line.split_whitespace().any(|field| field == interface))
        .find_map(|line| {
            network_id_pattern()
                .captures(line)
                .map(|caps| caps[1].to_string())
        })
}

/// The overlay network client, narrowed to what the bridge setup needs
#[async_trait::async_trait]
pub trait OverlayClient: Send + Sync {
    async fn is_installed(&self) -> bool;

    /// Run the vendor installer
    async fn install(&self) -> Result<bool>;

    async fn info(&self) -> Result<Option<NodeInfo>>;

    async fn join(&self, network: &NetworkId) -> Result<bool>;

    /// Raw `listnetworks` output, `None` when the command fails
    async fn list_networks(&self) -> Result<Option<String>>;

    async fn set_allow_managed(&self, network: &str, allow: bool) -> Result<bool>;
}

/// [`OverlayClient`] backed by `zerotier-cli`
pub struct ZeroTierCli {
    executor: Arc<dyn CommandExecutor>,
    cli_path: PathBuf,
    install_url: String,
}

impl ZeroTierCli {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        cli_path: impl Into<PathBuf>,
        install_url: impl Into<String>,
    ) -> Self {
        Self {
            executor,
            cli_path: cli_path.into(),
            install_url: install_url.into(),
        }
    }

    fn cli(&self, args: &str) -> String {
        format!("{} {}", quote(&self.cli_path.to_string_lossy()), args)
    }
}

#[async_trait::async_trait]
impl OverlayClient for ZeroTierCli {
    async fn is_installed(&self) -> bool {
        SystemUtils::binary_present(&self.cli_path).await
    }

    async fn install(&self) -> Result<bool> {
        let command = format!("curl -s {} | bash", quote(&self.install_url));
        let result = self
            .executor
            .execute(&command, Disposition::Recoverable)
            .await?;
        Ok(result.success())
    }

    async fn info(&self) -> Result<Option<NodeInfo>> {
        let result = self
            .executor
            .execute(&self.cli("info"), Disposition::Recoverable)
            .await?;
        if !result.success() {
            return Ok(None);
        }
        Ok(parse_node_info(&result.stdout))
    }

    async fn join(&self, network: &NetworkId) -> Result<bool> {
        let result = self
            .executor
            .execute(
                &self.cli(&format!("join {}", quote(network.as_str()))),
                Disposition::Recoverable,
            )
            .await?;
        debug!("join {} -> {}", network, result.stdout.trim());
        Ok(result.success())
    }

    async fn list_networks(&self) -> Result<Option<String>> {
        let result = self
            .executor
            .execute(&self.cli("listnetworks"), Disposition::Recoverable)
            .await?;
        Ok(result.success().then_some(result.stdout))
    }

    async fn set_allow_managed(&self, network: &str, allow: bool) -> Result<bool> {
        let command = self.cli(&format!(
            "set {} allowManaged={}",
            quote(network),
            u8::from(allow)
        ));
        let result = self
            .executor
            .execute(&command, Disposition::Recoverable)
            .await?;
        Ok(result.success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTNETWORKS: &str = "\
200 listnetworks <nwid> <name> <mac> <status> <type> <dev> <ZT assigned ips>
200 listnetworks 8056c2e21c000001 earth.zerotier.net 7a:11:22:33:44:55 OK PUBLIC ztmjfcpubr 10.147.17.4/24
200 listnetworks a84ac5c10a1b2c3d home-lan 7a:aa:bb:cc:dd:ee OK PRIVATE ztabcdef12 -
";

    #[test]
    fn test_parse_node_info() {
        let info = parse_node_info("200 info 1234567890 1.16.0 ONLINE\n").unwrap();
        assert_eq!(info.node_id, "1234567890");
        assert_eq!(info.version, "1.16.0");
        assert_eq!(info.status, "ONLINE");
    }

    #[test]
    fn test_parse_node_info_partial() {
        let info = parse_node_info("200 info 1234567890").unwrap();
        assert_eq!(info.version, "unknown");
        assert_eq!(info.status, "unknown");
        assert!(parse_node_info("200 info").is_none());
    }

    #[test]
    fn test_network_for_interface() {
        assert_eq!(
            network_for_interface(LISTNETWORKS, "ztabcdef12"),
            Some("a84ac5c10a1b2c3d".to_string())
        );
        assert_eq!(
            network_for_interface(LISTNETWORKS, "ztmjfcpubr"),
            Some("8056c2e21c000001".to_string())
        );
        assert_eq!(network_for_interface(LISTNETWORKS, "zt0000"), None);
    }
}
