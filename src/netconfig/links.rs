// file: src/netconfig/links.rs
// version: 1.0.0
// guid: 5b90f5f5-d841-4216-ace8-f5c0db9d3a82

//! Network link listing

use crate::network::{CommandExecutor, Disposition};
use crate::Result;
use serde::Deserialize;
use std::sync::Arc;

/// Lists the link names currently known to the kernel
#[async_trait::async_trait]
pub trait LinkInspector: Send + Sync {
    async fn link_names(&self) -> Result<Vec<String>>;

    /// First link whose name starts with `prefix`
    async fn first_with_prefix(&self, prefix: &str) -> Result<Option<String>> {
        Ok(self
            .link_names()
            .await?
            .into_iter()
            .find(|name| name.starts_with(prefix)))
    }
}

#[derive(Debug, Deserialize)]
struct IpLinkShow {
    ifname: String,
}

/// Parse `ip -j link show` output into link names, in kernel order
pub fn parse_ip_link_json(output: &str) -> Result<Vec<String>> {
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }

    let links: Vec<IpLinkShow> = serde_json::from_str(output)?;
    Ok(links.into_iter().map(|link| link.ifname).collect())
}

/// [`LinkInspector`] backed by iproute2
pub struct IpLinkInspector {
    executor: Arc<dyn CommandExecutor>,
}

impl IpLinkInspector {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait::async_trait]
impl LinkInspector for IpLinkInspector {
    async fn link_names(&self) -> Result<Vec<String>> {
        let result = self
            .executor
            .execute("ip -j link show", Disposition::Fatal)
            .await?;
        parse_ip_link_json(&result.stdout)
    }
}
