// file: src/netconfig/service.rs
// version: 1.1.0
// guid: 9f761858-60ed-4e98-9c44-a077b620523e

//! Conflicting network-management service detection

use crate::console::Console;
use crate::network::{CommandExecutor, Disposition};
use crate::prompt::{ask_yes_no, Prompter};
use crate::utils::shell::quote;
use crate::{BridgeError, Result};
use std::sync::Arc;
use tracing::warn;

/// Controls system services
#[async_trait::async_trait]
pub trait ServiceController: Send + Sync {
    async fn is_active(&self, service: &str) -> bool;
    async fn stop(&self, service: &str) -> Result<bool>;
    async fn disable(&self, service: &str) -> Result<bool>;
}

/// [`ServiceController`] backed by systemctl
pub struct SystemctlController {
    executor: Arc<dyn CommandExecutor>,
}

impl SystemctlController {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    async fn systemctl(&self, verb: &str, service: &str) -> Result<bool> {
        let command = format!("systemctl {} {}", verb, quote(service));
        let result = self
            .executor
            .execute(&command, Disposition::Recoverable)
            .await?;
        Ok(result.success())
    }
}

#[async_trait::async_trait]
impl ServiceController for SystemctlController {
    async fn is_active(&self, service: &str) -> bool {
        self.executor
            .check_silent(&format!("systemctl is-active --quiet {}", quote(service)))
            .await
    }

    async fn stop(&self, service: &str) -> Result<bool> {
        self.systemctl("stop", service).await
    }

    async fn disable(&self, service: &str) -> Result<bool> {
        self.systemctl("disable", service).await
    }
}

/// What happened to the conflicting service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceResolution {
    /// The service was not running
    NotActive,
    /// The operator agreed and the service was stopped and disabled
    Disabled,
    /// The operator agreed but stopping or disabling reported failure
    DisableFailed,
}

/// Ask the operator to stop and disable `service` if it is running.
///
/// Refusal is a [`BridgeError::Prerequisite`].
pub async fn resolve_conflicting_service(
    services: &dyn ServiceController,
    prompter: &mut dyn Prompter,
    console: &Console,
    service: &str,
) -> Result<ServiceResolution> {
    if !services.is_active(service).await {
        return Ok(ServiceResolution::NotActive);
    }

    console.warning(&format!(
        "{} is active - this conflicts with manual bridge configuration",
        service
    ));
    console.info(&format!(
        "For bridge configuration to work, {} must be disabled",
        service
    ));

    if !ask_yes_no(prompter, console, &format!("Disable {}?", service)).await? {
        return Err(BridgeError::prerequisite(format!(
            "cannot continue with {} active",
            service
        )));
    }

    console.info(&format!("Disabling {}...", service));
    let stopped = services.stop(service).await.unwrap_or_else(|e| {
        warn!("Stopping {} failed: {}", service, e);
        false
    });
    let disabled = services.disable(service).await.unwrap_or_else(|e| {
        warn!("Disabling {} failed: {}", service, e);
        false
    });

    if stopped && disabled {
        console.success(&format!("{} disabled", service));
        Ok(ServiceResolution::Disabled)
    } else {
        console.warning(&format!(
            "Could not fully disable {}; disable it manually before rebooting",
            service
        ));
        Ok(ServiceResolution::DisableFailed)
    }
}
