// file: src/network/local.rs
// version: 2.0.0
// guid: local001-2345-6789-abcd-ef0123456789

//! Local command execution through bash

use super::executor::{CommandExecutor, CommandResult, Disposition};
use crate::{BridgeError, Result};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error};

/// Runs commands on this machine with `bash -c`
#[derive(Debug, Default, Clone)]
pub struct LocalClient;

impl LocalClient {
    /// Create a new local client
    pub fn new() -> Self {
        Self
    }

    async fn run(&self, command: &str, input: Option<&str>) -> std::io::Result<std::process::Output> {
        let mut child = Command::new("bash")
            .arg("-c")
            .arg(command)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let (Some(data), Some(mut stdin)) = (input, child.stdin.take()) {
            stdin.write_all(data.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        child.wait_with_output().await
    }
}

#[async_trait::async_trait]
impl CommandExecutor for LocalClient {
    async fn execute_with_input(
        &self,
        command: &str,
        input: Option<&str>,
        disposition: Disposition,
    ) -> Result<CommandResult> {
        debug!("Executing local command: {}", command);

        let output = match self.run(command, input).await {
            Ok(output) => output,
            Err(e) if disposition == Disposition::Fatal => {
                return Err(BridgeError::process(
                    command,
                    None,
                    format!("Failed to execute command: {}", e),
                ));
            }
            Err(e) => {
                error!("Failed to execute '{}': {}", command, e);
                return Ok(CommandResult {
                    exit_code: -1,
                    stdout: String::new(),
                    stderr: e.to_string(),
                    disposition,
                });
            }
        };

        let result = CommandResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            disposition,
        };

        if result.success() {
            debug!("Command succeeded: {}", command);
        } else {
            debug!(
                "Command '{}' exited with {}: {}",
                command,
                result.exit_code,
                result.stderr.trim()
            );
        }

        result.settle(command)
    }
}
