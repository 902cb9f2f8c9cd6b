// file: src/network/executor.rs
// version: 2.0.0
// guid: exec0001-2345-6789-abcd-ef0123456789

//! Command execution trait shared by every shell-backed collaborator

use crate::{BridgeError, Result};

/// What the caller wants to happen when a command exits non-zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// A non-zero exit becomes an error that stops the run
    Fatal,
    /// The result is handed back for the caller to branch on
    Recoverable,
}

/// Outcome of one external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Exit code, -1 when the process was killed by a signal or never started
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub disposition: Disposition,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Apply the disposition: fatal failures turn into a process error
    pub fn settle(self, command: &str) -> Result<Self> {
        if !self.success() && self.disposition == Disposition::Fatal {
            let detail = if self.stderr.trim().is_empty() {
                self.stdout.trim().to_string()
            } else {
                self.stderr.trim().to_string()
            };
            return Err(BridgeError::process(command, Some(self.exit_code), detail));
        }
        Ok(self)
    }
}

/// Runs shell command lines on the host.
///
/// No retries happen at this layer.
#[async_trait::async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Execute `command`, feeding `input` on stdin when given
    async fn execute_with_input(
        &self,
        command: &str,
        input: Option<&str>,
        disposition: Disposition,
    ) -> Result<CommandResult>;

    /// Execute `command` with an empty stdin
    async fn execute(&self, command: &str, disposition: Disposition) -> Result<CommandResult> {
        self.execute_with_input(command, None, disposition).await
    }

    /// Execute a command intended as a boolean check
    async fn check_silent(&self, command: &str) -> bool {
        self.execute(command, Disposition::Recoverable)
            .await
            .map(|result| result.success())
            .unwrap_or(false)
    }
}
