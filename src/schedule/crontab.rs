// file: src/schedule/crontab.rs
// version: 1.0.0
// guid: 7c3e1f92-08ab-4d6e-b5a1-9e4f2c6d8b30

//! Root's crontab as a job table

use crate::network::{CommandExecutor, Disposition};
use crate::Result;
use std::sync::Arc;
use tracing::debug;

/// The per-user scheduled job table
#[async_trait::async_trait]
pub trait JobTable: Send + Sync {
    /// Current table, `None` when the user has none yet
    async fn read(&self) -> Result<Option<String>>;

    /// Replace the whole table
    async fn write(&self, table: &str) -> Result<bool>;
}

/// [`JobTable`] backed by the `crontab` command
pub struct CrontabEditor {
    executor: Arc<dyn CommandExecutor>,
}

impl CrontabEditor {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait::async_trait]
impl JobTable for CrontabEditor {
    async fn read(&self) -> Result<Option<String>> {
        let result = self
            .executor
            .execute("crontab -l", Disposition::Recoverable)
            .await?;
        if result.success() {
            Ok(Some(result.stdout))
        } else {
            // "no crontab for root" exits 1
            debug!("crontab -l: {}", result.stderr.trim());
            Ok(None)
        }
    }

    async fn write(&self, table: &str) -> Result<bool> {
        let result = self
            .executor
            .execute_with_input("crontab -", Some(table), Disposition::Recoverable)
            .await?;
        Ok(result.success())
    }
}
