// file: src/logging/logger.rs
// version: 2.0.0
// guid: j0k1l2m3-n4o5-6789-0123-456789jklmno

//! Logger initialization and configuration
//!
//! Operator-facing text goes through [`crate::console::Console`]; tracing output
//! is diagnostic and lands on stderr, so the default level stays at `warn`.

use crate::Result;
use tracing::Instrument;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Pick the filter for the requested verbosity, letting `RUST_LOG` win when set
fn build_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    }
}

/// Initialize the logging system
pub fn init_logger(verbose: bool, quiet: bool) -> Result<()> {
    tracing_subscriber::registry()
        .with(build_filter(verbose, quiet))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init()
        .map_err(|e| crate::BridgeError::config(format!("Failed to initialize logger: {}", e)))?;

    Ok(())
}

/// Run a future inside a named span for one orchestrator stage
pub async fn with_async_operation_span<F, Fut, R>(operation: &str, f: F) -> R
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = R>,
{
    let span = tracing::info_span!("stage", name = operation);
    async move { f().await }.instrument(span).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_is_callable_more_than_once() {
        // The global subscriber can only be set once per process; the second
        // call must report an error instead of panicking.
        let first = init_logger(false, false);
        let second = init_logger(true, false);
        assert!(first.is_ok() || second.is_err());
        assert!(second.is_err() || first.is_err());
    }

    #[tokio::test]
    async fn test_with_async_operation_span_returns_value() {
        let result = with_async_operation_span("install-packages", || async { 42 }).await;
        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn test_with_async_operation_span_awaits_inner_future() {
        let result = with_async_operation_span("join-overlay", || async {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
            "joined"
        })
        .await;

        assert_eq!(result, "joined");
    }
}
