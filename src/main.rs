// file: src/main.rs
// version: 2.1.0
// guid: h8i9j0k1-l2m3-4567-8901-234567hijklm

//! ZeroTier bridge setup - main entry point

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, warn};
use zerotier_bridge_setup::{
    cli::Cli,
    config::loader::SettingsLoader,
    console::Console,
    logging::init_logger,
    network::{CommandExecutor, LocalClient},
    orchestrator::{Collaborators, Orchestrator, RunContext, RunOutcome},
    prompt::TerminalPrompter,
    utils::PrivilegeStatus,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logger(cli.verbose, cli.quiet) {
        eprintln!("{}", e);
    }

    let console = Console::stdout();

    // Registered before anything runs so an early Ctrl+C is never lost.
    let mut interrupt = match signal(SignalKind::interrupt()) {
        Ok(stream) => stream,
        Err(e) => {
            console.error(&format!("Failed to install the interrupt handler: {}", e));
            return ExitCode::FAILURE;
        }
    };

    tokio::select! {
        result = run(cli) => match result {
            Ok(RunOutcome::Completed(summary)) => {
                debug!("Run finished: {:?}", summary.stages);
                ExitCode::SUCCESS
            }
            Ok(RunOutcome::Cancelled) => ExitCode::SUCCESS,
            Err(e) => {
                console.error(&format!("{:#}", e));
                ExitCode::FAILURE
            }
        },
        _ = interrupt.recv() => {
            warn!("Interrupted by operator");
            console.line("");
            console.warning("Setup interrupted by user");
            // A prompt may still be blocked on stdin; do not wait for it.
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<RunOutcome> {
    let privilege = PrivilegeStatus::detect();
    privilege.require_elevated()?;

    let settings = SettingsLoader::new()
        .load_or_default(cli.config.as_ref())
        .context("Failed to load settings")?;

    let executor: Arc<dyn CommandExecutor> = Arc::new(LocalClient::new());
    let tools = Collaborators::system(executor, &settings);
    let context = RunContext {
        privilege,
        console: Console::stdout(),
        prompter: Box::new(TerminalPrompter::new()),
        settings,
    };

    // Prompts wait on stdin, so the run lives on its own task to keep the
    // interrupt branch in `main` responsive.
    let outcome = tokio::spawn(Orchestrator::new(context, tools).run())
        .await
        .context("Setup task aborted")??;

    Ok(outcome)
}
