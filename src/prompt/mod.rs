// file: src/prompt/mod.rs
// version: 1.1.0
// guid: 809c5b55-423b-44f6-8249-75895cbe0f95

//! Operator prompts and run configuration collection
//!
//! Input is gathered here into an immutable [`RunConfig`]; the steps that
//! consume it never read the terminal themselves.

use crate::config::{is_valid_ipv4_format, NetworkId, RunConfig};
use crate::console::Console;
use crate::netconfig::LinkInspector;
use crate::{BridgeError, Result};
use std::collections::VecDeque;
use std::io::BufRead;
use tracing::debug;

/// Source of operator answers
#[async_trait::async_trait]
pub trait Prompter: Send {
    /// Show `question` on `console` and return the answer with surrounding
    /// whitespace removed
    async fn ask(&mut self, console: &Console, question: &str) -> Result<String>;
}

/// Reads answers from stdin
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Prompter for TerminalPrompter {
    async fn ask(&mut self, console: &Console, question: &str) -> Result<String> {
        console.inline(&format!("{} ", question));

        // The read blocks until a newline; it runs on the blocking pool so the
        // runtime keeps serving the interrupt handler meanwhile.
        let (read, answer) = tokio::task::spawn_blocking(|| {
            let mut answer = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut answer)
                .map(|read| (read, answer))
        })
        .await
        .map_err(|e| BridgeError::cancelled(format!("prompt reader stopped: {}", e)))??;

        if read == 0 {
            return Err(BridgeError::cancelled("input closed before an answer was given"));
        }

        Ok(answer.trim().to_string())
    }
}

/// Replays a fixed list of answers, recording the questions asked
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    questions: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            questions: Vec::new(),
        }
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

#[async_trait::async_trait]
impl Prompter for ScriptedPrompter {
    async fn ask(&mut self, _console: &Console, question: &str) -> Result<String> {
        self.questions.push(question.to_string());
        self.answers
            .pop_front()
            .map(|answer| answer.trim().to_string())
            .ok_or_else(|| BridgeError::cancelled(format!("no scripted answer for '{}'", question)))
    }
}

/// Ask with a default used for an empty answer
pub async fn ask_with_default(
    prompter: &mut dyn Prompter,
    console: &Console,
    question: &str,
    default: &str,
) -> Result<String> {
    let answer = prompter
        .ask(console, &format!("{} [{}]:", question, default))
        .await?;
    if answer.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(answer)
    }
}

/// Yes/no question; only `y` and `yes` (any case) count as yes
pub async fn ask_yes_no(prompter: &mut dyn Prompter, console: &Console, question: &str) -> Result<bool> {
    let answer = prompter
        .ask(console, &format!("{} (yes/no):", console.question(question)))
        .await?;
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Re-ask until the answer passes `valid`
pub async fn ask_until_valid(
    prompter: &mut dyn Prompter,
    console: &Console,
    question: &str,
    valid: fn(&str) -> bool,
    complaint: &str,
) -> Result<String> {
    loop {
        let answer = prompter.ask(console, question).await?;
        if valid(&answer) {
            return Ok(answer);
        }
        debug!("Rejected answer '{}' for '{}'", answer, question);
        console.error(complaint);
    }
}

/// Collect the run configuration from the operator.
///
/// Returns `None` when the operator declines the final confirmation.
pub async fn collect_run_config(
    prompter: &mut dyn Prompter,
    console: &Console,
    links: &dyn LinkInspector,
) -> Result<Option<RunConfig>> {
    console.header("Configuration Parameters");

    match links.link_names().await {
        Ok(names) if !names.is_empty() => {
            console.info("Available network interfaces:");
            for name in names {
                console.line(&format!("  {}", name));
            }
        }
        Ok(_) => {}
        Err(e) => debug!("Could not list interfaces: {}", e),
    }

    let physical_interface = loop {
        let answer = ask_with_default(
            prompter,
            console,
            "Physical interface to bridge",
            RunConfig::DEFAULT_INTERFACE,
        )
        .await?;
        if answer.contains(char::is_whitespace) {
            console.error("Interface names cannot contain spaces");
            continue;
        }
        break answer;
    };

    let bridge_ip = ask_until_valid(
        prompter,
        console,
        "Static IP for bridge (e.g., 192.168.1.2):",
        is_valid_ipv4_format,
        "Invalid IP address format",
    )
    .await?;

    let netmask = loop {
        let answer =
            ask_with_default(prompter, console, "Netmask", RunConfig::DEFAULT_NETMASK).await?;
        if is_valid_ipv4_format(&answer) {
            break answer;
        }
        console.error("Invalid netmask format");
    };

    let gateway = ask_until_valid(
        prompter,
        console,
        "Gateway IP (e.g., 192.168.1.1):",
        is_valid_ipv4_format,
        "Invalid IP address format",
    )
    .await?;

    let dns = ask_with_default(prompter, console, "DNS servers", RunConfig::DEFAULT_DNS).await?;

    console.info("You can join the ZeroTier network now or skip and do it manually later.");
    console.info("To join now, you need your ZeroTier Network ID (16-character hex string)");
    console.info("Example: a84ac5c10a1b2c3d");
    let network_answer = prompter
        .ask(console, "ZeroTier Network ID (or press Enter to skip):")
        .await?;
    if !network_answer.is_empty() && NetworkId::parse(&network_answer).is_none() {
        console.warning("Not a 16-character hex network ID; the network join will be skipped");
    }

    let config = RunConfig::new(
        physical_interface,
        bridge_ip,
        netmask,
        gateway,
        dns,
        Some(network_answer.as_str()),
    )?;

    print_summary(console, &config);

    if ask_yes_no(prompter, console, "Proceed with these settings?").await? {
        Ok(Some(config))
    } else {
        console.info("Configuration cancelled. Exiting.");
        Ok(None)
    }
}

fn print_summary(console: &Console, config: &RunConfig) {
    console.header("Configuration Summary");
    console.line(&format!("Physical Interface: {}", config.physical_interface));
    console.line(&format!("Bridge IP: {}", config.bridge_ip));
    console.line(&format!("Netmask: {}", config.netmask));
    console.line(&format!("Gateway: {}", config.gateway));
    console.line(&format!("DNS: {}", config.dns));
    match &config.network_id {
        Some(id) => console.line(&format!("ZeroTier Network: {}", id)),
        None => console.line("ZeroTier Network: Will join manually later"),
    }
}
