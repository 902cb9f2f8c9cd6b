// file: src/lib.rs
// version: 3.0.0
// guid: d82472d1-7f0f-4eb4-b0a3-6e1547103eb4

//! # ZeroTier Bridge Setup
//!
//! Turns a Debian-family single-board host into a layer-2 bridge between its
//! wired LAN and a ZeroTier network: installs `bridge-utils`, `ifupdown` and the
//! ZeroTier client, keeps dhcpcd away from the bridged interfaces, writes
//! `/etc/network/interfaces`, joins the network and schedules the boot-time
//! `brctl addif` that attaches the overlay interface to `br0`.
//!
//! Every external tool sits behind a narrow async trait so the
//! [`orchestrator::Orchestrator`] can be driven with fakes.

pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod netconfig;
pub mod network;
pub mod orchestrator;
pub mod overlay;
pub mod prompt;
pub mod provision;
pub mod schedule;
pub mod utils;

pub use error::{BridgeError, Result};
