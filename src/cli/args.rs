// file: src/cli/args.rs
// version: 2.0.0
// guid: f6g7h8i9-j0k1-2345-6789-012345fghijk

//! Command line argument definitions
//!
//! The setup itself is interactive; flags only tune diagnostics and where
//! host settings come from.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "zerotier-bridge-setup")]
#[command(about = "Configure this host as a bridge between the local LAN and a ZeroTier network")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Debug-level diagnostics on stderr
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only errors on stderr
    #[arg(short, long)]
    pub quiet: bool,

    /// YAML file overriding host settings (paths, mirrors, delays)
    #[arg(long, env = "BRIDGE_SETUP_CONFIG")]
    pub config: Option<PathBuf>,
}
