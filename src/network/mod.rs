// file: src/network/mod.rs
// version: 2.0.0
// guid: s9t0u1v2-w3x4-5678-9012-345678stuvwx

//! Command execution and package downloads

pub mod download;
pub mod executor;
pub mod local;

pub use download::{Downloader, NetworkDownloader};
pub use executor::{CommandExecutor, CommandResult, Disposition};
pub use local::LocalClient;
