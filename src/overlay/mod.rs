// file: src/overlay/mod.rs
// version: 1.0.0
// guid: e4a5c0f2-6d8b-4c1e-9a37-5f20b7d3c918

//! ZeroTier overlay network client and join flow

pub mod client;
pub mod joiner;

pub use client::{NodeInfo, OverlayClient, ZeroTierCli};
pub use joiner::{JoinReport, OverlayJoiner};
