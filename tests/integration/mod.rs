//! Integration test modules for MIDIBoy
//!
//! - bridge: poll loop, pacing, overflow, run/stop
//! - routing: remapping, policy drops, live map replacement
//! - config: validation and serialization

pub mod bridge;
pub mod config;
pub mod routing;
