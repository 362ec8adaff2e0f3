//! Wireless channel computation core for a network emulation framework.
//!
//! Given transmitter/receiver positions and per-node radio parameters, this
//! crate computes received power, SNR, SINR, packet error rate, selects an
//! MCS, and emits the small tuple of netem parameters (delay, jitter, loss,
//! rate) an external traffic-shaping layer applies to real interfaces. See
//! [`orchestrator::ChannelOrchestrator`] for the top-level entry point.

pub mod engine_registry;
pub mod error;
pub mod frequency_group;
pub mod interference;
pub mod link_budget;
pub mod mac;
pub mod mcs;
pub mod node;
pub mod orchestrator;
pub mod path;
pub mod path_cache;
pub mod per;
pub mod position;
pub mod sinr;
pub mod topology;
pub mod units;
mod utility;
