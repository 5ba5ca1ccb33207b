//! hostprobe - a lightweight local hardware-telemetry probe.
//!
//! Samples CPU load from cumulative OS time counters, physical-memory status
//! via a two-tier native query, and placeholder GPU figures, then renders one
//! metrics record per cycle to the console and an optional record log.

pub mod collector;
pub mod display;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod monitor;
pub mod platform;
