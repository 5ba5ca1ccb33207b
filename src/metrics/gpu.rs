//! GPU metrics provider boundary.
//!
//! Real GPU measurement is reserved for a future hardware-telemetry source;
//! the built-in provider reports fixed zeros.

use serde::{Deserialize, Serialize};

/// GPU utilization figures plus dedicated-memory usage, in the float shape a
/// real hardware-monitor integration must supply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GpuMetrics {
    pub load: f64,
    pub clock_mhz: f64,
    pub freq_mhz: f64,
    pub temp_c: f64,
    pub vram_used_mb: f64,
    pub vram_total_mb: f64,
}

/// Source of GPU metrics, replaceable once a real monitor is wired in.
pub trait GpuProvider: Send + Sync {
    fn read_gpu(&self) -> GpuMetrics;
}

/// Placeholder provider: every field stays zero.
pub struct PlaceholderGpu;

impl GpuProvider for PlaceholderGpu {
    fn read_gpu(&self) -> GpuMetrics {
        GpuMetrics::default()
    }
}
