//! Metrics collection modules for the telemetry probe.

pub mod cpu;
pub mod gpu;
pub mod memory;

pub use cpu::{CpuUsageEstimator, TimeCounterSample, TimeCounterSource};
pub use gpu::{GpuMetrics, GpuProvider, PlaceholderGpu};
pub use memory::{MemoryProbe, MemorySnapshot, MemoryStatusReader, RawMemoryStatus};
