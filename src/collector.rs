//! Per-cycle aggregation of CPU, GPU, and memory metrics into one record.

use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::ProbeError;
use crate::metrics::{
    CpuUsageEstimator, GpuMetrics, GpuProvider, MemorySnapshot, MemoryStatusReader,
};

/// CPU figures for one cycle. Clock, frequency, and temperature are
/// placeholders pending a future hardware-telemetry source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuMetrics {
    pub load: f64,
    pub clock_mhz: f64,
    pub freq_mhz: f64,
    pub temp_c: f64,
}

/// One immutable per-cycle metrics record, stamped with capture time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub timestamp: DateTime<Local>,
    pub cpu: CpuMetrics,
    pub gpu: GpuMetrics,
    pub memory: MemorySnapshot,
}

/// Composes the sub-collectors into a [`MetricsRecord`] once per cycle.
pub struct MetricsCollector {
    cpu: CpuUsageEstimator,
    memory: MemoryStatusReader,
    gpu: Box<dyn GpuProvider>,
}

impl MetricsCollector {
    pub fn new(
        cpu: CpuUsageEstimator,
        memory: MemoryStatusReader,
        gpu: Box<dyn GpuProvider>,
    ) -> Self {
        Self { cpu, memory, gpu }
    }

    /// Collects one record. Never fails: each sub-collector already degrades
    /// to defaults, and a fault in the aggregation itself is logged and
    /// substituted with zero-filled fields so the cycle still completes.
    pub fn collect(&self) -> MetricsRecord {
        let cpu_load = guarded("cpu", || self.cpu.compute_usage());
        let gpu = guarded("gpu", || self.gpu.read_gpu());
        let memory = guarded("memory", || self.memory.read_memory());

        MetricsRecord {
            timestamp: Local::now(),
            cpu: CpuMetrics {
                load: cpu_load,
                ..CpuMetrics::default()
            },
            gpu,
            memory,
        }
    }

    /// Releases sampler resources on shutdown. Currently nothing to release;
    /// reserved for providers that need teardown.
    pub fn close(&self) {}
}

fn guarded<T: Default>(stage: &'static str, call: impl FnOnce() -> T) -> T {
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(value) => value,
        Err(_) => {
            error!("{}, substituting zeros", ProbeError::AggregationFault(stage));
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use crate::metrics::{
        MemoryProbe, PlaceholderGpu, RawMemoryStatus, TimeCounterSample, TimeCounterSource,
    };

    struct QuietCounters;

    impl TimeCounterSource for QuietCounters {
        fn sample(&self) -> Result<TimeCounterSample, ProbeError> {
            Ok(TimeCounterSample::default())
        }
    }

    struct PanickingCounters;

    impl TimeCounterSource for PanickingCounters {
        fn sample(&self) -> Result<TimeCounterSample, ProbeError> {
            panic!("injected sampler fault");
        }
    }

    struct HealthyProbe;

    impl MemoryProbe for HealthyProbe {
        fn query_extended(&self) -> Result<RawMemoryStatus, ProbeError> {
            Ok(RawMemoryStatus {
                load_percent: 40,
                total_bytes: 8 << 30,
                avail_bytes: 5 << 30,
            })
        }

        fn query_legacy(&self) -> Result<RawMemoryStatus, ProbeError> {
            self.query_extended()
        }
    }

    struct PanickingProbe;

    impl MemoryProbe for PanickingProbe {
        fn query_extended(&self) -> Result<RawMemoryStatus, ProbeError> {
            panic!("injected probe fault");
        }

        fn query_legacy(&self) -> Result<RawMemoryStatus, ProbeError> {
            panic!("injected probe fault");
        }
    }

    struct PanickingGpu;

    impl GpuProvider for PanickingGpu {
        fn read_gpu(&self) -> GpuMetrics {
            panic!("injected gpu fault");
        }
    }

    #[test]
    fn gpu_and_placeholder_cpu_fields_are_exactly_zero() {
        let collector = MetricsCollector::new(
            CpuUsageEstimator::new(Box::new(QuietCounters)),
            MemoryStatusReader::new(Box::new(HealthyProbe)),
            Box::new(PlaceholderGpu),
        );

        let record = collector.collect();
        assert_eq!(record.gpu, GpuMetrics::default());
        assert_eq!(record.cpu.clock_mhz, 0.0);
        assert_eq!(record.cpu.freq_mhz, 0.0);
        assert_eq!(record.cpu.temp_c, 0.0);
        assert_eq!(record.memory.total_mb, 8192.0);
    }

    #[test]
    fn faulted_sub_collectors_still_produce_a_complete_record() {
        let collector = MetricsCollector::new(
            CpuUsageEstimator::new(Box::new(PanickingCounters)),
            MemoryStatusReader::new(Box::new(PanickingProbe)),
            Box::new(PanickingGpu),
        );

        let record = collector.collect();
        assert_eq!(record.cpu.load, 0.0);
        assert_eq!(record.gpu, GpuMetrics::default());
        assert_eq!(record.memory, MemorySnapshot::default());
    }
}
