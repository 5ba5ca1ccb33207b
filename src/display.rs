//! Console rendering: the startup banner and the fixed per-cycle block.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;

use crate::collector::MetricsRecord;
use crate::monitor::RecordSink;
use crate::platform::Privilege;

/// Renders each record as one fixed-layout console block.
pub struct ConsoleRenderer {
    out: io::Stdout,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for ConsoleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordSink for ConsoleRenderer {
    fn emit(&mut self, record: &MetricsRecord) -> Result<()> {
        let mut out = self.out.lock();
        out.write_all(format_record(record).as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

/// Fixed-layout block: load percentages and temperatures with one decimal,
/// clock/frequency and memory totals as integers.
pub fn format_record(record: &MetricsRecord) -> String {
    let ts = record.timestamp.format("%Y-%m-%d %H:%M:%S");
    format!(
        "\n=== System Metrics - {ts} ===\n\
         CPU: Load: {:.1}% | Clock: {:.0}MHz | Freq: {:.0}MHz | Temp: {:.1}°C\n\
         GPU: Load: {:.1}% | Clock: {:.0}MHz | Freq: {:.0}MHz | Temp: {:.1}°C\n\
         VRAM: {:.0}MB / {:.0}MB\n\
         RAM: Load: {:.1}% | Used: {:.0}MB / {:.0}MB\n",
        record.cpu.load,
        record.cpu.clock_mhz,
        record.cpu.freq_mhz,
        record.cpu.temp_c,
        record.gpu.load,
        record.gpu.clock_mhz,
        record.gpu.freq_mhz,
        record.gpu.temp_c,
        record.gpu.vram_used_mb,
        record.gpu.vram_total_mb,
        record.memory.load_percent,
        record.memory.used_mb,
        record.memory.total_mb,
    )
}

/// Startup banner: program identity, privilege level, host identity, and the
/// configured update interval.
pub fn print_banner(privilege: Privilege, interval: Duration) {
    let rule = "=".repeat(60);
    println!("{rule}");
    println!("   hostprobe v{} - local hardware telemetry", env!("CARGO_PKG_VERSION"));
    println!("{rule}");

    let status = match privilege {
        Privilege::Administrator => "Administrator",
        Privilege::User => "User",
        Privilege::Unknown => "Unknown",
    };
    println!("Privileges: {status}");
    println!("System: {} {}", std::env::consts::OS, std::env::consts::ARCH);
    println!("Interval: {}s", interval.as_secs_f64());
    println!("{}", "-".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{CpuMetrics, MetricsRecord};
    use crate::metrics::{GpuMetrics, MemorySnapshot};
    use chrono::{Local, TimeZone};

    #[test]
    fn block_layout_matches_the_fixed_format() {
        let record = MetricsRecord {
            timestamp: Local.with_ymd_and_hms(2025, 7, 18, 12, 30, 0).unwrap(),
            cpu: CpuMetrics {
                load: 20.0,
                ..CpuMetrics::default()
            },
            gpu: GpuMetrics::default(),
            memory: MemorySnapshot {
                load_percent: 43.0,
                used_mb: 6900.4,
                total_mb: 16384.0,
            },
        };

        let block = format_record(&record);
        assert!(block.contains("=== System Metrics - 2025-07-18 12:30:00 ==="));
        assert!(block.contains("CPU: Load: 20.0% | Clock: 0MHz | Freq: 0MHz | Temp: 0.0°C"));
        assert!(block.contains("GPU: Load: 0.0% | Clock: 0MHz | Freq: 0MHz | Temp: 0.0°C"));
        assert!(block.contains("VRAM: 0MB / 0MB"));
        assert!(block.contains("RAM: Load: 43.0% | Used: 6900MB / 16384MB"));
    }
}
