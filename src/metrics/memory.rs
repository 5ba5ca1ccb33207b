//! Physical-memory status with a two-tier native query fallback.

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::ProbeError;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Raw output of one native memory-status query.
#[derive(Debug, Clone, Copy)]
pub struct RawMemoryStatus {
    /// OS-computed physical-memory load, 0-100.
    pub load_percent: u32,
    /// Total physical memory in bytes.
    pub total_bytes: u64,
    /// Available physical memory in bytes.
    pub avail_bytes: u64,
}

/// Native memory-status queries. `query_extended` is the primary size-tagged
/// call; `query_legacy` is the narrower fallback without that requirement.
pub trait MemoryProbe: Send + Sync {
    fn query_extended(&self) -> Result<RawMemoryStatus, ProbeError>;
    fn query_legacy(&self) -> Result<RawMemoryStatus, ProbeError>;
}

/// Physical-memory snapshot for one cycle.
///
/// Always satisfies `total_mb >= used_mb >= 0`, with `used_mb` computed as
/// total minus available from the raw byte counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    /// OS-reported load percentage, taken verbatim; its definition may
    /// differ from a naive used/total ratio.
    pub load_percent: f64,
    pub used_mb: f64,
    pub total_mb: f64,
}

impl From<RawMemoryStatus> for MemorySnapshot {
    fn from(raw: RawMemoryStatus) -> Self {
        let total_mb = raw.total_bytes as f64 / BYTES_PER_MB;
        let avail_mb = raw.avail_bytes as f64 / BYTES_PER_MB;
        Self {
            load_percent: raw.load_percent.min(100) as f64,
            used_mb: (total_mb - avail_mb).max(0.0),
            total_mb,
        }
    }
}

/// Stateless reader over a [`MemoryProbe`]. Every call is independent, safe
/// to issue concurrently, and never fails visibly.
pub struct MemoryStatusReader {
    probe: Box<dyn MemoryProbe>,
}

impl MemoryStatusReader {
    pub fn new(probe: Box<dyn MemoryProbe>) -> Self {
        Self { probe }
    }

    /// Reads the current physical-memory status, falling back to the legacy
    /// query when the extended one fails, and to an all-zero snapshot when
    /// both do.
    pub fn read_memory(&self) -> MemorySnapshot {
        match self.probe.query_extended() {
            Ok(raw) => raw.into(),
            Err(err) => {
                warn!("{err}, falling back to legacy query");
                match self.probe.query_legacy() {
                    Ok(raw) => raw.into(),
                    Err(err) => {
                        warn!("{err}");
                        error!("{}", ProbeError::AllMemoryQueriesFailed);
                        MemorySnapshot::default()
                    }
                }
            }
        }
    }
}
