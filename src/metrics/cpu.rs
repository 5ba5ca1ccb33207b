//! CPU load estimation from cumulative OS time counters.

use std::sync::Mutex;

use tracing::warn;

use crate::error::ProbeError;

/// One capture of the cumulative idle/kernel/user time counters, taken
/// together so the three values are mutually consistent.
///
/// Counters are monotonically non-decreasing totals since boot. Kernel time
/// includes idle time under the native call's reporting convention, so
/// `kernel + user` spans the full elapsed window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeCounterSample {
    pub idle: u64,
    pub kernel: u64,
    pub user: u64,
}

/// Source of time-counter samples. Implementations hold no mutable state and
/// may be called from any thread.
pub trait TimeCounterSource: Send + Sync {
    fn sample(&self) -> Result<TimeCounterSample, ProbeError>;
}

/// Converts successive counter samples into an instantaneous load percentage.
///
/// The previous sample is the only mutable state. Its lock is an owned field,
/// not a global, so independent estimators never contend with each other.
pub struct CpuUsageEstimator {
    sampler: Box<dyn TimeCounterSource>,
    prev: Mutex<Option<TimeCounterSample>>,
}

impl CpuUsageEstimator {
    pub fn new(sampler: Box<dyn TimeCounterSource>) -> Self {
        Self {
            sampler,
            prev: Mutex::new(None),
        }
    }

    /// Current CPU load in `[0.0, 100.0]`.
    ///
    /// The first call establishes the baseline and returns 0.0. A failed
    /// counter query degrades to the all-zero sample, which the saturating
    /// delta math reduces to 0.0. The lock is held across the whole
    /// sample-compute-store sequence so concurrent callers cannot interleave.
    pub fn compute_usage(&self) -> f64 {
        let mut prev = self.prev.lock().unwrap_or_else(|e| e.into_inner());

        let current = match self.sampler.sample() {
            Ok(sample) => sample,
            Err(err) => {
                warn!("{err}, degrading to zero sample");
                TimeCounterSample::default()
            }
        };

        // Replace the baseline unconditionally, even when the computation
        // below short-circuits.
        let Some(last) = prev.replace(current) else {
            return 0.0;
        };

        let idle_delta = current.idle.saturating_sub(last.idle);
        let total_delta = current.kernel.saturating_sub(last.kernel)
            + current.user.saturating_sub(last.user);

        // Sampled too close together, or counters stalled.
        if total_delta == 0 {
            return 0.0;
        }

        // Clamp guards counter anomalies (resets, wraparound, clock skew).
        let busy = total_delta as f64 - idle_delta as f64;
        (100.0 * busy / total_delta as f64).clamp(0.0, 100.0)
    }
}
