//! Cancellable polling loop driving collection and rendering.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use tracing::{error, info};

use crate::collector::{MetricsCollector, MetricsRecord};

/// Consumes one record per cycle, read-only. Console rendering and the
/// record log both sit behind this seam.
pub trait RecordSink: Send {
    fn emit(&mut self, record: &MetricsRecord) -> Result<()>;
}

/// Lifecycle of the loop. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

/// Cooperative stop signal shared between the loop thread and its
/// controllers. Raising it wakes a pending interval wait immediately; an
/// in-flight native query is never preempted.
#[derive(Clone, Default)]
pub struct StopHandle {
    inner: Arc<StopInner>,
}

#[derive(Default)]
struct StopInner {
    raised: Mutex<bool>,
    wakeup: Condvar,
}

impl StopHandle {
    pub fn raise(&self) {
        let mut raised = self.inner.raised.lock().unwrap_or_else(|e| e.into_inner());
        *raised = true;
        self.inner.wakeup.notify_all();
    }

    pub fn is_raised(&self) -> bool {
        *self.inner.raised.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Blocks until the signal is raised or `timeout` elapses. Returns true
    /// when the signal was raised. Spurious wakeups re-enter the wait with
    /// the remaining time.
    fn wait_for(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut raised = self.inner.raised.lock().unwrap_or_else(|e| e.into_inner());
        while !*raised {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return false;
            };
            if remaining.is_zero() {
                return false;
            }
            let (guard, _timed_out) = self
                .inner
                .wakeup
                .wait_timeout(raised, remaining)
                .unwrap_or_else(|e| e.into_inner());
            raised = guard;
        }
        true
    }
}

/// Repeatedly collects a record, hands it to every sink, and waits out the
/// configured interval on an interruptible timer.
pub struct MonitorLoop {
    collector: MetricsCollector,
    sinks: Vec<Box<dyn RecordSink>>,
    interval: Duration,
    stop: StopHandle,
    state: LoopState,
}

impl MonitorLoop {
    pub fn new(collector: MetricsCollector, interval: Duration) -> Self {
        Self {
            collector,
            sinks: Vec::new(),
            interval,
            stop: StopHandle::default(),
            state: LoopState::Idle,
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn RecordSink>) {
        self.sinks.push(sink);
    }

    /// Handle for stopping the loop from another thread. An external
    /// interrupt routes through the same path.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Runs the polling loop until the stop signal is raised. Valid only
    /// from `Idle`. A failing sink is logged and the loop proceeds to the
    /// next cycle; one bad sample never ends the process.
    pub fn run(&mut self) -> Result<()> {
        if self.state != LoopState::Idle {
            bail!("monitor loop already started (state: {:?})", self.state);
        }
        self.state = LoopState::Running;
        info!(interval = ?self.interval, "monitor loop started");

        while !self.stop.is_raised() {
            let record = self.collector.collect();
            for sink in &mut self.sinks {
                if let Err(err) = sink.emit(&record) {
                    error!("record sink failed: {err:#}");
                }
            }
            if self.stop.wait_for(self.interval) {
                break;
            }
        }

        self.state = LoopState::Stopping;
        self.collector.close();
        self.state = LoopState::Stopped;
        info!("monitor loop stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use crate::metrics::{
        CpuUsageEstimator, MemoryProbe, MemoryStatusReader, PlaceholderGpu, RawMemoryStatus,
        TimeCounterSample, TimeCounterSource,
    };

    struct QuietCounters;

    impl TimeCounterSource for QuietCounters {
        fn sample(&self) -> Result<TimeCounterSample, ProbeError> {
            Ok(TimeCounterSample::default())
        }
    }

    struct HealthyProbe;

    impl MemoryProbe for HealthyProbe {
        fn query_extended(&self) -> Result<RawMemoryStatus, ProbeError> {
            Ok(RawMemoryStatus {
                load_percent: 25,
                total_bytes: 4 << 30,
                avail_bytes: 3 << 30,
            })
        }

        fn query_legacy(&self) -> Result<RawMemoryStatus, ProbeError> {
            self.query_extended()
        }
    }

    fn test_collector() -> MetricsCollector {
        MetricsCollector::new(
            CpuUsageEstimator::new(Box::new(QuietCounters)),
            MemoryStatusReader::new(Box::new(HealthyProbe)),
            Box::new(PlaceholderGpu),
        )
    }

    #[derive(Clone, Default)]
    struct CollectingSink {
        records: Arc<Mutex<Vec<MetricsRecord>>>,
    }

    impl RecordSink for CollectingSink {
        fn emit(&mut self, record: &MetricsRecord) -> Result<()> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl RecordSink for FailingSink {
        fn emit(&mut self, _record: &MetricsRecord) -> Result<()> {
            bail!("sink rejected the record");
        }
    }

    #[test]
    fn stop_mid_wait_exits_within_bounded_delay() {
        let mut monitor = MonitorLoop::new(test_collector(), Duration::from_secs(5));
        let stop = monitor.stop_handle();

        let worker = std::thread::spawn(move || {
            monitor.run().unwrap();
            monitor
        });

        // Let the loop settle into its interval wait, then cancel mid-wait.
        std::thread::sleep(Duration::from_millis(50));
        let raised_at = Instant::now();
        stop.raise();
        let monitor = worker.join().unwrap();

        assert!(raised_at.elapsed() < Duration::from_secs(1));
        assert_eq!(monitor.state(), LoopState::Stopped);
    }

    #[test]
    fn failing_sink_does_not_end_the_loop() {
        let mut monitor = MonitorLoop::new(test_collector(), Duration::from_millis(5));
        let collecting = CollectingSink::default();
        let records = Arc::clone(&collecting.records);
        monitor.add_sink(Box::new(FailingSink));
        monitor.add_sink(Box::new(collecting));

        let stop = monitor.stop_handle();
        let worker = std::thread::spawn(move || {
            monitor.run().unwrap();
        });
        std::thread::sleep(Duration::from_millis(60));
        stop.raise();
        worker.join().unwrap();

        // Later sinks still ran, and the loop kept cycling past the errors.
        assert!(records.lock().unwrap().len() >= 2);
    }

    #[test]
    fn stop_raised_before_start_skips_all_cycles() {
        let mut monitor = MonitorLoop::new(test_collector(), Duration::from_millis(5));
        let collecting = CollectingSink::default();
        let records = Arc::clone(&collecting.records);
        monitor.add_sink(Box::new(collecting));

        monitor.stop_handle().raise();
        monitor.run().unwrap();

        assert_eq!(monitor.state(), LoopState::Stopped);
        assert!(records.lock().unwrap().is_empty());
    }

    #[test]
    fn restart_after_stop_is_rejected() {
        let mut monitor = MonitorLoop::new(test_collector(), Duration::from_millis(5));
        assert_eq!(monitor.state(), LoopState::Idle);

        monitor.stop_handle().raise();
        monitor.run().unwrap();
        assert_eq!(monitor.state(), LoopState::Stopped);

        assert!(monitor.run().is_err());
    }
}
