//! hostprobe entry point: platform gate, startup banner, wiring, and
//! lifecycle control.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hostprobe::collector::MetricsCollector;
use hostprobe::display::{self, ConsoleRenderer};
use hostprobe::logging::MetricsLogger;
use hostprobe::metrics::{CpuUsageEstimator, MemoryStatusReader, PlaceholderGpu};
use hostprobe::monitor::MonitorLoop;
use hostprobe::platform::{self, NativeProviders};

/// Lightweight local hardware-telemetry probe
#[derive(Parser, Debug)]
#[command(name = "hostprobe")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Update interval in seconds
    #[arg(short = 'i', long, default_value = "1.0")]
    interval: f64,

    /// Run for the specified duration (seconds), then stop
    #[arg(short, long)]
    duration: Option<f64>,

    /// Append each cycle's record to a JSON Lines file
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Skip the startup banner
    #[arg(long)]
    no_banner: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("hostprobe=info".parse().unwrap()))
        .init();

    let args = Args::parse();

    if !(args.interval.is_finite() && args.interval > 0.0) {
        error!("interval must be a positive number of seconds");
        return ExitCode::FAILURE;
    }
    if let Some(duration) = args.duration {
        if !(duration.is_finite() && duration >= 0.0) {
            error!("duration must be a non-negative number of seconds");
            return ExitCode::FAILURE;
        }
    }

    // The native APIs are required; checked once, before any sampling.
    let providers = match platform::native_providers() {
        Ok(providers) => providers,
        Err(err) => {
            error!("{err}");
            return ExitCode::from(1);
        }
    };

    if !args.no_banner {
        display::print_banner(
            platform::privilege_level(),
            Duration::from_secs_f64(args.interval),
        );
    }

    match run(args, providers).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args, providers: NativeProviders) -> Result<()> {
    info!("starting hostprobe v{}", env!("CARGO_PKG_VERSION"));

    let collector = MetricsCollector::new(
        CpuUsageEstimator::new(providers.time_counters),
        MemoryStatusReader::new(providers.memory),
        Box::new(PlaceholderGpu),
    );

    let mut monitor = MonitorLoop::new(collector, Duration::from_secs_f64(args.interval));
    monitor.add_sink(Box::new(ConsoleRenderer::new()));
    if let Some(ref path) = args.log {
        monitor.add_sink(Box::new(MetricsLogger::new(path)?));
    }

    let stop = monitor.stop_handle();
    let mut worker = tokio::task::spawn_blocking(move || monitor.run());

    tokio::select! {
        joined = &mut worker => {
            // The loop ended on its own; surface its result.
            return Ok(joined??);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, stopping");
            stop.raise();
        }
        _ = sleep_for(args.duration) => {
            info!("configured duration elapsed, stopping");
            stop.raise();
        }
    }

    worker.await??;

    if let Some(ref path) = args.log {
        info!("records logged to {}", path.display());
    }
    Ok(())
}

/// Pends forever when no duration is configured.
async fn sleep_for(duration: Option<f64>) {
    match duration {
        Some(secs) => tokio::time::sleep(Duration::from_secs_f64(secs)).await,
        None => std::future::pending().await,
    }
}
