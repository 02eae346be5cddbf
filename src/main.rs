use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use timerate::config::{LoggingConfig, TimeRateConfig};
use timerate::{Mode, RateTracker, TimeUnit, TrackerOptions};

/// Register a heartbeat on an interval and report its rate.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// YAML file listing trackers to initialize
    #[arg(long)]
    config: Option<PathBuf>,

    /// Key to beat
    #[arg(long, default_value = "heartbeat")]
    key: String,

    /// Milliseconds between beats
    #[arg(long, default_value_t = 333)]
    interval_ms: u64,

    /// Stop after this many beats
    #[arg(long)]
    beats: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TimeRateConfig::from_file(path)?,
        None => TimeRateConfig::default(),
    };
    init_tracing(&config.logging);

    info!("Starting timerate heartbeat");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let tracker = RateTracker::new();
    config.apply(&tracker)?;
    if !tracker.contains(&args.key) {
        tracker.init(
            TrackerOptions::new(args.key.clone())
                .mode(Mode::Rolling)
                .rate_per(TimeUnit::Minute)
                .window(1.0, TimeUnit::Minute),
        )?;
    }
    info!(trackers = tracker.len(), key = %args.key, "Trackers initialized");

    let mut interval = tokio::time::interval(Duration::from_millis(args.interval_ms.max(1)));
    let mut beats = 0u64;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                tracker.register(&args.key)?;
                beats += 1;

                let rate = tracker.rate(&args.key)?;
                let unit = tracker
                    .config(&args.key)
                    .map(|config| config.rate_per())
                    .unwrap_or(TimeUnit::Minute);
                info!(key = %args.key, beats = beats, "Heart is beating at {:.2} beats per {}", rate, unit);

                if args.beats.is_some_and(|limit| beats >= limit) {
                    break;
                }
            }
            _ = &mut shutdown => break,
        }
    }

    info!(beats = beats, "Timerate heartbeat stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|e| {
            eprintln!("invalid log level {:?}: {}", logging.level, e);
            EnvFilter::new("info")
        });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}
