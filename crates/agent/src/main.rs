//! `airwatch-agent` -- air-quality telemetry poller.
//!
//! Polls a sensor snapshot endpoint on a fixed cadence, keeps a rolling
//! window of history per metric, classifies each reading and logs the
//! resulting dashboard.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default    | Description                              |
//! |------------------------|----------|------------|------------------------------------------|
//! | `SOURCE_URL`           | yes      | --         | Snapshot endpoint, e.g. `https://host/data` |
//! | `POLL_INTERVAL_MS`     | no       | `30000`    | Milliseconds between polls               |
//! | `RETENTION_HORIZON_MS` | no       | `86400000` | Milliseconds of history kept per metric  |
//! | `THRESHOLDS_PATH`      | no       | --         | JSON file overriding threshold tables    |

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use airwatch_agent::config::AgentConfig;
use airwatch_agent::ingest::Ingestor;
use airwatch_agent::render::LogRenderer;
use airwatch_agent::scheduler::PollScheduler;
use airwatch_agent::source::HttpSource;
use airwatch_core::clock::{Clock, SystemClock};
use airwatch_core::window::WindowStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "airwatch_agent=info,airwatch_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AgentConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    let thresholds = config.load_thresholds().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Threshold tables rejected");
        std::process::exit(1);
    });

    tracing::info!(
        source_url = %config.source_url,
        poll_interval = ?config.poll_interval,
        retention = ?config.retention,
        thresholds = %config
            .thresholds_path
            .as_ref()
            .map_or_else(|| "built-in".to_string(), |p| p.display().to_string()),
        "Starting airwatch-agent",
    );

    let source = HttpSource::new(config.source_url.clone(), config.fetch_timeout())
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to build HTTP client");
            std::process::exit(1);
        });

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = WindowStore::with_all_kinds(config.retention, Arc::clone(&clock));
    let ingestor = Ingestor::new(
        source,
        Arc::new(thresholds),
        clock,
        config.fetch_timeout(),
    );
    let mut scheduler = PollScheduler::new(ingestor, store, LogRenderer, config.poll_interval);

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received");
                shutdown.cancel();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
        }
    });

    scheduler.run(cancel).await;
}
