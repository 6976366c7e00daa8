//! Stock Watch Binary
//!
//! Starts the watch-list polling engine against the simulated quote
//! provider and renders each tick to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p stock-watch
//! ```
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOCK_WATCH_SYMBOLS`: Initial comma-separated watch list (default: AAPL,MSFT,GOOG)
//! - `STOCK_WATCH_INTERVAL_SECS`: Tick interval in seconds (default: 10)
//! - `STOCK_WATCH_FETCH_TIMEOUT_SECS`: Per-fetch timeout in seconds (default: 5)
//! - `STOCK_WATCH_FETCH_CONCURRENCY`: Parallel fetch bound (default: 8)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use stock_watch::infrastructure::telemetry;
use stock_watch::{
    ConsoleRenderer, PollingEngine, SimulatedProvider, WatchList, WatchService, WatchSettings,
};
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a .env if one exists; the process environment wins.
    dotenvy::dotenv().ok();

    telemetry::init();

    let settings = WatchSettings::from_env()?;
    log_settings(&settings);

    let watchlist = Arc::new(WatchList::new());
    let provider = Arc::new(SimulatedProvider::new());
    let renderer = Arc::new(ConsoleRenderer::new());

    let watch = WatchService::with_fetch_timeout(
        Arc::clone(&watchlist),
        Arc::clone(&provider),
        settings.fetch_timeout,
    );

    let report = watch.add_many(&settings.symbols).await;
    for (raw, error) in &report.rejected {
        tracing::warn!(symbol = %raw, error = %error, "Skipping invalid symbol");
    }
    if watchlist.is_empty() {
        tracing::warn!("Watch list is empty; the engine will render nothing until symbols are added");
    }

    let engine = PollingEngine::with_config(
        settings.polling_config(),
        watchlist,
        provider,
        renderer,
    );
    engine.start();

    await_shutdown().await;

    engine.stop().await;
    tracing::info!("Stock watch stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_settings(settings: &WatchSettings) {
    tracing::info!(
        symbols = settings.symbols.join(",").as_str(),
        interval_secs = settings.poll_interval.as_secs(),
        fetch_timeout_secs = settings.fetch_timeout.as_secs(),
        fetch_concurrency = settings.fetch_concurrency,
        "Configuration loaded"
    );
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
