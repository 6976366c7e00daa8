//! Tracing Setup
//!
//! Initializes the global `tracing` subscriber for the binary.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter (default: info)

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber.
///
/// Safe to call more than once; subsequent calls are no-ops (the first
/// subscriber wins), which keeps test processes happy.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
