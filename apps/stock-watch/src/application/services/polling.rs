//! Polling Engine
//!
//! Drives the periodic refresh of the watch list and the per-tick handoff
//! to the renderer.
//!
//! # Tick algorithm
//!
//! 1. Take a snapshot of the watch list.
//! 2. Fetch every snapshotted symbol through the provider port, fanning out
//!    with bounded parallelism and a per-fetch timeout. Failures degrade to
//!    the unresolved quote state (last-known numerics retained) and never
//!    abort the tick.
//! 3. Apply each result back into the watch list; results for symbols that
//!    were removed mid-tick are discarded by the registry.
//! 4. Render a fresh snapshot.
//! 5. Sleep for the remainder of the interval. An overrunning tick rolls
//!    straight into the next one; ticks never overlap and missed boundaries
//!    are not made up.
//!
//! # Lifecycle
//!
//! `Idle -> Running -> Stopped`. [`start`](PollingEngine::start) is
//! idempotent while running; [`stop`](PollingEngine::stop) cancels the loop
//! and awaits the in-flight tick (graceful drain), so no refresh or render
//! is observable after it returns. Interval changes take effect between
//! ticks, never mid-tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::StreamExt;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{QuoteProviderPort, RendererPort};
use crate::domain::quote::Quote;
use crate::domain::watchlist::WatchList;

// =============================================================================
// Configuration
// =============================================================================

/// Tuning knobs for a polling engine.
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Time between tick starts. Must be at least one second.
    pub interval: Duration,
    /// Per-fetch timeout within a tick and for initial fetches.
    pub fetch_timeout: Duration,
    /// Upper bound on concurrent fetches within one tick.
    pub fetch_concurrency: usize,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            fetch_timeout: Duration::from_secs(5),
            fetch_concurrency: 8,
        }
    }
}

/// Polling engine caller errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PollingError {
    /// The requested interval was zero.
    #[error("poll interval must be a positive number of seconds")]
    InvalidInterval,
}

/// Observable lifecycle state of a [`PollingEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Created but never started.
    Idle,
    /// Background loop is ticking.
    Running,
    /// Stopped; the engine cannot be restarted.
    Stopped,
}

/// Runtime slot guarded by the engine's mutex.
enum Runtime {
    Idle,
    Running {
        cancel: CancellationToken,
        handle: JoinHandle<()>,
    },
    Stopped,
}

// =============================================================================
// Polling Engine
// =============================================================================

/// Background refresh-and-render loop over a shared [`WatchList`].
///
/// Multiple engines over independent watch lists do not interfere; the
/// engine owns no global state.
pub struct PollingEngine<P, R>
where
    P: QuoteProviderPort,
    R: RendererPort,
{
    watchlist: Arc<WatchList>,
    provider: Arc<P>,
    renderer: Arc<R>,
    interval_secs: Arc<AtomicU64>,
    fetch_timeout: Duration,
    fetch_concurrency: usize,
    runtime: Mutex<Runtime>,
}

impl<P, R> PollingEngine<P, R>
where
    P: QuoteProviderPort + 'static,
    R: RendererPort + 'static,
{
    /// Create an engine with the default configuration.
    #[must_use]
    pub fn new(watchlist: Arc<WatchList>, provider: Arc<P>, renderer: Arc<R>) -> Self {
        Self::with_config(PollingConfig::default(), watchlist, provider, renderer)
    }

    /// Create an engine with an explicit configuration.
    ///
    /// A zero interval is raised to one second; the concurrency bound is
    /// raised to one.
    #[must_use]
    pub fn with_config(
        config: PollingConfig,
        watchlist: Arc<WatchList>,
        provider: Arc<P>,
        renderer: Arc<R>,
    ) -> Self {
        Self {
            watchlist,
            provider,
            renderer,
            interval_secs: Arc::new(AtomicU64::new(config.interval.as_secs().max(1))),
            fetch_timeout: config.fetch_timeout,
            fetch_concurrency: config.fetch_concurrency.max(1),
            runtime: Mutex::new(Runtime::Idle),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        match &*self.runtime.lock() {
            Runtime::Idle => EngineState::Idle,
            Runtime::Running { .. } => EngineState::Running,
            Runtime::Stopped => EngineState::Stopped,
        }
    }

    /// Set the poll interval in whole seconds.
    ///
    /// Takes effect at the next scheduling decision; a tick in progress is
    /// unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`PollingError::InvalidInterval`] for a zero interval.
    pub fn set_interval(&self, secs: u64) -> Result<(), PollingError> {
        if secs == 0 {
            return Err(PollingError::InvalidInterval);
        }
        self.interval_secs.store(secs, Ordering::Relaxed);
        Ok(())
    }

    /// Current poll interval in whole seconds.
    #[must_use]
    pub fn interval_secs(&self) -> u64 {
        self.interval_secs.load(Ordering::Relaxed)
    }

    /// Start the background loop.
    ///
    /// Idempotent while running; a no-op after [`stop`](Self::stop).
    pub fn start(&self) {
        let mut runtime = self.runtime.lock();
        match &*runtime {
            Runtime::Running { .. } => {
                tracing::debug!("Polling engine already running");
                return;
            }
            Runtime::Stopped => {
                tracing::warn!("Polling engine is stopped and cannot be restarted");
                return;
            }
            Runtime::Idle => {}
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_loop(
            Arc::clone(&self.watchlist),
            Arc::clone(&self.provider),
            Arc::clone(&self.renderer),
            Arc::clone(&self.interval_secs),
            self.fetch_timeout,
            self.fetch_concurrency,
            cancel.clone(),
        ));
        *runtime = Runtime::Running { cancel, handle };

        tracing::info!(
            interval_secs = self.interval_secs.load(Ordering::Relaxed),
            fetch_concurrency = self.fetch_concurrency,
            "Polling engine started"
        );
    }

    /// Stop the background loop and drain the in-flight tick.
    ///
    /// Returns only after the loop task has finished, which may take up to
    /// one tick (bounded by the fetch timeout). After this returns, no
    /// `apply_refresh` or `render` call from this engine can occur.
    pub async fn stop(&self) {
        let previous = {
            let mut runtime = self.runtime.lock();
            std::mem::replace(&mut *runtime, Runtime::Stopped)
        };

        if let Runtime::Running { cancel, handle } = previous {
            cancel.cancel();
            if let Err(error) = handle.await {
                tracing::error!(error = %error, "Polling loop task failed");
            }
            tracing::info!("Polling engine stopped");
        }
    }
}

// =============================================================================
// Tick Loop
// =============================================================================

/// Body of the spawned polling loop.
async fn run_loop<P, R>(
    watchlist: Arc<WatchList>,
    provider: Arc<P>,
    renderer: Arc<R>,
    interval_secs: Arc<AtomicU64>,
    fetch_timeout: Duration,
    fetch_concurrency: usize,
    cancel: CancellationToken,
) where
    P: QuoteProviderPort + 'static,
    R: RendererPort + 'static,
{
    loop {
        let tick_started = Instant::now();
        run_tick(
            &watchlist,
            &provider,
            &renderer,
            fetch_timeout,
            fetch_concurrency,
        )
        .await;

        // Interval changes are picked up here, between ticks. An
        // overrunning tick rolls straight into the next one.
        let interval = Duration::from_secs(interval_secs.load(Ordering::Relaxed));
        let wait = interval.saturating_sub(tick_started.elapsed());

        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(wait) => {}
        }
    }

    tracing::debug!("Polling loop exited");
}

/// One full refresh-and-render cycle.
async fn run_tick<P, R>(
    watchlist: &Arc<WatchList>,
    provider: &Arc<P>,
    renderer: &Arc<R>,
    fetch_timeout: Duration,
    fetch_concurrency: usize,
) where
    P: QuoteProviderPort + 'static,
    R: RendererPort,
{
    let snapshot = watchlist.snapshot();
    let tracked = snapshot.len();

    let refreshed: Vec<Quote> = futures::stream::iter(snapshot)
        .map(|previous| {
            let provider = Arc::clone(provider);
            async move { refresh_quote(provider.as_ref(), previous, fetch_timeout).await }
        })
        .buffer_unordered(fetch_concurrency)
        .collect()
        .await;

    let mut applied = 0_usize;
    for quote in refreshed {
        let symbol = quote.symbol().clone();
        if watchlist.apply_refresh(&symbol, quote) {
            applied += 1;
        }
    }

    tracing::debug!(tracked, applied, "Tick refreshed watch list");

    // Render from a fresh snapshot so insertion order is preserved even
    // though fetches complete in arbitrary order.
    renderer.render(&watchlist.snapshot());
}

/// Refresh one quote, degrading failures to the unresolved state.
async fn refresh_quote<P>(provider: &P, previous: Quote, fetch_timeout: Duration) -> Quote
where
    P: QuoteProviderPort,
{
    let symbol = previous.symbol().clone();

    match tokio::time::timeout(fetch_timeout, provider.fetch(&symbol)).await {
        Ok(Ok(fetched)) => fetched.for_symbol(symbol),
        Ok(Err(error)) => {
            tracing::warn!(
                symbol = %symbol,
                error = %error,
                "Fetch failed, keeping last known values"
            );
            previous.into_unresolved()
        }
        Err(_) => {
            tracing::warn!(
                symbol = %symbol,
                timeout_secs = fetch_timeout.as_secs(),
                "Fetch timed out, keeping last known values"
            );
            previous.into_unresolved()
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
