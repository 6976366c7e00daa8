//! Polling Engine Integration Tests
//!
//! Drives the engine through the public API with scripted and gated
//! provider doubles: merge policy on fetch failure, concurrent removal
//! during a tick, interval spacing, and graceful drain on stop.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use stock_watch::{
    FetchError, PollingConfig, PollingEngine, Quote, QuoteProviderPort, RendererPort, Symbol,
    WatchList, WatchService,
};
use tokio::sync::{Semaphore, mpsc, oneshot};
use tokio::time::Instant;

// =============================================================================
// Test Doubles
// =============================================================================

/// Renderer that records every snapshot and signals the test task.
struct ChannelRenderer {
    renders: Mutex<Vec<(Instant, Vec<Quote>)>>,
    tx: mpsc::UnboundedSender<()>,
}

impl ChannelRenderer {
    fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                renders: Mutex::new(Vec::new()),
                tx,
            }),
            rx,
        )
    }

    fn render_count(&self) -> usize {
        self.renders.lock().len()
    }

    fn render_at(&self, index: usize) -> (Instant, Vec<Quote>) {
        self.renders.lock()[index].clone()
    }
}

impl RendererPort for ChannelRenderer {
    fn render(&self, quotes: &[Quote]) {
        self.renders.lock().push((Instant::now(), quotes.to_vec()));
        let _ = self.tx.send(());
    }
}

/// Provider with per-symbol scripted quotes and a switchable failure set.
#[derive(Default)]
struct ScriptedProvider {
    quotes: Mutex<HashMap<String, (String, f64, f64)>>,
    failing: Mutex<HashSet<String>>,
}

impl ScriptedProvider {
    fn set_quote(&self, symbol: &str, company: &str, price: f64, change: f64) {
        self.quotes
            .lock()
            .insert(symbol.to_string(), (company.to_string(), price, change));
    }

    fn fail_symbol(&self, symbol: &str) {
        self.failing.lock().insert(symbol.to_string());
    }
}

#[async_trait]
impl QuoteProviderPort for ScriptedProvider {
    async fn fetch(&self, symbol: &Symbol) -> Result<Quote, FetchError> {
        if self.failing.lock().contains(symbol.as_str()) {
            return Err(FetchError::Network("connection reset".to_string()));
        }

        let scripted = self.quotes.lock().get(symbol.as_str()).cloned();
        scripted.map_or_else(
            || Err(FetchError::NotFound(symbol.clone())),
            |(company, price, change)| Ok(Quote::resolved(symbol.clone(), company, price, change)),
        )
    }
}

/// Provider whose fetches block on a semaphore once armed.
struct GatedProvider {
    armed: AtomicBool,
    started_tx: Mutex<Option<oneshot::Sender<()>>>,
    gate: Semaphore,
}

impl GatedProvider {
    fn new(started_tx: oneshot::Sender<()>) -> Self {
        Self {
            armed: AtomicBool::new(false),
            started_tx: Mutex::new(Some(started_tx)),
            gate: Semaphore::new(0),
        }
    }

    fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    fn release(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl QuoteProviderPort for GatedProvider {
    async fn fetch(&self, symbol: &Symbol) -> Result<Quote, FetchError> {
        if self.armed.load(Ordering::SeqCst) {
            if let Some(tx) = self.started_tx.lock().take() {
                let _ = tx.send(());
            }
            if let Ok(permit) = self.gate.acquire().await {
                permit.forget();
            }
        }

        Ok(Quote::resolved(symbol.clone(), "Gated Co.", 50.0, 1.0))
    }
}

fn config(interval_secs: u64) -> PollingConfig {
    PollingConfig {
        interval: Duration::from_secs(interval_secs),
        fetch_timeout: Duration::from_secs(5),
        fetch_concurrency: 4,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn end_to_end_quote_reaches_renderer() {
    let provider = Arc::new(ScriptedProvider::default());
    provider.set_quote("ABT", "Abbott", 45.23, -0.77);

    let watchlist = Arc::new(WatchList::new());
    let service = WatchService::new(Arc::clone(&watchlist), Arc::clone(&provider));
    service.add("ABT").await.unwrap();

    let (renderer, mut rx) = ChannelRenderer::new();
    let engine = PollingEngine::with_config(
        config(3600),
        watchlist,
        provider,
        Arc::clone(&renderer),
    );
    engine.start();

    rx.recv().await.unwrap();
    engine.stop().await;

    let (_, quotes) = renderer.render_at(0);
    assert_eq!(quotes.len(), 1);
    let quote = &quotes[0];
    assert_eq!(quote.symbol().as_str(), "ABT");
    assert_eq!(quote.company_name(), "Abbott");
    assert_eq!(quote.price(), 45.23);
    assert_eq!(quote.change(), -0.77);
    assert_eq!(quote.percent_change(), Some(-1.70));
}

#[tokio::test]
async fn fetch_failure_preserves_last_known_numbers() {
    let provider = Arc::new(ScriptedProvider::default());
    provider.set_quote("X", "X Corp", 20.0, 0.4);
    provider.set_quote("Y", "Y Corp", 30.0, 0.6);

    let watchlist = Arc::new(WatchList::new());
    let service = WatchService::new(Arc::clone(&watchlist), Arc::clone(&provider));
    service.add_many(["X", "Y"]).await;

    // X starts failing; Y moves to a new price.
    provider.fail_symbol("X");
    provider.set_quote("Y", "Y Corp", 31.0, 1.6);

    let (renderer, mut rx) = ChannelRenderer::new();
    let engine = PollingEngine::with_config(
        config(3600),
        Arc::clone(&watchlist),
        provider,
        renderer,
    );
    engine.start();

    rx.recv().await.unwrap();
    engine.stop().await;

    let snapshot = watchlist.snapshot();
    assert_eq!(snapshot.len(), 2);

    let x = &snapshot[0];
    assert_eq!(x.symbol().as_str(), "X");
    assert!(!x.is_resolved());
    assert_eq!(x.price(), 20.0);
    assert_eq!(x.change(), 0.4);

    let y = &snapshot[1];
    assert!(y.is_resolved());
    assert_eq!(y.price(), 31.0);
}

#[tokio::test]
async fn remove_during_tick_discards_the_refresh() {
    let (started_tx, started_rx) = oneshot::channel();
    let provider = Arc::new(GatedProvider::new(started_tx));

    let watchlist = Arc::new(WatchList::new());
    let service = WatchService::new(Arc::clone(&watchlist), Arc::clone(&provider));
    service.add("X").await.unwrap();

    provider.arm();

    let (renderer, mut rx) = ChannelRenderer::new();
    let engine = PollingEngine::with_config(
        config(3600),
        Arc::clone(&watchlist),
        Arc::clone(&provider),
        Arc::clone(&renderer),
    );
    engine.start();

    // The tick is now mid-fetch for X; de-list it, then let the fetch finish.
    started_rx.await.unwrap();
    assert!(service.remove("X").unwrap());
    provider.release();

    rx.recv().await.unwrap();
    engine.stop().await;

    assert!(watchlist.is_empty());
    let (_, quotes) = renderer.render_at(0);
    assert!(quotes.is_empty());
}

#[tokio::test(start_paused = true)]
async fn renders_are_separated_by_the_interval() {
    let provider = Arc::new(ScriptedProvider::default());
    provider.set_quote("AAPL", "Apple Inc.", 190.0, 1.0);

    let watchlist = Arc::new(WatchList::new());
    let service = WatchService::new(Arc::clone(&watchlist), Arc::clone(&provider));
    service.add("AAPL").await.unwrap();

    let (renderer, mut rx) = ChannelRenderer::new();
    let engine = PollingEngine::with_config(
        config(10),
        watchlist,
        provider,
        Arc::clone(&renderer),
    );
    engine.start();

    rx.recv().await.unwrap();
    rx.recv().await.unwrap();
    engine.stop().await;

    let (first, _) = renderer.render_at(0);
    let (second, _) = renderer.render_at(1);
    assert!(second.duration_since(first) >= Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn interval_change_applies_to_the_next_cycle() {
    let provider = Arc::new(ScriptedProvider::default());
    provider.set_quote("AAPL", "Apple Inc.", 190.0, 1.0);

    let watchlist = Arc::new(WatchList::new());
    let service = WatchService::new(Arc::clone(&watchlist), Arc::clone(&provider));
    service.add("AAPL").await.unwrap();

    let (renderer, mut rx) = ChannelRenderer::new();
    let engine = PollingEngine::with_config(
        config(10),
        watchlist,
        provider,
        Arc::clone(&renderer),
    );
    engine.start();

    rx.recv().await.unwrap();
    engine.set_interval(100).unwrap();
    rx.recv().await.unwrap();
    rx.recv().await.unwrap();
    engine.stop().await;

    // The cycle already scheduled keeps the old interval; the one after
    // picks up the new value.
    let (second, _) = renderer.render_at(1);
    let (third, _) = renderer.render_at(2);
    assert!(third.duration_since(second) >= Duration::from_secs(100));
}

#[tokio::test(start_paused = true)]
async fn symbol_added_mid_run_joins_the_next_tick() {
    let provider = Arc::new(ScriptedProvider::default());
    provider.set_quote("AAPL", "Apple Inc.", 190.0, 1.0);
    provider.set_quote("MSFT", "Microsoft", 410.0, 2.0);

    let watchlist = Arc::new(WatchList::new());
    let service = WatchService::new(Arc::clone(&watchlist), Arc::clone(&provider));
    service.add("AAPL").await.unwrap();

    let (renderer, mut rx) = ChannelRenderer::new();
    let engine = PollingEngine::with_config(
        config(10),
        watchlist,
        Arc::clone(&provider),
        Arc::clone(&renderer),
    );
    engine.start();

    rx.recv().await.unwrap();
    service.add("MSFT").await.unwrap();
    rx.recv().await.unwrap();
    engine.stop().await;

    let (_, first) = renderer.render_at(0);
    let symbols: Vec<_> = first.iter().map(|q| q.symbol().as_str().to_string()).collect();
    assert_eq!(symbols, ["AAPL"]);

    let (_, second) = renderer.render_at(1);
    let symbols: Vec<_> = second.iter().map(|q| q.symbol().as_str().to_string()).collect();
    assert_eq!(symbols, ["AAPL", "MSFT"]);
}

#[tokio::test]
async fn stop_drains_the_inflight_tick() {
    let (started_tx, started_rx) = oneshot::channel();
    let provider = Arc::new(GatedProvider::new(started_tx));

    let watchlist = Arc::new(WatchList::new());
    let service = WatchService::new(Arc::clone(&watchlist), Arc::clone(&provider));
    service.add("X").await.unwrap();

    provider.arm();

    let (renderer, _rx) = ChannelRenderer::new();
    let engine = Arc::new(PollingEngine::with_config(
        config(3600),
        Arc::clone(&watchlist),
        Arc::clone(&provider),
        Arc::clone(&renderer),
    ));
    engine.start();

    started_rx.await.unwrap();

    let stopping = Arc::clone(&engine);
    let mut stop_task = tokio::spawn(async move { stopping.stop().await });

    // stop() must not return while the tick's fetch is still outstanding.
    let still_running =
        tokio::time::timeout(Duration::from_millis(50), &mut stop_task).await;
    assert!(still_running.is_err());
    assert_eq!(renderer.render_count(), 0);

    provider.release();
    stop_task.await.unwrap();

    // The drained tick completed: its refresh was applied and rendered
    // before stop() returned, and nothing runs afterwards.
    assert_eq!(renderer.render_count(), 1);
    let refreshed = watchlist.snapshot();
    assert_eq!(refreshed[0].price(), 50.0);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(renderer.render_count(), 1);
}
