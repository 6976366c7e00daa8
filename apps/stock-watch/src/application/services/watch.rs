//! Watch Service
//!
//! Mutation surface of the watch list: `add`, `add_many` and `remove`.
//! Composes the domain registry with the quote provider port so that a
//! newly added symbol gets an initial synchronous fetch, bounded by the
//! configured timeout.
//!
//! The only error that crosses this boundary is [`InvalidSymbol`]; provider
//! failures and timeouts during the initial fetch surface as an unresolved
//! quote, never as an error, so `add` cannot hang or fail on a provider
//! hiccup.

use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::QuoteProviderPort;
use crate::domain::quote::{InvalidSymbol, Quote, Symbol};
use crate::domain::watchlist::WatchList;

/// Default bound on the initial fetch performed inside `add`.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// Batch Result
// =============================================================================

/// Aggregate result of [`WatchService::add_many`].
///
/// Batch processing continues past individual failures; rejected inputs are
/// reported here instead of aborting the rest.
#[derive(Debug, Default)]
pub struct AddManyReport {
    /// Quotes now tracked, in input order (pre-existing entries included).
    pub added: Vec<Quote>,
    /// Inputs rejected as invalid symbols, with the reason.
    pub rejected: Vec<(String, InvalidSymbol)>,
}

impl AddManyReport {
    /// Whether every input was accepted.
    #[must_use]
    pub fn all_added(&self) -> bool {
        self.rejected.is_empty()
    }
}

// =============================================================================
// Watch Service
// =============================================================================

/// Watch-list mutation service with initial-fetch semantics.
pub struct WatchService<P>
where
    P: QuoteProviderPort,
{
    watchlist: Arc<WatchList>,
    provider: Arc<P>,
    fetch_timeout: Duration,
}

impl<P> WatchService<P>
where
    P: QuoteProviderPort,
{
    /// Create a watch service with the default fetch timeout.
    #[must_use]
    pub fn new(watchlist: Arc<WatchList>, provider: Arc<P>) -> Self {
        Self::with_fetch_timeout(watchlist, provider, DEFAULT_FETCH_TIMEOUT)
    }

    /// Create a watch service with an explicit initial-fetch timeout.
    #[must_use]
    pub fn with_fetch_timeout(
        watchlist: Arc<WatchList>,
        provider: Arc<P>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            watchlist,
            provider,
            fetch_timeout,
        }
    }

    /// Start tracking a symbol.
    ///
    /// Normalizes the input (trim, uppercase). Re-adding a tracked symbol
    /// is idempotent: the existing quote is returned without a new fetch
    /// and the entry keeps its position. Otherwise an initial fetch runs
    /// under the configured timeout and the result (resolved or
    /// unresolved) is stored and returned.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSymbol`] for empty or malformed input.
    pub async fn add(&self, raw: &str) -> Result<Quote, InvalidSymbol> {
        let symbol = Symbol::parse(raw)?;

        if let Some(existing) = self.watchlist.get(&symbol) {
            return Ok(existing);
        }

        let quote = self.initial_fetch(symbol.clone()).await;
        if self.watchlist.insert(quote.clone()) {
            tracing::info!(symbol = %symbol, resolved = quote.is_resolved(), "Tracking symbol");
            Ok(quote)
        } else {
            // Lost an insert race with a concurrent add; the winner's entry
            // is authoritative and this fetch result is discarded.
            Ok(self.watchlist.get(&symbol).unwrap_or(quote))
        }
    }

    /// Start tracking a batch of symbols.
    ///
    /// Applies [`add`](Self::add) to each input in order and aggregates the
    /// outcome; an invalid symbol does not abort the remainder.
    pub async fn add_many<I, S>(&self, symbols: I) -> AddManyReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = AddManyReport::default();

        for raw in symbols {
            match self.add(raw.as_ref()).await {
                Ok(quote) => report.added.push(quote),
                Err(error) => report.rejected.push((raw.as_ref().to_string(), error)),
            }
        }

        report
    }

    /// Stop tracking a symbol.
    ///
    /// Returns whether an entry was removed; `false` for a symbol that was
    /// never tracked.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSymbol`] only for empty or malformed input, not for
    /// a missing entry.
    pub fn remove(&self, raw: &str) -> Result<bool, InvalidSymbol> {
        let symbol = Symbol::parse(raw)?;
        let removed = self.watchlist.remove(&symbol);
        if removed {
            tracing::info!(symbol = %symbol, "Stopped tracking symbol");
        }
        Ok(removed)
    }

    /// Take a consistent snapshot of the tracked quotes.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Quote> {
        self.watchlist.snapshot()
    }

    /// Fetch the initial quote for a freshly added symbol.
    ///
    /// Timeouts and provider errors degrade to the unresolved state so the
    /// caller is never blocked past the timeout.
    async fn initial_fetch(&self, symbol: Symbol) -> Quote {
        match tokio::time::timeout(self.fetch_timeout, self.provider.fetch(&symbol)).await {
            Ok(Ok(fetched)) => fetched.for_symbol(symbol),
            Ok(Err(error)) => {
                tracing::warn!(
                    symbol = %symbol,
                    error = %error,
                    "Initial fetch failed, tracking as unresolved"
                );
                Quote::unresolved(symbol)
            }
            Err(_) => {
                tracing::warn!(
                    symbol = %symbol,
                    timeout_secs = self.fetch_timeout.as_secs(),
                    "Initial fetch timed out, tracking as unresolved"
                );
                Quote::unresolved(symbol)
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
