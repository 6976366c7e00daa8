//! Simulated Quote Provider
//!
//! In-process [`QuoteProviderPort`] adapter over a fixed listing universe.
//! Prices follow a small random walk around the last served value so the
//! demo binary shows movement without touching a network; the reported
//! change is measured against the listing's previous close.
//!
//! Symbols outside the universe fail with [`FetchError::NotFound`], which
//! exercises the core's unresolved-quote path end to end.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;

use crate::application::ports::{FetchError, QuoteProviderPort};
use crate::domain::quote::{Quote, Symbol};

/// Maximum per-fetch price movement, as a fraction of the last price.
const MAX_STEP: f64 = 0.01;

/// A listed instrument known to the simulated exchange.
#[derive(Debug, Clone, Copy)]
struct Listing {
    company: &'static str,
    previous_close: f64,
}

/// Built-in listing universe.
const LISTINGS: &[(&str, Listing)] = &[
    ("AAPL", Listing { company: "Apple Inc.", previous_close: 190.40 }),
    ("MSFT", Listing { company: "Microsoft Corporation", previous_close: 410.10 }),
    ("GOOG", Listing { company: "Alphabet Inc.", previous_close: 172.60 }),
    ("AMZN", Listing { company: "Amazon.com, Inc.", previous_close: 185.30 }),
    ("TSLA", Listing { company: "Tesla, Inc.", previous_close: 248.90 }),
    ("NVDA", Listing { company: "NVIDIA Corporation", previous_close: 131.20 }),
    ("ABT", Listing { company: "Abbott Laboratories", previous_close: 45.23 }),
];

/// Random-walk quote source over the built-in listings.
pub struct SimulatedProvider {
    listings: HashMap<&'static str, Listing>,
    last_prices: Mutex<HashMap<Symbol, f64>>,
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedProvider {
    /// Create a provider over the built-in listing universe.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listings: LISTINGS.iter().copied().collect(),
            last_prices: Mutex::new(HashMap::new()),
        }
    }

    /// Advance the walk for `symbol` and return the new price.
    fn next_price(&self, symbol: &Symbol, listing: Listing) -> f64 {
        let mut last_prices = self.last_prices.lock();
        let current = last_prices
            .get(symbol)
            .copied()
            .unwrap_or(listing.previous_close);

        let step: f64 = rand::rng().random_range(-MAX_STEP..MAX_STEP);
        let next = (current * (1.0 + step)).max(0.01);

        last_prices.insert(symbol.clone(), next);
        next
    }
}

#[async_trait]
impl QuoteProviderPort for SimulatedProvider {
    async fn fetch(&self, symbol: &Symbol) -> Result<Quote, FetchError> {
        let listing = self
            .listings
            .get(symbol.as_str())
            .copied()
            .ok_or_else(|| FetchError::NotFound(symbol.clone()))?;

        let price = self.next_price(symbol, listing);
        let change = price - listing.previous_close;

        Ok(Quote::resolved(
            symbol.clone(),
            listing.company,
            price,
            change,
        ))
    }
}

// =============================================================================
// Tests
// =============================================================================
