//! Watch-List Registry
//!
//! Thread-safe, insertion-ordered registry of tracked symbols and their
//! latest [`Quote`]s. All mutation of the shared map goes through this type;
//! no other component touches the entries directly.
//!
//! # Concurrency contract
//!
//! [`insert`](WatchList::insert), [`remove`](WatchList::remove),
//! [`snapshot`](WatchList::snapshot) and
//! [`apply_refresh`](WatchList::apply_refresh) may be called concurrently
//! from independent tasks. Every call observes a state that is some valid
//! serialization of all calls (a single `RwLock` guards the entries). An
//! insert that races with an in-flight refresh cycle is not guaranteed to be
//! included in that cycle, only in the next one.
//!
//! Entries are kept in a `Vec` rather than a map: display order is insertion
//! order by contract, and watch lists are small enough that linear scans are
//! the simpler trade.

use parking_lot::RwLock;

use crate::domain::quote::{Quote, Symbol};

/// Thread-safe registry of tracked symbols and their latest quotes.
///
/// Created once per watch session and shared (via `Arc`) between the watch
/// service and the polling engine. Independent instances never interfere.
#[derive(Debug, Default)]
pub struct WatchList {
    entries: RwLock<Vec<Quote>>,
}

impl WatchList {
    /// Create an empty watch list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `symbol` is currently tracked.
    #[must_use]
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.entries
            .read()
            .iter()
            .any(|quote| quote.symbol() == symbol)
    }

    /// Get a copy of the current quote for `symbol`, if tracked.
    #[must_use]
    pub fn get(&self, symbol: &Symbol) -> Option<Quote> {
        self.entries
            .read()
            .iter()
            .find(|quote| quote.symbol() == symbol)
            .cloned()
    }

    /// Track a new symbol by appending its initial quote.
    ///
    /// Returns `false` (no-op) if the symbol is already tracked; the
    /// existing entry keeps its position and value.
    pub fn insert(&self, quote: Quote) -> bool {
        let mut entries = self.entries.write();
        if entries.iter().any(|q| q.symbol() == quote.symbol()) {
            return false;
        }
        entries.push(quote);
        true
    }

    /// Stop tracking `symbol`.
    ///
    /// Returns whether an entry was removed; `false` for a symbol that was
    /// never tracked is a normal result, not an error.
    pub fn remove(&self, symbol: &Symbol) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|quote| quote.symbol() != symbol);
        entries.len() != before
    }

    /// Atomically replace the stored quote for `symbol`.
    ///
    /// Silently a no-op (returns `false`) if the symbol was removed
    /// concurrently; a refresh result for a de-listed symbol never
    /// resurrects it.
    pub fn apply_refresh(&self, symbol: &Symbol, quote: Quote) -> bool {
        let mut entries = self.entries.write();
        match entries.iter_mut().find(|q| q.symbol() == symbol) {
            Some(entry) => {
                *entry = quote;
                true
            }
            None => false,
        }
    }

    /// Take a consistent, independent copy of all entries in insertion
    /// order. Later mutations of the watch list do not alter the returned
    /// quotes.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Quote> {
        self.entries.read().clone()
    }

    /// Number of tracked symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no symbols are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
