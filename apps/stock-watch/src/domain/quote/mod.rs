//! Quote and Symbol Value Objects
//!
//! A `Quote` is the immutable-per-refresh record for one tracked instrument.
//! Each refresh produces a *new* `Quote` that replaces the old one atomically
//! in the watch list; quote values never mutate in place.
//!
//! # Resolution states
//!
//! A quote is either **resolved** (the last fetch produced usable data) or
//! **unresolved** (the last fetch failed or returned incomplete data). The
//! unresolved state is marked by the [`COMPANY_NOT_AVAILABLE`] sentinel in
//! the company name. On a failed refresh the numeric fields keep their
//! last-known values rather than being reset, so a transient provider hiccup
//! never wipes a displayed price (see [`Quote::into_unresolved`]).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Company-name sentinel marking a quote whose last fetch failed.
pub const COMPANY_NOT_AVAILABLE: &str = "Not available";

// =============================================================================
// Symbol
// =============================================================================

/// Error returned when a raw ticker string cannot become a [`Symbol`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid symbol: {raw:?}")]
pub struct InvalidSymbol {
    /// The rejected input, as supplied by the caller.
    pub raw: String,
}

/// A normalized ticker symbol (uppercase, trimmed, non-empty).
///
/// `Symbol` is the watch-list key; two raw inputs that differ only in case
/// or surrounding whitespace normalize to the same `Symbol`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a raw ticker string.
    ///
    /// Trims surrounding whitespace and uppercases the remainder.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSymbol`] if the trimmed input is empty or contains
    /// characters outside `A-Z`, `0-9`, `.` and `-`.
    pub fn parse(raw: &str) -> Result<Self, InvalidSymbol> {
        let normalized = raw.trim().to_uppercase();

        if normalized.is_empty()
            || !normalized
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(InvalidSymbol {
                raw: raw.to_string(),
            });
        }

        Ok(Self(normalized))
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Quote
// =============================================================================

/// Market quote for a single tracked instrument.
///
/// Construct with [`Quote::resolved`] after a successful fetch or
/// [`Quote::unresolved`] when no data has ever been retrieved. Prices are
/// non-negative; `0.0` is the default/unknown state, not a traded price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    symbol: Symbol,
    company_name: String,
    price: f64,
    change: f64,
    updated_at: DateTime<Utc>,
}

impl Quote {
    /// Create a resolved quote from a successful fetch.
    ///
    /// Negative or non-finite prices are clamped to `0.0` (the unknown
    /// state); a non-finite change is clamped to `0.0`.
    #[must_use]
    pub fn resolved(
        symbol: Symbol,
        company_name: impl Into<String>,
        price: f64,
        change: f64,
    ) -> Self {
        Self {
            symbol,
            company_name: company_name.into(),
            price: if price.is_finite() { price.max(0.0) } else { 0.0 },
            change: if change.is_finite() { change } else { 0.0 },
            updated_at: Utc::now(),
        }
    }

    /// Create an unresolved quote with default (unknown) numeric fields.
    #[must_use]
    pub fn unresolved(symbol: Symbol) -> Self {
        Self {
            symbol,
            company_name: COMPANY_NOT_AVAILABLE.to_string(),
            price: 0.0,
            change: 0.0,
            updated_at: Utc::now(),
        }
    }

    /// Produce the unresolved successor of this quote.
    ///
    /// Merge policy for failed refreshes: the last-known price and change
    /// are retained and only the company name is replaced by the sentinel,
    /// so the display does not flap between real values and zeros.
    #[must_use]
    pub fn into_unresolved(self) -> Self {
        Self {
            symbol: self.symbol,
            company_name: COMPANY_NOT_AVAILABLE.to_string(),
            price: self.price,
            change: self.change,
            updated_at: Utc::now(),
        }
    }

    /// Rebind this quote to a different (normalized) symbol, keeping all
    /// other fields. Used to key provider results by the watch-list symbol.
    #[must_use]
    pub fn for_symbol(self, symbol: Symbol) -> Self {
        Self { symbol, ..self }
    }

    /// The normalized symbol this quote belongs to.
    #[must_use]
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Display name of the company, or [`COMPANY_NOT_AVAILABLE`].
    #[must_use]
    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    /// Last traded price; `0.0` means unknown.
    #[must_use]
    pub const fn price(&self) -> f64 {
        self.price
    }

    /// Absolute price delta since previous close; `0.0` means unknown.
    #[must_use]
    pub const fn change(&self) -> f64 {
        self.change
    }

    /// When this quote value was produced.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether the latest fetch produced usable company/price data.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.company_name != COMPANY_NOT_AVAILABLE
    }

    /// Percent change since previous close, rounded to 2 decimal places.
    ///
    /// Returns `None` when the price is unknown (`0.0`); the division is
    /// never performed in that case.
    #[must_use]
    pub fn percent_change(&self) -> Option<f64> {
        if self.price == 0.0 {
            return None;
        }
        Some((self.change / self.price * 100.0 * 100.0).round() / 100.0)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("aapl", "AAPL"; "lowercase input")]
    #[test_case("  MSFT  ", "MSFT"; "surrounding whitespace")]
    #[test_case("brk.b", "BRK.B"; "class share dot")]
    #[test_case("bf-b", "BF-B"; "hyphenated")]
    fn symbol_parse_normalizes(raw: &str, expected: &str) {
        let symbol = Symbol::parse(raw).unwrap();
        assert_eq!(symbol.as_str(), expected);
    }

    #[test_case(""; "empty")]
    #[test_case("   "; "whitespace only")]
    #[test_case("AA PL"; "inner whitespace")]
    #[test_case("AAPL!"; "punctuation")]
    fn symbol_parse_rejects(raw: &str) {
        let err = Symbol::parse(raw).unwrap_err();
        assert_eq!(err.raw, raw);
    }

    #[test]
    fn symbol_equality_after_normalization() {
        assert_eq!(Symbol::parse("aapl").unwrap(), Symbol::parse(" AAPL ").unwrap());
    }

    #[test]
    fn resolved_quote_reports_resolved() {
        let quote = Quote::resolved(Symbol::parse("ABT").unwrap(), "Abbott", 45.23, -0.77);
        assert!(quote.is_resolved());
        assert_eq!(quote.company_name(), "Abbott");
        assert_eq!(quote.price(), 45.23);
        assert_eq!(quote.change(), -0.77);
    }

    #[test]
    fn unresolved_quote_defaults_numerics() {
        let quote = Quote::unresolved(Symbol::parse("ABT").unwrap());
        assert!(!quote.is_resolved());
        assert_eq!(quote.price(), 0.0);
        assert_eq!(quote.change(), 0.0);
    }

    #[test]
    fn into_unresolved_preserves_last_known_numerics() {
        let quote = Quote::resolved(Symbol::parse("ABT").unwrap(), "Abbott", 45.23, -0.77);
        let stale = quote.into_unresolved();

        assert!(!stale.is_resolved());
        assert_eq!(stale.company_name(), COMPANY_NOT_AVAILABLE);
        assert_eq!(stale.price(), 45.23);
        assert_eq!(stale.change(), -0.77);
    }

    #[test]
    fn resolved_clamps_negative_price() {
        let quote = Quote::resolved(Symbol::parse("X").unwrap(), "X Corp", -3.0, 0.5);
        assert_eq!(quote.price(), 0.0);
    }

    #[test]
    fn resolved_clamps_non_finite_fields() {
        let quote = Quote::resolved(Symbol::parse("X").unwrap(), "X Corp", f64::NAN, f64::INFINITY);
        assert_eq!(quote.price(), 0.0);
        assert_eq!(quote.change(), 0.0);
    }

    #[test_case(100.0, 5.0, 5.0; "five percent")]
    #[test_case(45.23, -0.77, -1.7; "abbott example")]
    #[test_case(3.0, 1.0, 33.33; "rounds to two places")]
    fn percent_change_rounds_to_two_places(price: f64, change: f64, expected: f64) {
        let quote = Quote::resolved(Symbol::parse("T").unwrap(), "Test", price, change);
        assert_eq!(quote.percent_change(), Some(expected));
    }

    #[test]
    fn percent_change_undefined_at_zero_price() {
        let quote = Quote::unresolved(Symbol::parse("T").unwrap());
        assert_eq!(quote.percent_change(), None);
    }

    #[test]
    fn for_symbol_rebinds_key() {
        let fetched = Quote::resolved(Symbol::parse("abt").unwrap(), "Abbott", 45.23, -0.77);
        let rekeyed = fetched.for_symbol(Symbol::parse("ABT").unwrap());
        assert_eq!(rekeyed.symbol().as_str(), "ABT");
        assert_eq!(rekeyed.price(), 45.23);
    }

    #[test]
    fn symbol_serde_roundtrip() {
        let symbol = Symbol::parse("AAPL").unwrap();
        let json = serde_json::to_string(&symbol).unwrap();
        assert_eq!(json, "\"AAPL\"");

        let parsed: Symbol = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, symbol);
    }
}
