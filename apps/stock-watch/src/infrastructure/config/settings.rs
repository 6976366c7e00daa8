//! Watch Settings
//!
//! Settings for the stock-watch binary, loaded from environment variables.
//! Configuration errors are synchronous and fatal at boot; nothing here is
//! re-read at tick time.

use std::time::Duration;

use thiserror::Error;

use crate::application::services::PollingConfig;

/// Default initial watch list.
const DEFAULT_SYMBOLS: &str = "AAPL,MSFT,GOOG";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Environment variable holds a value that does not parse or is out of
    /// range.
    #[error("invalid value for {variable}: {value:?}")]
    InvalidValue {
        /// Variable name.
        variable: &'static str,
        /// The offending raw value.
        value: String,
    },
}

/// Runtime settings for the watch binary.
#[derive(Debug, Clone)]
pub struct WatchSettings {
    /// Initial symbols to track.
    pub symbols: Vec<String>,
    /// Tick interval.
    pub poll_interval: Duration,
    /// Per-fetch timeout.
    pub fetch_timeout: Duration,
    /// Parallel fetch bound within a tick.
    pub fetch_concurrency: usize,
}

impl Default for WatchSettings {
    fn default() -> Self {
        let polling = PollingConfig::default();
        Self {
            symbols: split_symbols(DEFAULT_SYMBOLS),
            poll_interval: polling.interval,
            fetch_timeout: polling.fetch_timeout,
            fetch_concurrency: polling.fetch_concurrency,
        }
    }
}

impl WatchSettings {
    /// Load settings from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a set variable holds an unparsable or
    /// non-positive value. Unset variables fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same contract as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let symbols = lookup("STOCK_WATCH_SYMBOLS")
            .map_or_else(|| defaults.symbols.clone(), |raw| split_symbols(&raw));

        let poll_interval = Duration::from_secs(parse_positive_u64(
            &lookup,
            "STOCK_WATCH_INTERVAL_SECS",
            defaults.poll_interval.as_secs(),
        )?);

        let fetch_timeout = Duration::from_secs(parse_positive_u64(
            &lookup,
            "STOCK_WATCH_FETCH_TIMEOUT_SECS",
            defaults.fetch_timeout.as_secs(),
        )?);

        let fetch_concurrency = usize::try_from(parse_positive_u64(
            &lookup,
            "STOCK_WATCH_FETCH_CONCURRENCY",
            u64::try_from(defaults.fetch_concurrency).unwrap_or(u64::MAX),
        )?)
        .unwrap_or(usize::MAX);

        Ok(Self {
            symbols,
            poll_interval,
            fetch_timeout,
            fetch_concurrency,
        })
    }

    /// Engine configuration derived from these settings.
    #[must_use]
    pub const fn polling_config(&self) -> PollingConfig {
        PollingConfig {
            interval: self.poll_interval,
            fetch_timeout: self.fetch_timeout,
            fetch_concurrency: self.fetch_concurrency,
        }
    }
}

/// Split a comma-separated symbol list, dropping empty segments.
///
/// Per-symbol validation happens later in `WatchService::add_many`.
fn split_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Parse a positive integer variable, defaulting when unset.
fn parse_positive_u64<F>(lookup: &F, variable: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(variable) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(ConfigError::InvalidValue {
                variable,
                value: raw,
            }),
        },
    }
}

// =============================================================================
// Tests
// =============================================================================
