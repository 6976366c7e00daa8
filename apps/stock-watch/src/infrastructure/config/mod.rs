//! Configuration Module
//!
//! Environment-variable configuration for the stock-watch binary.

mod settings;

pub use settings::{ConfigError, WatchSettings};
