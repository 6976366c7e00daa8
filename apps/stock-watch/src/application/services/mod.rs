//! Application Services
//!
//! - [`watch`]: watch-list mutation with initial synchronous fetch.
//! - [`polling`]: background refresh-and-render loop.

mod polling;
mod watch;

pub use polling::{EngineState, PollingConfig, PollingEngine, PollingError};
pub use watch::{AddManyReport, WatchService};
