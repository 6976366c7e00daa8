#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::default_trait_access
    )
)]

//! Stock Watch - Watch-List Polling Engine
//!
//! Maintains a live, periodically refreshed set of instrument quotes keyed
//! by ticker symbol and hands each refresh cycle to a pluggable renderer.
//! Quote retrieval is likewise pluggable: the core only consumes the
//! [`QuoteProviderPort`] fetch contract and never inspects how a provider
//! obtains its data.
//!
//! # Layers (inside -> outside)
//!
//! - **Domain**: Core watch-list types
//!   - `quote`: Symbol and quote value objects, resolution states
//!   - `watchlist`: Thread-safe insertion-ordered registry
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Quote provider and renderer interfaces
//!   - `services`: Watch-list mutation and the polling engine
//!
//! - **Infrastructure**: Adapters and process wiring
//!   - `provider`: Simulated random-walk quote source
//!   - `render`: Console table renderer
//!   - `config`: Environment-variable settings
//!   - `telemetry`: Tracing setup
//!
//! # Data Flow
//!
//! ```text
//!                  tick               fetch (bounded fan-out)
//! PollingEngine ─────────► WatchList ───────► QuoteProviderPort
//!       │                      ▲                     │
//!       │   render(snapshot)   └──── apply_refresh ──┘
//!       ▼
//! RendererPort
//! ```
//!
//! Concurrent `add`/`remove` calls are safe at any time; a mutation that
//! races an in-flight tick is picked up by the next tick.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core watch-list types with no external collaborators.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and process wiring.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::quote::{COMPANY_NOT_AVAILABLE, InvalidSymbol, Quote, Symbol};
pub use domain::watchlist::WatchList;

// Ports
pub use application::ports::{FetchError, QuoteProviderPort, RendererPort};

// Services
pub use application::services::{
    AddManyReport, EngineState, PollingConfig, PollingEngine, PollingError, WatchService,
};

// Infrastructure adapters and config
pub use infrastructure::config::{ConfigError, WatchSettings};
pub use infrastructure::provider::SimulatedProvider;
pub use infrastructure::render::ConsoleRenderer;
pub use infrastructure::telemetry::init as init_telemetry;
