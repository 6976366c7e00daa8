//! Infrastructure layer - Adapters and process-level wiring.

/// Environment-variable configuration.
pub mod config;

/// Simulated quote provider adapter.
pub mod provider;

/// Console renderer adapter.
pub mod render;

/// Tracing subscriber setup.
pub mod telemetry;
