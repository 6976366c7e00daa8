//! Port Interfaces
//!
//! Interfaces for the two external collaborators the core consumes,
//! following the Hexagonal Architecture pattern. The core never inspects a
//! provider's internals (URL scheme, document structure) or a renderer's
//! output format; it only consumes these contracts.
//!
//! ## Driven Ports (Outbound)
//!
//! - [`QuoteProviderPort`]: fetch the latest quote for one symbol
//! - [`RendererPort`]: sink for one tick's worth of quotes

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::quote::{Quote, Symbol};

// =============================================================================
// Quote Provider
// =============================================================================

/// Errors a quote provider can report from a fetch.
///
/// All variants are recovered locally by the core: a failed fetch yields an
/// unresolved quote for that symbol and never aborts a tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The remote source could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The source responded but the document could not be interpreted.
    #[error("parse error: {0}")]
    Parse(String),

    /// The source does not know the symbol.
    #[error("symbol not found: {0}")]
    NotFound(Symbol),
}

/// Port for retrieving the latest market data for a symbol.
///
/// Implementations own everything about retrieval (transport, document
/// shape, field extraction). The returned quote should carry the requested
/// symbol; the core re-keys defensively either way.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteProviderPort: Send + Sync {
    /// Fetch the current quote for `symbol`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the quote cannot be retrieved; callers
    /// in the core convert this into the unresolved quote state.
    async fn fetch(&self, symbol: &Symbol) -> Result<Quote, FetchError>;
}

// =============================================================================
// Renderer
// =============================================================================

/// Port for rendering one tick's snapshot of quotes.
///
/// Invoked once per tick with the watch list's entries in insertion order.
/// Rendering is infallible from the core's perspective; any output failure
/// is the renderer's own concern and must not propagate into the polling
/// loop.
pub trait RendererPort: Send + Sync {
    /// Render an insertion-ordered snapshot of quotes.
    fn render(&self, quotes: &[Quote]);
}
