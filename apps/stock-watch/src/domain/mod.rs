//! Domain layer - Core watch-list types with no external collaborators.

/// Quote and symbol value objects.
pub mod quote;

/// Thread-safe watch-list registry.
pub mod watchlist;
