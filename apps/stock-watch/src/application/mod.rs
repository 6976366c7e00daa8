//! Application layer - Use cases and port definitions.

/// Port interfaces for external collaborators.
pub mod ports;

/// Watch-list and polling services.
pub mod services;
