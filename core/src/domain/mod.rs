//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no I/O dependencies and can be tested in isolation.

mod outcome;
mod port;

// Re-export all domain types
pub use outcome::KillOutcome;
pub use port::{filter_ports, normalize_filter, sort_ports, PortInfo, UNKNOWN_PROCESS};
