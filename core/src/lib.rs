//! Portman Core Library
//!
//! Cross-platform library for finding and terminating the processes that
//! hold network ports. Provides functionality to:
//! - Scan the host for ports and the processes bound to them
//! - Terminate processes gracefully, escalating to a forced kill
//! - Narrow and order scan results for presentation
//! - Manage user configuration (termination timing, refresh rate)
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure business logic and data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: External system implementations
//! - `application`: Use case services
//!
//! # Platform Support
//! - macOS, Linux, BSDs, Solaris: Uses `lsof -i -P -n`
//! - Windows: Uses `netstat -ano` and `tasklist`, `taskkill`

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

// Re-export domain types (primary API)
pub use domain::{filter_ports, normalize_filter, sort_ports, KillOutcome, PortInfo, UNKNOWN_PROCESS};

// Re-export other commonly used types
pub use adapters::{PlatformStrategy, PortScanner, ProcessTerminator, ScanStrategy};
pub use application::PortService;
pub use config::{Config, ConfigStore};
pub use error::{Error, Result};
pub use ports::{PortScannerPort, ProcessKillerPort, SignalError, SignalPort};

#[cfg(any(unix, windows))]
pub use adapters::killer::PlatformSignals;
