//! Port scanner port (interface).

use crate::domain::PortInfo;
use crate::error::Result;

/// Port for scanning network endpoints.
///
/// This trait defines the interface for port scanning functionality.
/// Implementations handle platform-specific details (lsof, netstat, etc.)
pub trait PortScannerPort: Send + Sync {
    /// Scan for all open endpoints.
    ///
    /// The result has set semantics: no two records share a
    /// `(protocol, port, pid)` key and the order carries no meaning.
    fn scan(&self) -> impl std::future::Future<Output = Result<Vec<PortInfo>>> + Send;
}
