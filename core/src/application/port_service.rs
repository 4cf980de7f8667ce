//! Port scanning application service.

use crate::domain::{sort_ports, PortInfo};
use crate::error::Result;
use crate::ports::PortScannerPort;

/// Application service for port scanning operations.
///
/// Wraps a `PortScannerPort` with presentation ordering and lookups,
/// allowing different scanner implementations to be injected.
pub struct PortService<S: PortScannerPort> {
    scanner: S,
}

impl<S: PortScannerPort> PortService<S> {
    /// Create a new port service with the given scanner.
    pub fn new(scanner: S) -> Self {
        Self { scanner }
    }

    /// Scan and return records sorted by port, pid and protocol.
    pub async fn scan(&self) -> Result<Vec<PortInfo>> {
        let mut ports = self.scanner.scan().await?;
        sort_ports(&mut ports);
        Ok(ports)
    }

    /// Find every record bound to `port`, across protocols and processes.
    pub async fn find_all_by_port(&self, port: u16) -> Result<Vec<PortInfo>> {
        let mut ports = self.scan().await?;
        ports.retain(|p| p.port == port);
        Ok(ports)
    }
}
