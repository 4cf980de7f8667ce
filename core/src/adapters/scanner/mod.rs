//! Port scanner adapters.
//!
//! Platform-specific implementations of port scanning. Each platform is a
//! [`ScanStrategy`]: one call to invoke the inspection tool, one to turn its
//! text into records. [`PortScanner`] runs a strategy and deduplicates.

mod lsof;
mod netstat;
mod utils;

use std::collections::HashMap;
use std::future::Future;

use tracing::debug;

use crate::domain::PortInfo;
use crate::error::{Error, Result};
use crate::ports::PortScannerPort;

pub use lsof::{parse_lsof_output, LsofStrategy};
pub use netstat::{parse_tasklist_csv, NetstatStrategy, ProcessNameLookup, TasklistLookup};

/// Operating systems that ship an lsof compatible with [`LsofStrategy`].
const LSOF_PLATFORMS: &[&str] = &[
    "macos", "linux", "freebsd", "openbsd", "netbsd", "dragonfly", "solaris", "illumos",
];

/// A platform-specific way of listing endpoints.
pub trait ScanStrategy: Send + Sync {
    /// Name of the external tool, for diagnostics.
    fn tool(&self) -> &'static str;

    /// Run the inspection tool and capture its output.
    fn invoke(&self) -> impl Future<Output = Result<String>> + Send;

    /// Turn tool output into records, skipping lines that don't parse.
    fn parse(&self, raw: &str) -> impl Future<Output = Vec<PortInfo>> + Send;
}

/// The strategy for the host platform.
#[derive(Debug, Clone)]
pub enum PlatformStrategy {
    Lsof(LsofStrategy),
    Netstat(NetstatStrategy),
}

impl PlatformStrategy {
    /// Pick the strategy for the running operating system.
    pub fn detect() -> Result<Self> {
        Self::for_os(std::env::consts::OS)
    }

    /// Pick the strategy for a named operating system.
    pub fn for_os(os: &str) -> Result<Self> {
        if LSOF_PLATFORMS.contains(&os) {
            return Ok(Self::Lsof(LsofStrategy::new()));
        }
        match os {
            "windows" => Ok(Self::Netstat(NetstatStrategy::new())),
            other => Err(Error::UnsupportedPlatform(other.to_string())),
        }
    }
}

impl ScanStrategy for PlatformStrategy {
    fn tool(&self) -> &'static str {
        match self {
            Self::Lsof(s) => s.tool(),
            Self::Netstat(s) => s.tool(),
        }
    }

    async fn invoke(&self) -> Result<String> {
        match self {
            Self::Lsof(s) => s.invoke().await,
            Self::Netstat(s) => s.invoke().await,
        }
    }

    async fn parse(&self, raw: &str) -> Vec<PortInfo> {
        match self {
            Self::Lsof(s) => s.parse(raw).await,
            Self::Netstat(s) => s.parse(raw).await,
        }
    }
}

/// Collapse records sharing a `(protocol, port, pid)` key, last one wins.
pub fn dedup_ports(records: impl IntoIterator<Item = PortInfo>) -> Vec<PortInfo> {
    let mut unique: HashMap<(String, u16, u32), PortInfo> = HashMap::new();
    for record in records {
        unique.insert(record.key(), record);
    }
    unique.into_values().collect()
}

/// The main port scanner that uses platform-specific implementations.
#[derive(Debug, Clone)]
pub struct PortScanner<S: ScanStrategy = PlatformStrategy> {
    strategy: S,
}

impl PortScanner<PlatformStrategy> {
    /// Create a new port scanner for the current platform.
    ///
    /// Fails with [`Error::UnsupportedPlatform`] on hosts without a strategy.
    pub fn new() -> Result<Self> {
        Ok(Self::with_strategy(PlatformStrategy::detect()?))
    }
}

impl<S: ScanStrategy> PortScanner<S> {
    /// Create a scanner around an explicit strategy.
    pub fn with_strategy(strategy: S) -> Self {
        Self { strategy }
    }

    /// Scan all open endpoints.
    ///
    /// The result is unordered; callers sort for presentation.
    pub async fn scan(&self) -> Result<Vec<PortInfo>> {
        self.scan_unique().await
    }

    async fn scan_unique(&self) -> Result<Vec<PortInfo>> {
        let raw = self.strategy.invoke().await?;
        let records = self.strategy.parse(&raw).await;
        let parsed = records.len();
        let ports = dedup_ports(records);
        debug!(
            tool = self.strategy.tool(),
            parsed = parsed,
            unique = ports.len(),
            "Scan finished"
        );
        Ok(ports)
    }
}

impl<S: ScanStrategy> PortScannerPort for PortScanner<S> {
    async fn scan(&self) -> Result<Vec<PortInfo>> {
        self.scan_unique().await
    }
}
