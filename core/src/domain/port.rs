//! Endpoint records and filtering.

use serde::{Deserialize, Serialize};

/// Process name used when the owning process cannot be identified.
pub const UNKNOWN_PROCESS: &str = "unknown";

// ============================================================================
// PortInfo
// ============================================================================

/// A process bound to a network port over one protocol.
///
/// Records are produced by the scanner and never edited afterwards; every
/// scan replaces the whole set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortInfo {
    /// The port number (e.g., 3000, 8080).
    pub port: u16,
    /// Process ID of the process using this port.
    pub pid: u32,
    /// Short name of the process using this port.
    #[serde(rename = "process")]
    pub process_name: String,
    /// Full command line, or the process name when unavailable.
    pub command: String,
    /// Lowercase protocol tag as reported by the inspection tool.
    pub protocol: String,
}

impl PortInfo {
    /// Create a record from scan results.
    ///
    /// The protocol is lowercased and an empty command falls back to the
    /// process name.
    pub fn new(
        port: u16,
        pid: u32,
        process_name: impl Into<String>,
        command: impl Into<String>,
        protocol: impl AsRef<str>,
    ) -> Self {
        let process_name = process_name.into();
        let command = command.into();
        let command = if command.is_empty() {
            process_name.clone()
        } else {
            command
        };

        Self {
            port,
            pid,
            process_name,
            command,
            protocol: protocol.as_ref().to_lowercase(),
        }
    }

    /// Identity of a record within one scan.
    pub fn key(&self) -> (String, u16, u32) {
        (self.protocol.clone(), self.port, self.pid)
    }

    /// Check if this record matches an already-normalized filter.
    ///
    /// Matches on substring containment in the process name, command or
    /// protocol. Use [`normalize_filter`] to prepare raw input.
    pub fn matches_filter(&self, filter: &str) -> bool {
        if filter.is_empty() {
            return true;
        }
        self.process_name.to_lowercase().contains(filter)
            || self.command.to_lowercase().contains(filter)
            || self.protocol.to_lowercase().contains(filter)
    }
}

impl std::fmt::Display for PortInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} (PID: {}, Process: {})",
            self.protocol, self.port, self.pid, self.process_name
        )
    }
}

// ============================================================================
// Filtering
// ============================================================================

/// Lowercase and trim raw filter input.
pub fn normalize_filter(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Apply a filter to a list of ports.
///
/// An empty (or whitespace-only) filter returns every record unchanged.
pub fn filter_ports(ports: &[PortInfo], text: &str) -> Vec<PortInfo> {
    let filter = normalize_filter(text);
    ports
        .iter()
        .filter(|p| p.matches_filter(&filter))
        .cloned()
        .collect()
}

/// Presentation order: port, then pid, then protocol.
pub fn sort_ports(ports: &mut [PortInfo]) {
    ports.sort_by(|a, b| {
        a.port
            .cmp(&b.port)
            .then(a.pid.cmp(&b.pid))
            .then_with(|| a.protocol.cmp(&b.protocol))
    });
}

// ============================================================================
// Tests
// ============================================================================
