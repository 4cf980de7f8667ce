//! Windows scanner implementation using netstat and tasklist.

use std::collections::HashMap;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, trace};

use crate::domain::{PortInfo, UNKNOWN_PROCESS};
use crate::error::Result;

use super::utils::Utils;
use super::ScanStrategy;

/// Lines of preamble netstat prints before the first row.
const HEADER_LINES: usize = 4;

/// TCP rows carry a state column, UDP rows do not.
const MIN_FIELDS: usize = 4;

/// Resolves a pid to a process name.
pub trait ProcessNameLookup: Send + Sync {
    fn lookup(&self, pid: u32) -> impl std::future::Future<Output = Option<String>> + Send;
}

/// Looks process names up with `tasklist`.
#[derive(Debug, Clone, Default)]
pub struct TasklistLookup;

impl ProcessNameLookup for TasklistLookup {
    /// Executes: `tasklist /FI "PID eq <pid>" /FO CSV /NH`
    async fn lookup(&self, pid: u32) -> Option<String> {
        let filter = format!("PID eq {}", pid);
        let output = match Command::new("tasklist")
            .args(["/FI", filter.as_str(), "/FO", "CSV", "/NH"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
        {
            Ok(output) if output.status.success() => output,
            Ok(_) | Err(_) => {
                debug!(pid = pid, "tasklist lookup failed");
                return None;
            }
        };

        parse_tasklist_csv(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Take the process name from a tasklist CSV record.
///
/// ```text
/// "node.exe","4242","Console","1","45,120 K"
/// ```
pub fn parse_tasklist_csv(output: &str) -> Option<String> {
    let line = output.lines().map(str::trim).find(|l| !l.is_empty())?;
    // "INFO: No tasks are running which match the specified criteria."
    if line.starts_with("INFO:") {
        return None;
    }

    let name = line.split(',').next()?.trim().trim_matches('"');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Scan strategy backed by `netstat -ano`.
#[derive(Debug, Clone, Default)]
pub struct NetstatStrategy<L: ProcessNameLookup = TasklistLookup> {
    lookup: L,
}

impl NetstatStrategy<TasklistLookup> {
    /// Create a netstat strategy that resolves names with tasklist.
    pub fn new() -> Self {
        Self::with_lookup(TasklistLookup)
    }
}

impl<L: ProcessNameLookup> NetstatStrategy<L> {
    /// Create a netstat strategy with a custom name lookup.
    pub fn with_lookup(lookup: L) -> Self {
        Self { lookup }
    }
}

impl<L: ProcessNameLookup> ScanStrategy for NetstatStrategy<L> {
    fn tool(&self) -> &'static str {
        "netstat"
    }

    /// Executes: `netstat -ano`
    ///
    /// Flags explained:
    /// - -a: All connections and listening ports
    /// - -n: Numeric addresses and ports
    /// - -o: Owning process id
    async fn invoke(&self) -> Result<String> {
        Utils::run_tool("netstat", &["-ano"]).await
    }

    /// Parse netstat output into records.
    ///
    /// Expected netstat output format:
    /// ```text
    ///
    /// Active Connections
    ///
    ///   Proto  Local Address          Foreign Address        State           PID
    ///   TCP    0.0.0.0:135            0.0.0.0:0              LISTENING       1032
    ///   UDP    [::]:5353              *:*                                    2244
    /// ```
    async fn parse(&self, raw: &str) -> Vec<PortInfo> {
        let mut ports = Vec::new();
        let mut names: HashMap<u32, String> = HashMap::new();

        for line in raw.lines().skip(HEADER_LINES) {
            let components: Vec<&str> = line.split_whitespace().collect();
            if components.len() < MIN_FIELDS {
                trace!(line = line, "Skipping short netstat line");
                continue;
            }

            let protocol = components[0].to_lowercase();

            let pid: u32 = match components[components.len() - 1].parse() {
                Ok(p) if p > 0 => p,
                _ => continue,
            };

            let Some(port) = Utils::parse_port(components[1]) else {
                continue;
            };

            let process_name = match names.get(&pid) {
                Some(name) => name.clone(),
                None => {
                    let name = self
                        .lookup
                        .lookup(pid)
                        .await
                        .unwrap_or_else(|| UNKNOWN_PROCESS.to_string());
                    names.insert(pid, name.clone());
                    name
                }
            };

            ports.push(PortInfo::new(
                port,
                pid,
                process_name.clone(),
                process_name,
                protocol,
            ));
        }

        ports
    }
}
