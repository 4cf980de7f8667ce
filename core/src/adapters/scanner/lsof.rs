//! lsof-based scanner used on macOS, Linux and the BSDs.

use tracing::trace;

use crate::domain::PortInfo;
use crate::error::Result;

use super::utils::Utils;
use super::ScanStrategy;

/// Minimum column count of a usable lsof row.
const MIN_FIELDS: usize = 9;

/// Scan strategy backed by `lsof`.
#[derive(Debug, Clone, Default)]
pub struct LsofStrategy;

impl LsofStrategy {
    /// Create a new lsof strategy.
    pub fn new() -> Self {
        Self
    }
}

impl ScanStrategy for LsofStrategy {
    fn tool(&self) -> &'static str {
        "lsof"
    }

    /// Executes: `lsof -i -P -n`
    ///
    /// Flags explained:
    /// - -i: Show internet sockets (TCP and UDP, listening or connected)
    /// - -P: Show port numbers (don't resolve to service names)
    /// - -n: Show IP addresses (don't resolve to hostnames)
    async fn invoke(&self) -> Result<String> {
        Utils::run_tool("lsof", &["-i", "-P", "-n"]).await
    }

    async fn parse(&self, raw: &str) -> Vec<PortInfo> {
        parse_lsof_output(raw)
    }
}

/// Parse lsof output into records.
///
/// Expected lsof output format:
/// ```text
/// COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
/// node     34805  code   19u  IPv6 0x3d8015e195af1f3f      0t0  TCP [::1]:3000 (LISTEN)
/// ```
///
/// Fields past NAME become the command, except `(LISTEN)` style state
/// markers, which are dropped; a filter on `listen` therefore matches nothing.
///
/// The result may hold duplicates; deduplication is the scanner's job.
pub fn parse_lsof_output(output: &str) -> Vec<PortInfo> {
    let mut ports = Vec::new();

    // Skip header line
    for line in output.lines().skip(1) {
        // Parse lsof columns: COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME
        let components: Vec<&str> = line.split_whitespace().collect();
        if components.len() < MIN_FIELDS {
            trace!(line = line, "Skipping short lsof line");
            continue;
        }

        let process_name = Utils::unescape_lsof_name(components[0]);

        let pid: u32 = match components[1].parse() {
            Ok(p) if p > 0 => p,
            _ => {
                trace!(line = line, "Skipping lsof line without a pid");
                continue;
            }
        };

        let protocol = components[7].to_lowercase();

        let Some(port) = Utils::parse_port(components[8]) else {
            trace!(line = line, "Skipping lsof line without a port");
            continue;
        };

        // Whatever follows NAME, minus the "(LISTEN)" style state marker
        let rest: Vec<&str> = components[MIN_FIELDS..]
            .iter()
            .copied()
            .filter(|c| !is_state_marker(c))
            .collect();
        let command = if rest.is_empty() {
            process_name.clone()
        } else {
            rest.join(" ")
        };

        ports.push(PortInfo::new(port, pid, process_name, command, protocol));
    }

    ports
}

fn is_state_marker(component: &str) -> bool {
    component.starts_with('(') && component.ends_with(')')
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME";

    #[test]
    fn test_parse_lsof_output() {
        let output = format!(
            "{HEADER}
node     34805  code   19u  IPv6 0x3d8015e195af1f3f      0t0  TCP [::1]:3000 (LISTEN)
nginx        1  root    6u  IPv4 0x1234567890abcdef      0t0  TCP *:80 (LISTEN)
mDNSRespo  222  root    8u  IPv4 0x1234567890abcdee      0t0  UDP *:5353
"
        );

        let mut ports = parse_lsof_output(&output);
        ports.sort_by_key(|p| p.port);
        assert_eq!(ports.len(), 3);

        assert_eq!(ports[0].port, 80);
        assert_eq!(ports[0].pid, 1);
        assert_eq!(ports[0].process_name, "nginx");
        assert_eq!(ports[0].protocol, "tcp");
        assert_eq!(ports[0].command, "nginx");

        assert_eq!(ports[1].port, 3000);
        assert_eq!(ports[1].pid, 34805);

        assert_eq!(ports[2].port, 5353);
        assert_eq!(ports[2].protocol, "udp");
    }

    #[test]
    fn test_trailing_fields_become_command() {
        let output = format!(
            "{HEADER}
java  4242  dev  50u  IPv6 0xabc  0t0  TCP *:8080 (LISTEN) extra words
"
        );

        let ports = parse_lsof_output(&output);
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].command, "extra words");
    }

    #[test]
    fn test_established_connection_uses_local_port() {
        let output = format!(
            "{HEADER}
psql  777  dev  3u  IPv4 0xabc  0t0  TCP 127.0.0.1:52044->127.0.0.1:5432 (ESTABLISHED)
"
        );

        let ports = parse_lsof_output(&output);
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].port, 52044);
    }

    #[test]
    fn test_unescape_process_name() {
        let output = format!(
            "{HEADER}
Code\\x20Helper  1234  user   10u  IPv4 0x1234567890abcdef      0t0  TCP *:3000 (LISTEN)
"
        );

        let ports = parse_lsof_output(&output);
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].process_name, "Code Helper");
    }

    #[test]
    fn test_skips_malformed_lines() {
        let output = format!(
            "{HEADER}
short line
node  notapid  code  19u  IPv4 0xabc  0t0  TCP *:3000 (LISTEN)
node  1234  code  19u  IPv4 0xabc  0t0  TCP *:0
node  1234  code  19u  IPv4 0xabc  0t0  TCP *:*
node  1234  code  19u  IPv4 0xabc  0t0  TCP *:3001 (LISTEN)
"
        );

        let ports = parse_lsof_output(&output);
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].port, 3001);
    }

    #[test]
    fn test_header_only_and_empty() {
        assert!(parse_lsof_output("").is_empty());
        assert!(parse_lsof_output(HEADER).is_empty());
    }
}
