use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

pub struct Utils;

impl Utils {
    /// Extract the local port from an address field.
    ///
    /// Handles the shapes inspection tools print:
    /// - IPv4: "127.0.0.1:3000" or "*:8080"
    /// - IPv6: "\[::1]:3000" or "\[fe80::1%lo0]:8080"
    /// - Connections: "127.0.0.1:5000->127.0.0.1:6000" (local side wins)
    /// - State suffix: "*:3000(LISTEN)"
    ///
    /// Returns `None` for port 0 or anything that is not a valid port.
    pub fn parse_port(address: &str) -> Option<u16> {
        let local = address.split("->").next().unwrap_or(address);
        let local = local.split('(').next().unwrap_or(local);
        let (_, port_str) = local.rsplit_once(':')?;
        let port: u16 = port_str.trim().parse().ok()?;
        (port != 0).then_some(port)
    }

    /// Decode the hex escapes lsof uses for unprintable name bytes.
    pub fn unescape_lsof_name(name: &str) -> String {
        name.replace("\\x20", " ") // Space
            .replace("\\x2f", "/") // Slash
    }

    /// Run an inspection tool and return its stdout.
    pub async fn run_tool(program: &str, args: &[&str]) -> Result<String> {
        debug!(program = program, ?args, "Running inspection tool");

        let output = Command::new(program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::ToolExecution(format!("Failed to run {}: {}", program, e)))?;

        Self::interpret_output(
            program,
            output.status.success(),
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
        )
    }

    /// Map a finished tool run to scan input.
    ///
    /// A failing exit with nothing on stderr is how these tools report "no
    /// matches", so it yields empty input rather than an error.
    pub fn interpret_output(
        program: &str,
        success: bool,
        stdout: &str,
        stderr: &str,
    ) -> Result<String> {
        if success {
            return Ok(stdout.to_string());
        }

        let stderr = stderr.trim();
        if stderr.is_empty() {
            debug!(program = program, "Tool exited non-zero without diagnostics, no results");
            return Ok(String::new());
        }

        Err(Error::ToolExecution(format!("{} failed: {}", program, stderr)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ipv4_port() {
        assert_eq!(Utils::parse_port("127.0.0.1:3000"), Some(3000));
        assert_eq!(Utils::parse_port("*:8080"), Some(8080));
        assert_eq!(Utils::parse_port("0.0.0.0:135"), Some(135));
    }

    #[test]
    fn test_parse_ipv6_port() {
        assert_eq!(Utils::parse_port("[::1]:3000"), Some(3000));
        assert_eq!(Utils::parse_port("[fe80::1%lo0]:8080"), Some(8080));
        assert_eq!(Utils::parse_port("[::]:445"), Some(445));
    }

    #[test]
    fn test_parse_port_strips_state_and_peer() {
        assert_eq!(Utils::parse_port("*:3000(LISTEN)"), Some(3000));
        assert_eq!(
            Utils::parse_port("127.0.0.1:52044->127.0.0.1:5432"),
            Some(52044)
        );
    }

    #[test]
    fn test_parse_port_rejects_invalid() {
        assert_eq!(Utils::parse_port("*:0"), None);
        assert_eq!(Utils::parse_port("*:*"), None);
        assert_eq!(Utils::parse_port("localhost"), None);
        assert_eq!(Utils::parse_port("*:70000"), None);
    }

    #[test]
    fn test_unescape_lsof_name() {
        assert_eq!(Utils::unescape_lsof_name("Code\\x20Helper"), "Code Helper");
        assert_eq!(Utils::unescape_lsof_name("a\\x2fb"), "a/b");
    }

    #[test]
    fn test_interpret_output() {
        let ok = Utils::interpret_output("lsof", true, "COMMAND PID\n", "").unwrap();
        assert_eq!(ok, "COMMAND PID\n");

        let empty = Utils::interpret_output("lsof", false, "", "  \n").unwrap();
        assert!(empty.is_empty());

        let err = Utils::interpret_output("lsof", false, "", "lsof: no permission\n").unwrap_err();
        assert!(matches!(err, Error::ToolExecution(ref msg) if msg.contains("no permission")));
    }

    #[tokio::test]
    async fn test_run_missing_tool() {
        let result = Utils::run_tool("portman-definitely-not-a-real-tool", &[]).await;
        assert!(matches!(result, Err(Error::ToolExecution(_))));
    }
}
