//! Windows signal delivery via taskkill and tasklist.
//!
//! - `taskkill /PID xxx` for graceful termination (WM_CLOSE)
//! - `taskkill /PID xxx /F` for forced termination (TerminateProcess)
//! - `tasklist /FI "PID eq xxx"` as the liveness probe

use std::process::Command;

use tracing::debug;

use crate::adapters::scanner::parse_tasklist_csv;
use crate::ports::{SignalError, SignalPort};

/// Signal primitives backed by the Windows task utilities.
#[derive(Debug, Clone, Default)]
pub struct WindowsSignals;

impl WindowsSignals {
    pub fn new() -> Self {
        Self
    }

    fn taskkill(&self, pid: u32, force: bool) -> Result<(), SignalError> {
        debug!(pid = pid, force = force, "Executing taskkill");

        let mut cmd = Command::new("taskkill");
        cmd.arg("/PID").arg(pid.to_string());
        if force {
            cmd.arg("/F");
        }

        let output = cmd
            .output()
            .map_err(|e| SignalError::Failed(format!("Failed to run taskkill: {}", e)))?;

        if output.status.success() {
            return Ok(());
        }

        let combined = format!(
            "{} {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );

        if combined.contains("not found") || combined.contains("could not be found") {
            return Err(SignalError::NoSuchProcess);
        }

        Err(SignalError::Failed(combined.trim().to_string()))
    }

    fn lookup(&self, pid: u32) -> Result<(), SignalError> {
        let filter = format!("PID eq {}", pid);
        let output = Command::new("tasklist")
            .args(["/FI", filter.as_str(), "/FO", "CSV", "/NH"])
            .output()
            .map_err(|e| SignalError::Failed(format!("Failed to run tasklist: {}", e)))?;

        match parse_tasklist_csv(&String::from_utf8_lossy(&output.stdout)) {
            Some(_) => Ok(()),
            None => Err(SignalError::NoSuchProcess),
        }
    }
}

impl SignalPort for WindowsSignals {
    fn resolve(&self, pid: u32) -> Result<(), SignalError> {
        self.lookup(pid)
    }

    fn terminate(&self, pid: u32) -> Result<(), SignalError> {
        self.taskkill(pid, false)
    }

    fn force_kill(&self, pid: u32) -> Result<(), SignalError> {
        self.taskkill(pid, true)
    }

    fn probe(&self, pid: u32) -> Result<(), SignalError> {
        self.lookup(pid)
    }
}
