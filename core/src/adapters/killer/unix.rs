//! Unix signal delivery via `kill(2)`.
//!
//! - SIGTERM for graceful termination
//! - SIGKILL for forced termination
//! - signal 0 as the liveness probe

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

use crate::ports::{SignalError, SignalPort};

/// Signal primitives backed by `kill(2)`.
#[derive(Debug, Clone, Default)]
pub struct UnixSignals;

impl UnixSignals {
    pub fn new() -> Self {
        Self
    }

    fn send(&self, pid: u32, signal: Option<Signal>) -> Result<(), SignalError> {
        let raw = i32::try_from(pid)
            .map_err(|_| SignalError::Failed(format!("pid {} is out of range", pid)))?;

        kill(Pid::from_raw(raw), signal).map_err(|errno| match errno {
            Errno::ESRCH => SignalError::NoSuchProcess,
            other => SignalError::Failed(other.desc().to_string()),
        })
    }
}

impl SignalPort for UnixSignals {
    /// A pid resolves unless the kernel says it names no process. EPERM
    /// still proves the process exists.
    fn resolve(&self, pid: u32) -> Result<(), SignalError> {
        match self.send(pid, None) {
            Err(SignalError::NoSuchProcess) => Err(SignalError::NoSuchProcess),
            Ok(()) | Err(SignalError::Failed(_)) => Ok(()),
        }
    }

    fn terminate(&self, pid: u32) -> Result<(), SignalError> {
        self.send(pid, Some(Signal::SIGTERM))
    }

    fn force_kill(&self, pid: u32) -> Result<(), SignalError> {
        self.send(pid, Some(Signal::SIGKILL))
    }

    fn probe(&self, pid: u32) -> Result<(), SignalError> {
        self.send(pid, None)
    }
}
