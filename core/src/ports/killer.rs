//! Process killer port (interface).

use crate::domain::KillOutcome;

/// Port for killing processes.
///
/// Implementations block for the duration of the termination protocol, so
/// callers running an event loop must move the call off their thread.
pub trait ProcessKillerPort: Send + Sync {
    /// Terminate a process, escalating from graceful to forced.
    ///
    /// Never fails out-of-band; every failure is encoded in the outcome.
    fn kill(&self, pid: u32) -> KillOutcome;

    /// Check if a process is still running.
    fn is_running(&self, pid: u32) -> bool;
}
