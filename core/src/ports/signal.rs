//! Signal delivery port (interface).

use thiserror::Error;

/// Why a signal could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    /// The process does not exist (or has already exited).
    #[error("no such process")]
    NoSuchProcess,

    /// Delivery failed for another reason, typically permissions.
    #[error("{0}")]
    Failed(String),
}

/// The three signal primitives the termination protocol is built from.
pub trait SignalPort: Send + Sync {
    /// Resolve a handle for `pid`, failing if it does not refer to a process.
    fn resolve(&self, pid: u32) -> Result<(), SignalError>;

    /// Politely ask the process to exit (SIGTERM or equivalent).
    fn terminate(&self, pid: u32) -> Result<(), SignalError>;

    /// Unconditionally end the process (SIGKILL or equivalent).
    fn force_kill(&self, pid: u32) -> Result<(), SignalError>;

    /// Zero-effect liveness probe; `Ok` means the process is still there.
    fn probe(&self, pid: u32) -> Result<(), SignalError>;
}
