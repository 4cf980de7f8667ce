//! Process termination with graceful-then-forced escalation.
//!
//! # Protocol
//!
//! 1. Resolve the pid; a pid that names no process fails immediately.
//! 2. Send the graceful signal (SIGTERM / `taskkill`). A process that is
//!    already gone counts as success; any other send error skips to step 4.
//! 3. Probe liveness every poll interval until the grace window closes,
//!    returning as soon as the process is gone.
//! 4. Send the forced signal (SIGKILL / `taskkill /F`).
//!
//! The wait in step 3 blocks the calling thread. Event loops should run
//! [`ProcessTerminator::kill`] on a blocking pool.

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::domain::KillOutcome;
use crate::ports::{ProcessKillerPort, SignalError, SignalPort};

#[cfg(unix)]
pub use unix::UnixSignals as PlatformSignals;

#[cfg(windows)]
pub use windows::WindowsSignals as PlatformSignals;

/// How long a process gets to exit after the graceful signal.
pub const DEFAULT_GRACE_TIMEOUT: Duration = Duration::from_secs(2);

/// How often liveness is probed during the grace window.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Drives the termination protocol over a set of signal primitives.
#[derive(Debug, Clone)]
pub struct ProcessTerminator<S: SignalPort> {
    signals: S,
    grace_timeout: Duration,
    poll_interval: Duration,
}

#[cfg(any(unix, windows))]
impl ProcessTerminator<PlatformSignals> {
    /// Create a terminator for the current platform with default timing.
    pub fn new() -> Self {
        Self::with_signals(PlatformSignals::new())
    }
}

#[cfg(any(unix, windows))]
impl Default for ProcessTerminator<PlatformSignals> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SignalPort> ProcessTerminator<S> {
    /// Create a terminator around explicit signal primitives.
    pub fn with_signals(signals: S) -> Self {
        Self {
            signals,
            grace_timeout: DEFAULT_GRACE_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the grace window and probe interval.
    pub fn with_timing(mut self, grace_timeout: Duration, poll_interval: Duration) -> Self {
        self.grace_timeout = grace_timeout;
        self.poll_interval = poll_interval;
        self
    }

    pub fn grace_timeout(&self) -> Duration {
        self.grace_timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Terminate `pid`, escalating from graceful to forced.
    pub fn kill(&self, pid: u32) -> KillOutcome {
        if !is_valid_pid(pid) {
            return KillOutcome::failure("Invalid PID");
        }

        if let Err(e) = self.signals.resolve(pid) {
            debug!(pid = pid, error = %e, "Could not resolve process");
            return KillOutcome::failure(format!("Process not found: {}", e));
        }

        // Phase 1: graceful
        match self.signals.terminate(pid) {
            Ok(()) => {
                debug!(pid = pid, "Graceful signal sent, waiting for exit");
            }
            Err(SignalError::NoSuchProcess) => {
                debug!(pid = pid, "Process exited before the graceful signal");
                return KillOutcome::success("Process already terminated");
            }
            Err(e) => {
                warn!(pid = pid, error = %e, "Graceful signal failed, forcing");
                return self.force(pid, "Process killed (forced)", "Failed to kill process");
            }
        }

        // Phase 2: bounded wait
        if self.wait_for_exit(pid) {
            debug!(pid = pid, "Process terminated after graceful signal");
            return KillOutcome::success("Process terminated gracefully");
        }

        // Phase 3: forced
        warn!(
            pid = pid,
            timeout_ms = self.grace_timeout.as_millis() as u64,
            "Process ignored graceful signal, forcing"
        );
        self.force(
            pid,
            "Process killed (forced after timeout)",
            "Failed to force kill process",
        )
    }

    /// Check if `pid` still refers to a live process.
    pub fn is_running(&self, pid: u32) -> bool {
        is_valid_pid(pid) && self.signals.resolve(pid).is_ok() && self.signals.probe(pid).is_ok()
    }

    fn force(&self, pid: u32, success_message: &str, failure_prefix: &str) -> KillOutcome {
        match self.signals.force_kill(pid) {
            Ok(()) => KillOutcome::success(success_message),
            Err(SignalError::NoSuchProcess) => {
                debug!(pid = pid, "Process exited before the forced signal");
                KillOutcome::success("Process already terminated")
            }
            Err(e) => {
                warn!(pid = pid, error = %e, "Forced signal failed");
                KillOutcome::failure(format!("{}: {}", failure_prefix, e))
            }
        }
    }

    /// Poll until the process is gone or the grace window closes.
    fn wait_for_exit(&self, pid: u32) -> bool {
        let deadline = Instant::now() + self.grace_timeout;
        loop {
            // Any probe failure means we can no longer reach the process
            if self.signals.probe(pid).is_err() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(self.poll_interval);
        }
    }
}

impl<S: SignalPort> ProcessKillerPort for ProcessTerminator<S> {
    fn kill(&self, pid: u32) -> KillOutcome {
        ProcessTerminator::kill(self, pid)
    }

    fn is_running(&self, pid: u32) -> bool {
        ProcessTerminator::is_running(self, pid)
    }
}

/// Pids must be positive and fit the platform's signed pid type.
fn is_valid_pid(pid: u32) -> bool {
    pid > 0 && i32::try_from(pid).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Signal primitives with scripted answers, recording every call.
    struct ScriptedSignals {
        resolve: Result<(), SignalError>,
        terminate: Result<(), SignalError>,
        force_kill: Result<(), SignalError>,
        /// Liveness answers in order; once drained the process stays alive.
        probes: Mutex<VecDeque<bool>>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl ScriptedSignals {
        fn new() -> Self {
            Self {
                resolve: Ok(()),
                terminate: Ok(()),
                force_kill: Ok(()),
                probes: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn probes(self, alive: &[bool]) -> Self {
            *self.probes.lock().unwrap() = alive.iter().copied().collect();
            self
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl SignalPort for ScriptedSignals {
        fn resolve(&self, _pid: u32) -> Result<(), SignalError> {
            self.record("resolve");
            self.resolve.clone()
        }

        fn terminate(&self, _pid: u32) -> Result<(), SignalError> {
            self.record("terminate");
            self.terminate.clone()
        }

        fn force_kill(&self, _pid: u32) -> Result<(), SignalError> {
            self.record("force_kill");
            self.force_kill.clone()
        }

        fn probe(&self, _pid: u32) -> Result<(), SignalError> {
            self.record("probe");
            match self.probes.lock().unwrap().pop_front() {
                Some(false) => Err(SignalError::NoSuchProcess),
                Some(true) | None => Ok(()),
            }
        }
    }

    fn fast(signals: ScriptedSignals) -> ProcessTerminator<ScriptedSignals> {
        ProcessTerminator::with_signals(signals)
            .with_timing(Duration::from_millis(200), Duration::from_millis(5))
    }

    #[test]
    fn test_default_timing() {
        let terminator = ProcessTerminator::with_signals(ScriptedSignals::new());
        assert_eq!(terminator.grace_timeout(), Duration::from_secs(2));
        assert_eq!(terminator.poll_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_invalid_pid() {
        let terminator = fast(ScriptedSignals::new());

        let outcome = terminator.kill(0);
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Invalid PID");

        let outcome = terminator.kill(u32::MAX);
        assert!(!outcome.success);
        assert!(terminator.signals.calls().is_empty());
    }

    #[test]
    fn test_unresolvable_pid_fails() {
        let mut signals = ScriptedSignals::new();
        signals.resolve = Err(SignalError::NoSuchProcess);
        let terminator = fast(signals);

        let outcome = terminator.kill(4242);
        assert!(!outcome.success);
        assert!(outcome.message.starts_with("Process not found"));
        assert_eq!(terminator.signals.calls(), vec!["resolve"]);
    }

    #[test]
    fn test_already_exited_before_graceful_signal() {
        let mut signals = ScriptedSignals::new();
        signals.terminate = Err(SignalError::NoSuchProcess);
        let terminator = fast(signals);

        let outcome = terminator.kill(4242);
        assert!(outcome.success);
        assert_eq!(outcome.message, "Process already terminated");
        assert_eq!(terminator.signals.calls(), vec!["resolve", "terminate"]);
    }

    #[test]
    fn test_exit_before_first_probe_is_graceful() {
        let terminator = fast(ScriptedSignals::new().probes(&[false]));

        let outcome = terminator.kill(4242);
        assert!(outcome.success);
        assert!(outcome.message.contains("terminated"));
        assert!(!outcome.message.contains("forced"));
        assert_eq!(
            terminator.signals.calls(),
            vec!["resolve", "terminate", "probe"]
        );
    }

    #[test]
    fn test_exit_during_wait_is_graceful() {
        let terminator = fast(ScriptedSignals::new().probes(&[true, true, false]));

        let outcome = terminator.kill(4242);
        assert_eq!(outcome, KillOutcome::success("Process terminated gracefully"));
        assert!(!terminator.signals.calls().contains(&"force_kill"));
    }

    #[test]
    fn test_timeout_escalates_to_forced() {
        let terminator = fast(ScriptedSignals::new());

        let started = Instant::now();
        let outcome = terminator.kill(4242);
        assert!(started.elapsed() >= Duration::from_millis(200));

        assert_eq!(
            outcome,
            KillOutcome::success("Process killed (forced after timeout)")
        );
        assert_eq!(terminator.signals.calls().last(), Some(&"force_kill"));
    }

    #[test]
    fn test_graceful_failure_forces_immediately() {
        let mut signals = ScriptedSignals::new();
        signals.terminate = Err(SignalError::Failed("Operation not permitted".to_string()));
        let terminator = fast(signals);

        let outcome = terminator.kill(4242);
        assert_eq!(outcome, KillOutcome::success("Process killed (forced)"));
        assert_eq!(
            terminator.signals.calls(),
            vec!["resolve", "terminate", "force_kill"]
        );
    }

    #[test]
    fn test_forced_failure_is_reported() {
        let mut signals = ScriptedSignals::new();
        signals.terminate = Err(SignalError::Failed("Operation not permitted".to_string()));
        signals.force_kill = Err(SignalError::Failed("Operation not permitted".to_string()));
        let terminator = fast(signals);

        let outcome = terminator.kill(1);
        assert!(!outcome.success);
        assert_eq!(
            outcome.message,
            "Failed to kill process: Operation not permitted"
        );
    }

    #[test]
    fn test_forced_failure_after_timeout_is_reported() {
        let mut signals = ScriptedSignals::new();
        signals.force_kill = Err(SignalError::Failed("Access is denied".to_string()));
        let terminator = fast(signals);

        let outcome = terminator.kill(4242);
        assert!(!outcome.success);
        assert!(outcome.message.starts_with("Failed to force kill process"));
    }

    #[test]
    fn test_is_running() {
        let terminator = fast(ScriptedSignals::new().probes(&[true, false]));
        assert!(terminator.is_running(4242));
        assert!(!terminator.is_running(4242));
        assert!(!terminator.is_running(0));

        let mut signals = ScriptedSignals::new();
        signals.resolve = Err(SignalError::NoSuchProcess);
        assert!(!fast(signals).is_running(4242));
    }
}
