//! Tracing bootstrap.
//!
//! Diagnostics go to stderr, filtered by `PORTMAN_LOG` (standard
//! `EnvFilter` directives such as `debug` or `portman_core=trace`).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "PORTMAN_LOG";

/// What the process is about to do with the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Single command; warnings are useful on stderr.
    OneShot,
    /// Alternate-screen session; stray output would corrupt the display.
    Session,
}

impl Mode {
    fn default_directive(self) -> &'static str {
        match self {
            Mode::OneShot => "warn",
            Mode::Session => "off",
        }
    }
}

pub fn init(mode: Mode) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(mode.default_directive()));

    // A second init (tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .try_init();
}
