//! Logging configuration for pressurelog.
//!
//! Diagnostics go to stderr through `tracing`, so they never mix with the
//! record list printed on stdout.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How chatty the diagnostics on stderr are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only (`-q`).
    Quiet,
    /// Warnings and errors, e.g. an unreadable stored record list.
    #[default]
    Normal,
    /// Storage and store activity (`-v`).
    Verbose,
    /// Everything (`-vv`).
    Trace,
}

impl Verbosity {
    /// The most detailed level that is still emitted.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Install the stderr subscriber.
///
/// `RUST_LOG`, when set, replaces the filter derived from `verbosity`.
/// Calling this more than once is harmless; only the first call installs.
///
/// # Examples
///
/// ```no_run
/// use pressurelog::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let default_filter = format!("pressurelog={}", verbosity.to_level_filter());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time(),
    );

    let _ = subscriber.try_init();
}

/// Route warnings from the code under test into the test harness output.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("pressurelog=warn")
        .with_test_writer()
        .try_init();
}
