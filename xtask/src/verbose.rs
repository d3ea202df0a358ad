//! Log output for the harness CLI.
//!
//! Three levels controlled by CLI flags:
//! - **Quiet** (`-q`): warnings, errors and verdict lines only
//! - **Default** (no flag): phase progress
//! - **Verbose** (`-v`): state transitions, monitor traffic, timings
//!
//! `RUST_LOG` overrides the flag when set.

use std::time::Instant;

use tracing_subscriber::EnvFilter;

/// Output verbosity level.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet = 0,
    Default = 1,
    Verbose = 2,
}

impl Verbosity {
    fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Default
        }
    }

    fn directive(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Default => "info",
            Self::Verbose => "debug",
        }
    }
}

/// Install the global subscriber. Logs go to stderr so verdict lines and
/// `--json` output on stdout stay clean.
pub fn init(quiet: bool, verbose: bool) {
    let level = Verbosity::from_flags(quiet, verbose);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(level == Verbosity::Verbose)
        .try_init();
}

/// RAII timer that logs the elapsed duration at debug level on drop.
///
/// ```ignore
/// let _t = Timer::start("staging");
/// // ... work ...
/// // logs "staging: 42ms" on drop
/// ```
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    /// Begin timing a labeled operation.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        tracing::debug!(elapsed = ?elapsed, "{}: {:.1?}", self.label, elapsed);
    }
}
