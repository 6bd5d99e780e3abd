//! Log output for the CLI.
//!
//! The library logs through the `log` facade. [`init`] installs a
//! `tracing-subscriber` formatter on stderr; its `tracing-log` bridge
//! forwards `log` records to it.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*};

/// Map `-v` repetitions and `--quiet` to a level filter.
///
/// Quiet wins; otherwise the default is `INFO`, `-v` enables `DEBUG` and
/// `-vv` or more enables `TRACE`.
#[must_use]
pub const fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install the global stderr subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber or `log` logger is already set.
pub fn init(verbosity: u8, quiet: bool) -> Result<(), TryInitError> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .without_time()
        .compact();

    tracing_subscriber::registry()
        .with(level_for(verbosity, quiet))
        .with(fmt_layer)
        .try_init()
}
