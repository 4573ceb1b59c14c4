//! Diagnostic logging
//!
//! Library code emits `tracing` events; the binary installs one fmt
//! subscriber writing to stderr so stdout stays free for the report and the
//! NDJSON stream.

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter directive override, e.g. `INPLACE_LOG=inplace=debug`
pub const LOG_ENV: &str = "INPLACE_LOG";

/// Default level for a `-v` count
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Build the filter: `INPLACE_LOG` wins, otherwise the `-v` count.
pub fn build_filter(directive: Option<&str>, verbose: u8) -> EnvFilter {
    let fallback = level_for_verbosity(verbose);
    match directive {
        Some(directive) => EnvFilter::try_new(directive).unwrap_or_else(|err| {
            eprintln!(
                "invalid {} directive ({}); using {}",
                LOG_ENV, err, fallback
            );
            EnvFilter::new(fallback)
        }),
        None => EnvFilter::new(fallback),
    }
}

/// Install the stderr subscriber. Safe to call more than once.
pub fn init(verbose: u8, color: bool) {
    let directive = std::env::var(LOG_ENV).ok();
    let filter = build_filter(directive.as_deref(), verbose);

    let layer = fmt::layer()
        .with_target(verbose >= 2)
        .with_ansi(color)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .ok();
}
