//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set; otherwise `--verbose` selects `debug` for the
//! appmixer crates and `info` is the default. Logs go to stderr so `--json`
//! output on stdout stays parseable.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,appmixer_client=info,appmixer_reconciler=info,appmixer_cli=info";
const VERBOSE_FILTER: &str = "info,appmixer_client=debug,appmixer_reconciler=debug,appmixer_cli=debug";

/// Filter directive used when `RUST_LOG` is not set.
#[must_use]
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Install the global subscriber. Safe to call once per process.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // A second init (e.g. in tests) is not an error worth reporting.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
