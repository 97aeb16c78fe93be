//! Tracing subscriber setup
//!
//! Library code logs through `tracing`; the binary installs a stderr fmt
//! subscriber. `PLUGREG_LOG` takes an `EnvFilter` directive and wins over the
//! default (`warn`, or `plugreg=debug` with `--verbose`).

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PLUGREG_LOG";

pub fn init(verbose: bool) {
    let default = if verbose { "plugreg=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    // A subscriber may already be installed (e.g. by an embedding test harness)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
