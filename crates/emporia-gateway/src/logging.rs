//! Tracing setup for host applications.
//!
//! The gateway itself only emits through `tracing`; a host that wants the
//! output on stderr calls [`init`] once at startup. Filtering follows the
//! usual `EnvFilter` syntax via the `EMPORIA_LOG` variable, e.g.
//! `EMPORIA_LOG=emporia_gateway=debug`.

use tracing_subscriber::filter::EnvFilter;

/// Environment variable controlling the log filter.
pub const LOG_FILTER_ENV: &str = "EMPORIA_LOG";

/// Filter applied when `EMPORIA_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the global tracing subscriber.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
