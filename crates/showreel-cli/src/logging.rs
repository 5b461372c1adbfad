//! Tracing subscriber setup
//!
//! Logs go to stderr so they never interleave with the rendered chat on
//! stdout. `SHOWREEL_LOG` takes the usual `EnvFilter` syntax and wins over
//! the `-v`/`-q` derived level.

use crate::config::Verbosity;
use crate::error::{CliError, CliResult};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "SHOWREEL_LOG";

/// Filter from `SHOWREEL_LOG`, falling back to the verbosity level
#[must_use]
pub fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()))
}

/// Install the global subscriber
pub fn init(verbosity: Verbosity, json: bool) -> CliResult<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(verbosity.is_debug());

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| CliError::config(format!("failed to install logger: {e}")))
}
