//! Diagnostics on stderr. Walk output on stdout is never mixed with it.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Filter directives, e.g. `walken_revwalk=trace`.
const LOG_ENV: &str = "WALKEN_LOG";

/// Install the global subscriber.
///
/// `WALKEN_LOG` wins when set and valid. Otherwise a truthy `GIT_TRACE`
/// turns on debug output and everything else stays at `warn`.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        let level = if git_trace_enabled(std::env::var("GIT_TRACE").ok().as_deref()) {
            "debug"
        } else {
            "warn"
        };
        EnvFilter::new(level)
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

fn git_trace_enabled(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(v) => !matches!(v.trim().to_ascii_lowercase().as_str(), "" | "0" | "false" | "no" | "off"),
    }
}
