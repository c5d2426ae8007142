//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout stays clean for tables and JSON. `RUST_LOG`
//! overrides the default filter entirely.

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// HTTP client internals muted to `warn` by default.
pub const NOISY_MODULES: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls"];

fn build_filter(level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let mut directives = String::from(level);
    for module in NOISY_MODULES {
        directives.push_str(&format!(",{module}=warn"));
    }
    EnvFilter::new(directives)
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(level: &str) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    let _ = tracing_subscriber::registry()
        .with(build_filter(level))
        .with(fmt_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_is_harmless() {
        init("info");
        init("debug");
        tracing::info!("logging initialised");
    }
}
