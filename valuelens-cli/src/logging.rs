//! Tracing subscriber setup.
//!
//! `RUST_LOG` overrides the level given on the command line. HTTP client
//! internals are held at `warn` so quote fetches don't drown the cycle logs.

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const NOISY_MODULES: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls"];

fn build_filter(log_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let mut directives = String::from(log_level);
    for module in NOISY_MODULES {
        directives.push_str(&format!(",{module}=warn"));
    }
    EnvFilter::new(directives)
}

/// Install the global subscriber. `log_format` is `"json"` or `"pretty"`.
///
/// Logs go to stderr; stdout carries the command's own output.
pub fn init_logging(log_level: &str, log_format: &str) {
    let subscriber = tracing_subscriber::registry().with(build_filter(log_level));

    if log_format == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_target(true);
        let _ = subscriber.with(fmt_layer).try_init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);
        let _ = subscriber.with(fmt_layer).try_init();
    }

    tracing::debug!(%log_level, %log_format, "logging initialized");
}
