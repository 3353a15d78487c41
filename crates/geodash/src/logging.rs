//! Subscriber setup for the `geodash` binary.
//!
//! The `[logging]` config section picks the level and output format. The
//! `--verbose` and `--json-logs` flags override it, and `RUST_LOG` overrides
//! the level directive of both. Logs always go to stderr so `preview` and
//! `stats` output on stdout stays clean.

use geodash_core::config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Pretty,
    Json,
}

/// Logging settings after CLI flags are applied.
#[derive(Debug, PartialEq, Eq)]
struct Settings {
    directive: String,
    format: Format,
}

impl Settings {
    fn resolve(config: &LoggingConfig, verbose: bool, json_logs: bool) -> Self {
        let directive = if verbose {
            "debug".to_string()
        } else {
            config.level.clone()
        };
        let format = if json_logs || config.format.eq_ignore_ascii_case("json") {
            Format::Json
        } else {
            Format::Pretty
        };
        Self { directive, format }
    }

    fn filter(&self) -> EnvFilter {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
        EnvFilter::try_new(&self.directive).unwrap_or_else(|e| {
            eprintln!("Warning: invalid log level {:?} ({e}), using info", self.directive);
            EnvFilter::new("info")
        })
    }
}

/// Install the global subscriber. Call once, before any command runs.
pub fn init(config: &LoggingConfig, verbose: bool, json_logs: bool) {
    let settings = Settings::resolve(config, verbose, json_logs);
    let registry = tracing_subscriber::registry().with(settings.filter());
    let stderr = fmt::layer().with_writer(std::io::stderr);

    match settings.format {
        Format::Json => registry.with(stderr.json()).init(),
        Format::Pretty => registry.with(stderr.with_target(false)).init(),
    }
}
