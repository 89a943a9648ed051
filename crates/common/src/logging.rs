//! Tracing setup for the CLI.
//!
//! Logs go to stderr; stdout is reserved for reports and prompts so they can
//! be piped. `RUST_LOG` overrides the configured level.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// HTTP stack crates that are only interesting when explicitly asked for.
const QUIET_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls"];

/// Filter directives for a configured level.
///
/// The HTTP stack used by enrichment is held at `warn` unless the level
/// already names it.
pub fn filter_directives(level: &str) -> String {
    let level = level.trim();
    let mut directives = vec![if level.is_empty() { "info" } else { level }.to_string()];
    directives.extend(
        QUIET_TARGETS
            .iter()
            .filter(|target| !level.split(',').any(|d| d.trim().starts_with(**target)))
            .map(|target| format!("{target}=warn")),
    );
    directives.join(",")
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config.level)));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.with_target(false).compact().finish())
    };
    if installed.is_ok() {
        tracing::debug!(level = %config.level, json = config.json, "Logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_targets_are_quieted() {
        assert_eq!(
            filter_directives("debug"),
            "debug,hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn"
        );
    }

    #[test]
    fn test_explicit_target_is_not_overridden() {
        let directives = filter_directives("info,reqwest=debug");
        assert!(directives.starts_with("info,reqwest=debug"));
        assert!(!directives.contains("reqwest=warn"));
        assert!(directives.contains("hyper=warn"));
    }

    #[test]
    fn test_blank_level_defaults_to_info() {
        assert!(filter_directives("  ").starts_with("info,"));
    }
}
