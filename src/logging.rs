//! Tracing subscriber setup for the binary.
//!
//! Events go to stderr so command output on stdout stays machine-readable.

use tracing_subscriber::EnvFilter;

/// Level used when neither `--log-level` nor `RUST_LOG` is set.
pub const DEFAULT_LEVEL: &str = "info";

/// Driver crates that log every statement at debug level.
const NOISY_TARGETS: [(&str, &str); 2] = [("postgres", "warn"), ("tokio_postgres", "warn")];

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {message}")]
    Filter { filter: String, message: String },

    #[error("Failed to install log subscriber: {0}")]
    Install(String),
}

/// Pick the base directive: explicit level, then `RUST_LOG`, then `info`.
fn base_directive(level: Option<&str>) -> String {
    level
        .map(str::to_string)
        .or_else(|| std::env::var("RUST_LOG").ok())
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
}

/// Build the filter from the base directive plus the noisy-target caps.
pub fn build_filter(level: Option<&str>) -> Result<EnvFilter, LoggingError> {
    let mut directives = vec![base_directive(level)];
    for (target, lvl) in NOISY_TARGETS {
        directives.push(format!("{}={}", target, lvl));
    }
    let filter = directives.join(",");
    EnvFilter::try_new(&filter).map_err(|e| LoggingError::Filter {
        filter,
        message: e.to_string(),
    })
}

/// Install the global subscriber. Call once, from `main`.
pub fn init(level: Option<&str>) -> Result<(), LoggingError> {
    let filter = build_filter(level)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_lock;
    use rstest::rstest;

    #[rstest]
    fn test_explicit_level_wins() {
        let _lock = test_lock().lock();
        unsafe { std::env::set_var("RUST_LOG", "trace") };
        assert_eq!(base_directive(Some("debug")), "debug");
        unsafe { std::env::remove_var("RUST_LOG") };
    }

    #[rstest]
    fn test_rust_log_then_default() {
        let _lock = test_lock().lock();
        unsafe { std::env::set_var("RUST_LOG", "rectus=debug") };
        assert_eq!(base_directive(None), "rectus=debug");
        unsafe { std::env::remove_var("RUST_LOG") };
        assert_eq!(base_directive(None), DEFAULT_LEVEL);
    }

    #[rstest]
    fn test_filter_caps_driver_targets() {
        let filter = build_filter(Some("debug")).unwrap().to_string();
        assert!(filter.contains("postgres=warn"));
        assert!(filter.contains("tokio_postgres=warn"));
    }

    #[rstest]
    fn test_invalid_filter_is_error() {
        let err = build_filter(Some("rectus=notalevel")).unwrap_err();
        assert!(matches!(err, LoggingError::Filter { .. }));
    }
}
