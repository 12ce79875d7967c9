//! Structured logging setup.
//!
//! Filtering comes from `RUST_LOG` when set; otherwise the configured level
//! applies crate-wide. Initialization is idempotent so tests and embedding
//! applications can both call it.

use tracing::Level;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::config::Settings;
use crate::error::{Result, SweepError};

/// Initialize logging from the settings tree.
pub fn init_from_settings(settings: &Settings) -> Result<()> {
    init(parse_log_level(&settings.application.log_level)?)
}

/// Initialize logging at a fixed fallback level.
///
/// Idempotent: a subscriber installed earlier in the process wins and this
/// returns `Ok(())`.
pub fn init(level: Level) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let fmt_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .or_else(|e| {
            if e.to_string()
                .contains("a global default trace dispatcher has already been set")
            {
                Ok(())
            } else {
                Err(SweepError::Telemetry(e.to_string()))
            }
        })
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(SweepError::Telemetry(format!(
            "invalid log level '{other}', expected trace, debug, info, warn or error"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_levels_parse_case_insensitively() {
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("info").unwrap(), Level::INFO);
        assert!(parse_log_level("verbose").is_err());
    }

    #[test]
    fn init_is_idempotent() {
        init(Level::INFO).unwrap();
        init(Level::DEBUG).unwrap();
    }
}
