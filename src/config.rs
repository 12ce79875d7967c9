//! Layered configuration.
//!
//! Settings merge a TOML file with `SWEEP_DAQ_`-prefixed environment
//! variables, environment winning. Every field has a default, so an empty
//! file (or no file at all) yields a usable configuration.
//!
//! ```toml
//! [application]
//! log_level = "debug"
//!
//! [instrument]
//! address = "192.168.0.40"
//! port = 5025
//!
//! [timeouts]
//! reply_timeout = "500ms"
//! ```
//!
//! Environment keys use `__` between the section and the field, so that
//! snake_case field names survive: `SWEEP_DAQ_INSTRUMENT__ADDRESS=10.0.0.5`
//! overrides `instrument.address`, `SWEEP_DAQ_TIMEOUTS__REPLY_TIMEOUT=2s`
//! overrides `timeouts.reply_timeout`.

use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};

/// Default configuration file looked for in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "sweep_daq.toml";

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "SWEEP_DAQ_";

/// Top-level settings tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Application-wide settings.
    pub application: ApplicationSettings,
    /// Instrument connection settings.
    pub instrument: InstrumentSettings,
    /// Transport and acquisition timing.
    pub timeouts: TimeoutSettings,
}

/// Application-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApplicationSettings {
    /// Human-readable application name, used in logs.
    pub name: String,
    /// Log filter when `RUST_LOG` is unset (`error` .. `trace`).
    pub log_level: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            name: "sweep_daq".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Instrument connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InstrumentSettings {
    /// Hostname or IP of the analyzer.
    pub address: String,
    /// SCPI-over-TCP port.
    pub port: u16,
    /// Instrument channel for averaging status and readback.
    pub channel: u32,
    /// Name of the measurement trace created for readback.
    pub measurement: String,
    /// S-parameter the measurement trace observes.
    pub s_parameter: String,
}

impl Default for InstrumentSettings {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: crate::transport::tcp::DEFAULT_SCPI_PORT,
            channel: 1,
            measurement: "sweep_daq".to_string(),
            s_parameter: "S21".to_string(),
        }
    }
}

/// Transport and acquisition timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimeoutSettings {
    /// Reply inactivity timeout of the transport framer.
    #[serde(with = "humantime_serde")]
    pub reply_timeout: Duration,
    /// Read poll interval of the transport framer.
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Pause between averaging-completion polls.
    #[serde(with = "humantime_serde")]
    pub completion_poll_interval: Duration,
    /// Completion polls before an acquisition times out.
    pub completion_max_polls: u32,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            reply_timeout: crate::transport::framer::DEFAULT_REPLY_TIMEOUT,
            poll_interval: crate::transport::framer::DEFAULT_POLL_INTERVAL,
            completion_poll_interval: crate::acquisition::DEFAULT_POLL_PAUSE,
            completion_max_polls: crate::acquisition::DEFAULT_MAX_POLLS,
        }
    }
}

impl Settings {
    /// Load from [`DEFAULT_CONFIG_FILE`] plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load from a specific file plus environment overrides.
    ///
    /// A missing file is fine; the defaults and environment still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let settings: Settings = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject configurations that can never work.
    pub fn validate(&self) -> Result<()> {
        if self.instrument.address.is_empty() {
            return Err(SweepError::Config(figment::Error::from(
                "instrument.address must not be empty".to_string(),
            )));
        }
        if self.timeouts.completion_max_polls == 0 {
            return Err(SweepError::Config(figment::Error::from(
                "timeouts.completion_max_polls must be at least 1".to_string(),
            )));
        }
        Ok(())
    }
}

// The load tests run inside figment::Jail: it serializes jailed tests and
// cleans up the env vars and files they create, so env-reading tests cannot
// interfere with each other.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.instrument.port, 5025);
        assert_eq!(settings.timeouts.completion_max_polls, 600);
    }

    #[test]
    fn toml_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "sweep_daq.toml",
                r#"
[instrument]
address = "192.168.0.40"
channel = 2

[timeouts]
reply_timeout = "2s"
"#,
            )?;

            let settings = Settings::load().expect("load");
            assert_eq!(settings.instrument.address, "192.168.0.40");
            assert_eq!(settings.instrument.channel, 2);
            assert_eq!(settings.timeouts.reply_timeout, Duration::from_secs(2));
            // Untouched sections keep their defaults.
            assert_eq!(settings.instrument.s_parameter, "S21");
            Ok(())
        });
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        figment::Jail::expect_with(|_jail| {
            let settings = Settings::load_from("absent.toml").expect("load");
            assert_eq!(settings, Settings::default());
            Ok(())
        });
    }

    #[test]
    fn env_overrides_reach_snake_case_fields() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SWEEP_DAQ_INSTRUMENT__ADDRESS", "10.0.0.5");
            jail.set_env("SWEEP_DAQ_TIMEOUTS__REPLY_TIMEOUT", "2s");
            jail.set_env("SWEEP_DAQ_TIMEOUTS__COMPLETION_MAX_POLLS", "42");

            let settings = Settings::load_from("absent.toml").expect("load");
            assert_eq!(settings.instrument.address, "10.0.0.5");
            assert_eq!(settings.timeouts.reply_timeout, Duration::from_secs(2));
            assert_eq!(settings.timeouts.completion_max_polls, 42);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_win_over_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "sweep_daq.toml",
                r#"
[instrument]
address = "192.168.0.40"
"#,
            )?;
            jail.set_env("SWEEP_DAQ_INSTRUMENT__ADDRESS", "10.0.0.5");

            let settings = Settings::load().expect("load");
            assert_eq!(settings.instrument.address, "10.0.0.5");
            Ok(())
        });
    }

    #[test]
    fn zero_poll_bound_is_rejected() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("sweep_daq.toml", "[timeouts]\ncompletion_max_polls = 0")?;
            assert!(Settings::load().is_err());
            Ok(())
        });
    }
}
