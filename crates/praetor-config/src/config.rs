//! Root configuration type.

use crate::schema::{LoggingSection, TelemetrySection};
use crate::ConfigError;
use praetor_core::RouterOpts;
use praetor_telemetry::logging::create_env_filter;
use praetor_telemetry::LogFormat;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Complete Praetor configuration.
///
/// `router` holds the process-wide [`RouterOpts`] a
/// `praetor_middleware::Router` is built with; `telemetry` feeds
/// `praetor_telemetry::init_telemetry`.
///
/// # Example
///
/// ```
/// use praetor_config::PraetorConfig;
///
/// let config = PraetorConfig::development();
/// assert!(config.router.expose_request_errors);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PraetorConfig {
    /// How validation failures are surfaced.
    #[serde(default)]
    pub router: RouterOpts,

    /// Logging and metrics.
    #[serde(default)]
    pub telemetry: TelemetrySection,
}

impl PraetorConfig {
    /// Errors are sent to clients and logs are pretty-printed at debug level.
    #[must_use]
    pub fn development() -> Self {
        Self {
            router: RouterOpts::exposed(),
            telemetry: TelemetrySection {
                logging: LoggingSection {
                    level: "debug".to_string(),
                    format: LogFormat::Pretty,
                    ansi_enabled: true,
                    include_location: true,
                    ..LoggingSection::default()
                },
                ..TelemetrySection::default()
            },
        }
    }

    /// Errors stay on the server, logs are JSON and metrics are on.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.telemetry.metrics.enabled = true;
        config
    }

    /// Checks values that deserialize fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an unparseable log filter, a
    /// metrics address that is not a socket address, or an empty service
    /// name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telemetry.service_name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "telemetry.service_name",
                "must not be empty",
            ));
        }

        if let Err(e) = create_env_filter(&self.telemetry.logging.level) {
            return Err(ConfigError::invalid_value(
                "telemetry.logging.level",
                e.to_string(),
            ));
        }

        if let Some(addr) = &self.telemetry.metrics.addr {
            addr.parse::<SocketAddr>().map_err(|e| {
                ConfigError::invalid_value("telemetry.metrics.addr", format!("{addr}: {e}"))
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hides_errors() {
        let config = PraetorConfig::default();
        assert_eq!(config.router, RouterOpts::default());
        assert!(!config.telemetry.metrics.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_development_preset() {
        let config = PraetorConfig::development();
        assert!(config.router.expose_request_errors);
        assert!(config.router.expose_response_errors);
        assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);
        assert_eq!(config.telemetry.logging.level, "debug");
    }

    #[test]
    fn test_production_preset() {
        let config = PraetorConfig::production();
        assert!(!config.router.expose_request_errors);
        assert!(!config.router.expose_response_errors);
        assert_eq!(config.telemetry.logging.format, LogFormat::Json);
        assert!(config.telemetry.metrics.enabled);
    }

    #[test]
    fn test_validate_rejects_bad_metrics_addr() {
        let mut config = PraetorConfig::default();
        config.telemetry.metrics.addr = Some("localhost".to_string());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "telemetry.metrics.addr"));
    }

    #[test]
    fn test_validate_rejects_bad_log_level() {
        let mut config = PraetorConfig::default();
        config.telemetry.logging.level = "praetor=chatty".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_service_name() {
        let mut config = PraetorConfig::default();
        config.telemetry.service_name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_router_key_is_rejected() {
        let result: Result<PraetorConfig, _> = toml::from_str(
            r"
            [router]
            expose_everything = true
            ",
        );
        assert!(result.is_err());
    }
}
