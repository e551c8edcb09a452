//! Configuration sections.
//!
//! Every section rejects unknown keys and fills missing ones from its
//! defaults, so a file only needs to name what it changes.

use praetor_telemetry::{LogConfig, LogFormat, MetricsConfig, TelemetryConfig};
use serde::{Deserialize, Serialize};

/// Logging section.
///
/// ```
/// use praetor_config::LoggingSection;
/// use praetor_telemetry::LogFormat;
///
/// let section: LoggingSection = toml::from_str(r#"format = "pretty""#).unwrap();
/// assert_eq!(section.format, LogFormat::Pretty);
/// assert_eq!(section.level, "info");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directives (e.g. "info" or "warn,praetor_middleware=debug").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

impl From<&LoggingSection> for LogConfig {
    fn from(section: &LoggingSection) -> Self {
        Self {
            enabled: section.enabled,
            level: section.level.clone(),
            format: section.format,
            ansi: section.ansi_enabled,
            file_line_info: section.include_location,
            include_target: true,
        }
    }
}

/// Metrics section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Enable the Prometheus recorder.
    #[serde(default)]
    pub enabled: bool,

    /// Scrape endpoint bind address. Omit to render metrics in-process.
    #[serde(default)]
    pub addr: Option<String>,
}

impl From<&MetricsSection> for MetricsConfig {
    fn from(section: &MetricsSection) -> Self {
        Self {
            enabled: section.enabled,
            addr: section.addr.clone(),
        }
    }
}

/// Telemetry section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySection {
    /// Service name attached to the startup log line.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            logging: LoggingSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl TelemetrySection {
    /// Converts the section into the telemetry crate's runtime config.
    #[must_use]
    pub fn to_telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig {
            service_name: self.service_name.clone(),
            logging: LogConfig::from(&self.logging),
            metrics: MetricsConfig::from(&self.metrics),
        }
    }
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "praetor".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_defaults() {
        let section = LoggingSection::default();
        assert!(section.enabled);
        assert_eq!(section.level, "info");
        assert_eq!(section.format, LogFormat::Json);
    }

    #[test]
    fn test_empty_sections_deserialize_to_defaults() {
        let section: TelemetrySection = toml::from_str("").unwrap();
        assert_eq!(section, TelemetrySection::default());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result: Result<MetricsSection, _> = toml::from_str("port = 9090");
        assert!(result.is_err());
    }

    #[test]
    fn test_to_telemetry_config() {
        let section = TelemetrySection {
            service_name: "orders".to_string(),
            logging: LoggingSection {
                level: "debug".to_string(),
                ansi_enabled: true,
                include_location: true,
                ..LoggingSection::default()
            },
            metrics: MetricsSection {
                enabled: true,
                addr: Some("127.0.0.1:9090".to_string()),
            },
        };

        let config = section.to_telemetry_config();
        assert_eq!(config.service_name, "orders");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.ansi);
        assert!(config.logging.file_line_info);
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.addr.as_deref(), Some("127.0.0.1:9090"));
    }
}
