//! # Praetor Telemetry
//!
//! Observability for the Praetor validation layer:
//!
//! - [`logging`] - Structured logging through `tracing-subscriber`
//! - [`metrics`] - Validation counters and timings exported to Prometheus
//!
//! ## Example
//!
//! ```rust,ignore
//! use praetor_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig {
//!     service_name: "orders".to_string(),
//!     ..TelemetryConfig::default()
//! };
//! init_telemetry(&config)?;
//! ```

#![doc(html_root_url = "https://docs.rs/praetor-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{fields, init_logging, LogConfig, LogFormat};
pub use self::metrics::{init_metrics, render_metrics, MetricsConfig, RequestOutcome};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Combined telemetry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to the startup log line.
    pub service_name: String,
    /// Logging configuration.
    pub logging: LogConfig,
    /// Metrics configuration.
    pub metrics: MetricsConfig,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "praetor".to_string(),
            logging: LogConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to initialize.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;

    tracing::info!(
        service.name = %config.service_name,
        metrics = config.metrics.enabled,
        "telemetry initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "praetor");
        assert!(config.logging.enabled);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_init_with_everything_disabled() {
        let config = TelemetryConfig {
            logging: LogConfig {
                enabled: false,
                ..LogConfig::default()
            },
            ..TelemetryConfig::default()
        };
        assert!(init_telemetry(&config).is_ok());
    }
}
