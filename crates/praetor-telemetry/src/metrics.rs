//! Prometheus metrics for Praetor.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `praetor_validation_outcomes_total` | Counter | `outcome` | Validated requests by outcome |
//! | `praetor_validation_failures_total` | Counter | `stage`, `part` | Failed parts and responses |
//! | `praetor_validation_duration_seconds` | Histogram | - | Time spent validating request parts |
//!
//! Recording is a no-op until a recorder is installed with [`init_metrics`].

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Outcome counter name.
pub const OUTCOMES_TOTAL: &str = "praetor_validation_outcomes_total";

/// Failure counter name.
pub const FAILURES_TOTAL: &str = "praetor_validation_failures_total";

/// Validation duration histogram name.
pub const DURATION_SECONDS: &str = "praetor_validation_duration_seconds";

/// Metrics configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Address to serve the scrape endpoint on. Without one, metrics are
    /// only available through [`render_metrics`].
    pub addr: Option<String>,
}

/// How request validation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
    /// Every part passed.
    Valid,
    /// Parts failed and the request continued with the record attached.
    PassedThrough,
    /// Parts failed and the errors were sent to the client.
    Exposed,
    /// Parts failed and the request was aborted.
    Aborted,
}

impl RequestOutcome {
    /// Returns the label value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::PassedThrough => "passed_through",
            Self::Exposed => "exposed",
            Self::Aborted => "aborted",
        }
    }
}

/// Installs the Prometheus recorder.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidAddress` if `addr` does not parse, or
/// `TelemetryError::MetricsInit` if a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let builder = PrometheusBuilder::new();
    match &config.addr {
        Some(addr) => {
            let addr: SocketAddr = addr
                .parse()
                .map_err(|e| TelemetryError::InvalidAddress(format!("{addr}: {e}")))?;
            builder
                .with_http_listener(addr)
                .install()
                .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
        }
        None => {
            let handle = builder
                .install_recorder()
                .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
            let _ = METRICS_HANDLE.set(handle);
        }
    }

    describe_metrics();
    Ok(())
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` unless [`init_metrics`] installed a recorder without a
/// listen address.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn describe_metrics() {
    describe_counter!(OUTCOMES_TOTAL, "Validated requests by outcome");
    describe_counter!(
        FAILURES_TOTAL,
        "Failed request parts and responses by stage and part"
    );
    describe_histogram!(
        DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Time spent validating request parts"
    );
}

/// Records how request validation ended.
pub fn record_request_outcome(outcome: RequestOutcome) {
    counter!(OUTCOMES_TOTAL, "outcome" => outcome.as_str()).increment(1);
}

/// Records one failed request part.
pub fn record_part_failure(part: &'static str) {
    counter!(FAILURES_TOTAL, "stage" => "request", "part" => part).increment(1);
}

/// Records a failed response.
pub fn record_response_failure() {
    counter!(FAILURES_TOTAL, "stage" => "response", "part" => "response").increment(1);
}

/// Records how long the part validations took.
pub fn record_validation_duration(seconds: f64) {
    histogram!(DURATION_SECONDS).record(seconds);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_disabled() {
        let config = MetricsConfig::default();
        assert!(!config.enabled);
        assert!(config.addr.is_none());
        assert!(init_metrics(&config).is_ok());
    }

    #[test]
    fn test_invalid_address() {
        let config = MetricsConfig {
            enabled: true,
            addr: Some("not-an-address".to_string()),
        };
        assert!(matches!(
            init_metrics(&config),
            Err(TelemetryError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(RequestOutcome::Valid.as_str(), "valid");
        assert_eq!(RequestOutcome::PassedThrough.as_str(), "passed_through");
        assert_eq!(RequestOutcome::Exposed.as_str(), "exposed");
        assert_eq!(RequestOutcome::Aborted.as_str(), "aborted");
    }

    #[test]
    fn test_record_functions_dont_panic() {
        record_request_outcome(RequestOutcome::Aborted);
        record_part_failure("body");
        record_response_failure();
        record_validation_duration(0.002);
    }
}
