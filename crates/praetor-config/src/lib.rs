//! Typed configuration for Praetor.
//!
//! [`PraetorConfig`] carries the router-wide failure policy
//! ([`RouterOpts`](praetor_core::RouterOpts)) and the telemetry settings.
//! [`ConfigLoader`] layers defaults, a TOML or JSON file, and environment
//! variables; every section rejects unknown keys.
//!
//! # Configuration File Format
//!
//! ```toml
//! [router]
//! expose_request_errors = false
//! expose_response_errors = false
//! validation_error_handler = false
//!
//! [telemetry]
//! service_name = "orders"
//!
//! [telemetry.logging]
//! level = "info"
//! format = "json"
//!
//! [telemetry.metrics]
//! enabled = true
//! addr = "0.0.0.0:9464"
//! ```
//!
//! # Environment Variable Overrides
//!
//! With [`ConfigLoader::with_env_prefix`], variables named
//! `PREFIX__SECTION__KEY` override the loaded values:
//!
//! - `PRAETOR__ROUTER__EXPOSE_REQUEST_ERRORS=true`
//! - `PRAETOR__TELEMETRY__LOGGING__LEVEL=debug`
//! - `PRAETOR__TELEMETRY__METRICS__ADDR=0.0.0.0:9464`

#![doc(html_root_url = "https://docs.rs/praetor-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::PraetorConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LoggingSection, MetricsSection, TelemetrySection};
