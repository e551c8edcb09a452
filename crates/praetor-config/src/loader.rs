//! Layered configuration loading.
//!
//! Layers apply in order, later ones overriding earlier ones:
//! 1. Defaults or a preset
//! 2. A TOML or JSON file (or string)
//! 3. `PREFIX__SECTION__KEY` environment variables

use std::env;
use std::fs;
use std::path::Path;

use praetor_telemetry::LogFormat;

use crate::{ConfigError, PraetorConfig};

/// Builds a [`PraetorConfig`] from layered sources.
///
/// # Example
///
/// ```no_run
/// use praetor_config::ConfigLoader;
///
/// # fn main() -> Result<(), praetor_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_production()
///     .with_optional_file("praetor.toml")?
///     .with_dotenv()
///     .with_env_prefix("PRAETOR")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: PraetorConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Create a loader seeded with [`PraetorConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to the default configuration.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = PraetorConfig::default();
        self
    }

    /// Start from [`PraetorConfig::development`].
    ///
    /// ```
    /// use praetor_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert!(config.router.expose_request_errors);
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = PraetorConfig::development();
        self
    }

    /// Start from [`PraetorConfig::production`].
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = PraetorConfig::production();
        self
    }

    /// Load a `.toml` or `.json` file, chosen by extension.
    ///
    /// The file replaces the configuration built so far; keys it omits take
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, has an
    /// unsupported extension, or does not parse.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

        self.config = parse(&content, format)?;
        Ok(self)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in `format` ("toml" or "json").
    ///
    /// ```
    /// use praetor_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[router]\nexpose_request_errors = true", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(config.router.expose_request_errors);
    /// assert!(!config.router.expose_response_errors);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the format is unknown or parsing fails.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, format)?;
        Ok(self)
    }

    /// Apply `PREFIX__SECTION__KEY` environment variables when loading,
    /// e.g. `PRAETOR__ROUTER__EXPOSE_REQUEST_ERRORS=true`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file into the process environment, if one exists.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        // Missing .env is fine
        let _ = dotenvy::dotenv();
        self
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override does not parse or the final
    /// configuration is invalid.
    pub fn load(mut self) -> Result<PraetorConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let marker = format!("{prefix}__");
            for (key, value) in env::vars().filter(|(k, _)| k.starts_with(&marker)) {
                self.apply_env_var(&key, &value, &prefix)?;
            }
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Return the configuration without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> PraetorConfig {
        self.config
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let path = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = path.split("__").collect();
        let flag = || parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"));
        let router = &mut self.config.router;
        let telemetry = &mut self.config.telemetry;

        match parts.as_slice() {
            ["ROUTER", "EXPOSE_REQUEST_ERRORS"] => router.expose_request_errors = flag()?,
            ["ROUTER", "EXPOSE_RESPONSE_ERRORS"] => router.expose_response_errors = flag()?,
            ["ROUTER", "VALIDATION_ERROR_HANDLER"] => router.validation_error_handler = flag()?,

            ["TELEMETRY", "SERVICE_NAME"] => telemetry.service_name = value.to_string(),

            ["TELEMETRY", "LOGGING", "ENABLED"] => telemetry.logging.enabled = flag()?,
            ["TELEMETRY", "LOGGING", "LEVEL"] => telemetry.logging.level = value.to_string(),
            ["TELEMETRY", "LOGGING", "FORMAT"] => {
                telemetry.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    "compact" => LogFormat::Compact,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json', 'pretty' or 'compact'",
                        ))
                    }
                };
            }
            ["TELEMETRY", "LOGGING", "ANSI_ENABLED"] => telemetry.logging.ansi_enabled = flag()?,
            ["TELEMETRY", "LOGGING", "INCLUDE_LOCATION"] => {
                telemetry.logging.include_location = flag()?;
            }

            ["TELEMETRY", "METRICS", "ENABLED"] => telemetry.metrics.enabled = flag()?,
            ["TELEMETRY", "METRICS", "ADDR"] => {
                telemetry.metrics.addr = (!value.is_empty()).then(|| value.to_string());
            }

            _ => {}
        }

        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<PraetorConfig, ConfigError> {
    match format.to_lowercase().as_str() {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
