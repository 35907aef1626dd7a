//! Configuration module for the fulfillment engine.
//!
//! Loads YAML configuration with `${VAR}` / `${VAR:-default}` environment
//! interpolation, fills every omitted field with its default, and validates
//! the result before anything starts.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fulfillment_engine::config::load_config_or_default;
//!
//! let config = load_config_or_default(None)?;
//! println!("HTTP port: {}", config.server.http_port);
//! ```

mod observability;
mod payment;
mod scheduler;
mod server;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use observability::{LoggingConfig, ObservabilityConfig};
pub use payment::PaymentConfig;
pub use scheduler::SchedulerConfig;
pub use server::ServerConfig;

use crate::domain::policy::BusinessPolicy;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "FULFILLMENT_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Business policy table.
    #[serde(default)]
    pub policy: BusinessPolicy,
    /// Auto-cancel scheduler.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Payment gateway settings.
    #[serde(default)]
    pub payment: PaymentConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Resolve the config path: explicit argument, then `FULFILLMENT_CONFIG`,
/// then `config.yaml`.
#[must_use]
pub fn config_path(path: Option<&str>) -> String {
    path.map(str::to_string)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().filter(|p| !p.is_empty()))
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = config_path(path);
    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    load_config_from_string(&contents)
}

/// Like [`load_config`], but a missing file yields the defaults.
///
/// # Errors
///
/// Returns a `ConfigError` if an existing file cannot be read, parsed, or
/// validated.
pub fn load_config_or_default(path: Option<&str>) -> Result<Config, ConfigError> {
    let resolved = config_path(path);
    if !Path::new(&resolved).exists() {
        tracing::warn!(path = %resolved, "Config file not found, using defaults");
        let config = Config::default();
        validate_config(&config)?;
        return Ok(config);
    }
    load_config(Some(&resolved))
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.http_port == 0 {
        return Err(ConfigError::ValidationError(
            "server.http_port must be non-zero".to_string(),
        ));
    }

    config
        .policy
        .validate()
        .map_err(|e| ConfigError::ValidationError(format!("policy: {e}")))?;

    let rate = config.payment.simulated_failure_rate;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::ValidationError(
            "payment.simulated_failure_rate must be between 0.0 and 1.0".to_string(),
        ));
    }

    if config.payment.refund_timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "payment.refund_timeout_ms must be positive".to_string(),
        ));
    }

    let valid_formats = ["json", "pretty"];
    if !valid_formats.contains(&config.observability.logging.format.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {valid_formats:?}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::Money;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.http_port, 8080);
        assert_eq!(config.policy.auto_cancel_hours, 24);
        assert_eq!(config.policy.max_refund_days, 30);
        assert!(config.scheduler.enabled);
        assert_eq!(config.payment.max_conflict_retries, 3);
        assert_eq!(config.observability.logging.format, "json");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_empty_config_uses_defaults() {
        let config = match load_config_from_string("{}") {
            Ok(c) => c,
            Err(e) => panic!("should load empty config: {e}"),
        };
        assert_eq!(config.policy.tax_rate, dec!(0.08));
        assert_eq!(config.policy.default_shipping_cost, Money::from_minor(500));
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        let input = "level: ${FULFILLMENT_CONFIG_TEST_NONEXISTENT_VAR:-debug}";
        assert_eq!(interpolate_env_vars(input), "level: debug");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)] // ${...} is env var syntax, not format args
    fn test_env_var_with_default_uses_existing() {
        let input = "path: ${PATH:-default}";
        let result = interpolate_env_vars(input);

        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn test_env_var_without_default_becomes_empty() {
        let input = "secret: ${FULFILLMENT_CONFIG_TEST_UNLIKELY_TO_EXIST}";
        assert_eq!(interpolate_env_vars(input), "secret: ");
    }

    #[test]
    fn test_validation_rejects_inverted_bounds() {
        let yaml = r"
policy:
  min_order_amount: 5000
  max_order_amount: 100
";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for min > max");
        };
        assert!(err.to_string().contains("policy"));
    }

    #[test]
    fn test_validation_rejects_unknown_log_format() {
        let yaml = r"
observability:
  logging:
    format: xml
";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for log format");
        };
        assert!(err.to_string().contains("format"));
    }

    #[test]
    fn test_validation_rejects_failure_rate_above_one() {
        let yaml = r"
payment:
  simulated_failure_rate: 1.5
";
        assert!(load_config_from_string(yaml).is_err());
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
server:
  http_port: 9090
  bind_address: "127.0.0.1"

policy:
  version: 7
  min_order_amount: 1000
  max_order_amount: 500000
  default_shipping_cost: 650
  express_shipping_cost: 1800
  tax_rate: "0.0725"
  auto_cancel_hours: 48
  max_refund_days: 14
  scheduler_interval_secs: 60

scheduler:
  enabled: false

payment:
  refund_timeout_ms: 2500
  max_conflict_retries: 5

observability:
  logging:
    level: "debug"
    format: "pretty"
"#;

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load full config: {e}"),
        };

        assert_eq!(config.server.socket_address(), "127.0.0.1:9090");
        assert_eq!(config.policy.version, 7);
        assert_eq!(config.policy.tax_rate, dec!(0.0725));
        assert_eq!(config.policy.express_shipping_cost, Money::from_minor(1800));
        assert_eq!(config.policy.max_refund_days, 14);
        assert!(!config.scheduler.enabled);
        assert_eq!(
            config.payment.refund_timeout(),
            std::time::Duration::from_millis(2500)
        );
        assert_eq!(config.payment.max_conflict_retries, 5);
        assert_eq!(config.observability.logging.level, "debug");
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "policy:\n  auto_cancel_hours: 12").unwrap();

        let config = load_config(file.path().to_str()).unwrap();
        assert_eq!(config.policy.auto_cancel_hours, 12);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");

        let config = load_config_or_default(missing.to_str()).unwrap();
        assert_eq!(config.server.http_port, 8080);

        assert!(matches!(
            load_config(missing.to_str()),
            Err(ConfigError::ReadError { .. })
        ));
    }
}
