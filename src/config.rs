//! Broker configuration.

use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable for [`BrokerConfig::max_identifier_len`].
pub const ENV_MAX_IDENTIFIER_LEN: &str = "BROKER_MAX_IDENTIFIER_LEN";
/// Environment variable for [`BrokerConfig::generate_correlation_ids`].
pub const ENV_GENERATE_CORRELATION_IDS: &str = "BROKER_GENERATE_CORRELATION_IDS";
/// Environment variable for [`BrokerConfig::redact_audit_metadata`].
pub const ENV_REDACT_AUDIT_METADATA: &str = "BROKER_REDACT_AUDIT_METADATA";
/// Environment variable for [`BrokerConfig::json_logs`].
pub const ENV_JSON_LOGS: &str = "BROKER_JSON_LOGS";
/// Environment variable for [`BrokerConfig::log_filter`].
pub const ENV_LOG_FILTER: &str = "RUST_LOG";

/// A configuration value could not be used.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The variable is set but does not parse.
    #[error("{name}: cannot parse '{value}'")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
    },

    /// The value parses but is out of range.
    #[error("{name}: {message}")]
    OutOfRange {
        /// Variable name.
        name: &'static str,
        /// What is wrong.
        message: &'static str,
    },
}

/// Process-level settings for the broker and its bindings.
///
/// Deserializable, so embedders can load it from a file; every field has a
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrokerConfig {
    /// Longest accepted tenant, user, provider or token-ref identifier.
    pub max_identifier_len: usize,
    /// Generate a correlation id when the caller sent none. When off, a
    /// request without one is rejected.
    pub generate_correlation_ids: bool,
    /// Run audit metadata through the secret redactor before logging.
    pub redact_audit_metadata: bool,
    /// Emit logs as JSON lines.
    pub json_logs: bool,
    /// `EnvFilter` directive.
    pub log_filter: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            max_identifier_len: 128,
            generate_correlation_ids: true,
            redact_audit_metadata: true,
            json_logs: false,
            log_filter: "info".to_string(),
        }
    }
}

impl BrokerConfig {
    /// Reads the configuration from the process environment.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if a variable is set to an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = parse(&lookup, ENV_MAX_IDENTIFIER_LEN)? {
            config.max_identifier_len = v;
        }
        if let Some(v) = parse_flag(&lookup, ENV_GENERATE_CORRELATION_IDS)? {
            config.generate_correlation_ids = v;
        }
        if let Some(v) = parse_flag(&lookup, ENV_REDACT_AUDIT_METADATA)? {
            config.redact_audit_metadata = v;
        }
        if let Some(v) = parse_flag(&lookup, ENV_JSON_LOGS)? {
            config.json_logs = v;
        }
        if let Some(v) = lookup(ENV_LOG_FILTER).filter(|v| !v.trim().is_empty()) {
            config.log_filter = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::OutOfRange`] for a zero identifier length.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_identifier_len == 0 {
            return Err(ConfigError::OutOfRange {
                name: ENV_MAX_IDENTIFIER_LEN,
                message: "must be greater than 0",
            });
        }
        Ok(())
    }
}

fn parse<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => {
            let parsed = raw.trim().parse::<T>();
            parsed
                .map(Some)
                .map_err(|_| ConfigError::Invalid { name, value: raw })
        }
    }
}

fn parse_flag<F>(lookup: &F, name: &'static str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::Invalid { name, value: raw }),
        },
    }
}
