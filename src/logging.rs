use std::fmt;

use tracing_subscriber::EnvFilter;

use crate::config::BrokerConfig;
use crate::correlation::CorrelationId;

/// Installs the global `tracing` subscriber.
///
/// Uses `RUST_LOG` when set, otherwise `config.log_filter`. Safe to call more
/// than once; later calls are no-ops.
pub fn init(config: &BrokerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let _ = if config.json_logs {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.with_target(true).try_init()
    };
}

/// A logger bound to one request's correlation id.
///
/// Every line carries `correlation_id`. Secrets passed as arguments still
/// print as `[REDACTED]` through their `Debug` and `Display` impls.
#[derive(Debug, Clone, Copy)]
pub struct RequestLog<'a> {
    correlation_id: &'a CorrelationId,
}

impl<'a> RequestLog<'a> {
    /// Creates a logger for `correlation_id`.
    pub fn new(correlation_id: &'a CorrelationId) -> Self {
        Self { correlation_id }
    }

    /// The bound correlation id.
    pub fn correlation_id(&self) -> &CorrelationId {
        self.correlation_id
    }

    /// Logs at info.
    ///
    /// ```no_run
    /// # use credential_broker::{CorrelationId, RequestLog, Secret};
    /// let id = CorrelationId::new("corr-1");
    /// let log = RequestLog::new(&id);
    /// let key = Secret::new("SERVICE_ROLE_FAKE".to_string());
    /// log.info(format_args!("using key {}", key)); // using key [REDACTED]
    /// ```
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(correlation_id = %self.correlation_id, "{}", args);
    }

    /// Logs at warn.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(correlation_id = %self.correlation_id, "{}", args);
    }

    /// Logs at error.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(correlation_id = %self.correlation_id, "{}", args);
    }

    /// Logs at debug.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(correlation_id = %self.correlation_id, "{}", args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let config = BrokerConfig::default();
        init(&config);
        init(&config);
    }

    #[test]
    fn request_log_keeps_correlation_id() {
        let id = CorrelationId::new("corr-9");
        let log = RequestLog::new(&id);
        assert_eq!(log.correlation_id().as_str(), "corr-9");
        log.debug(format_args!("stage {}", "AUTHORIZED"));
    }
}
