//! Outgoing mail with pluggable transports.
//!
//! `MailTransport` hides how a message leaves the process; the transport is
//! picked from `mail.transport` at startup.

mod log_transport;
mod transport;
mod verification;
mod webhook_transport;

pub use log_transport::LogTransport;
pub use transport::{MailMessage, MailTransport};
pub use verification::VerificationMailer;
pub use webhook_transport::WebhookTransport;

#[cfg(test)]
pub(crate) use transport::testing;

use std::sync::Arc;

use crate::config::MailConfig;
use crate::error::{AppError, AppResult};

/// Builds the transport named by the configuration.
pub fn build_transport(config: &MailConfig) -> AppResult<Arc<dyn MailTransport>> {
    match config.transport.to_lowercase().as_str() {
        "log" => Ok(Arc::new(LogTransport)),
        "webhook" => {
            let url = config
                .webhook_url
                .as_deref()
                .ok_or_else(|| AppError::Configuration {
                    key: "mail.webhook_url".to_string(),
                    source: anyhow::anyhow!("required by the webhook transport"),
                })?;
            Ok(Arc::new(WebhookTransport::new(url, config.timeout_seconds)?))
        }
        other => Err(AppError::Configuration {
            key: "mail.transport".to_string(),
            source: anyhow::anyhow!("unknown transport '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_log_transport() {
        let transport = build_transport(&MailConfig::default()).unwrap();
        assert_eq!(transport.name(), "log");
    }

    #[test]
    fn test_build_webhook_transport() {
        let config = MailConfig {
            transport: "webhook".to_string(),
            webhook_url: Some("http://127.0.0.1:9/send".to_string()),
            ..Default::default()
        };
        assert_eq!(build_transport(&config).unwrap().name(), "webhook");
    }

    #[test]
    fn test_webhook_without_url_is_rejected() {
        let config = MailConfig {
            transport: "webhook".to_string(),
            ..Default::default()
        };
        match build_transport(&config) {
            Err(AppError::Configuration { key, .. }) => assert_eq!(key, "mail.webhook_url"),
            Err(other) => panic!("Expected Configuration error, got {:?}", other),
            Ok(_) => panic!("Expected Configuration error, got a transport"),
        }
    }

    #[test]
    fn test_unknown_transport_is_rejected() {
        let config = MailConfig {
            transport: "smtp".to_string(),
            ..Default::default()
        };
        match build_transport(&config) {
            Err(AppError::Configuration { key, .. }) => assert_eq!(key, "mail.transport"),
            Err(other) => panic!("Expected Configuration error, got {:?}", other),
            Ok(_) => panic!("Expected Configuration error, got a transport"),
        }
    }
}
