//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.

use crate::config::error::ConfigError;
use crate::config::settings::{
    DatabaseConfig, FileSettings, JwtConfig, LoggerSettings, MailConfig, ServerConfig, Settings,
};

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

const VALID_MAIL_TRANSPORTS: &[&str] = &["log", "webhook"];

impl ServerConfig {
    /// Validate server configuration
    ///
    /// # Validation Rules
    /// - Port must be between 1 and 65535
    /// - Request and keep-alive timeouts must be greater than 0
    /// - At least one CORS origin must be listed
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        if self.keep_alive_timeout == 0 {
            return Err(ConfigError::validation(
                "server.keep_alive_timeout",
                "Keep-alive timeout must be greater than 0 seconds.",
            ));
        }

        if self.cors_origins.iter().all(|o| o.trim().is_empty()) {
            return Err(ConfigError::validation(
                "server.cors_origins",
                "At least one CORS origin is required. Use \"*\" to allow any origin.",
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    /// Validate database configuration
    ///
    /// # Validation Rules
    /// - URL must be a PostgreSQL connection string
    /// - Min and max connections must be greater than 0, min not above max
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::validation(
                "database.url",
                "Database URL is required. Please specify a valid database connection string.",
            ));
        }

        if !self.is_valid_database_url() {
            return Err(ConfigError::validation(
                "database.url",
                "Invalid database URL format. Expected format: postgres://[user:password@]host[:port]/database",
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }

        if self.min_connections == 0 {
            return Err(ConfigError::validation(
                "database.min_connections",
                "Min connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::ValidationError {
                field: "database.min_connections".to_string(),
                message: format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            });
        }

        Ok(())
    }

    fn is_valid_database_url(&self) -> bool {
        ["postgres://", "postgresql://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
    }
}

impl JwtConfig {
    /// Validates the JWT configuration; checked when the server starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::validation(
                "jwt.secret",
                "JWT secret cannot be empty",
            ));
        }

        if self.secret.len() < 32 {
            return Err(ConfigError::validation(
                "jwt.secret",
                "JWT secret should be at least 32 characters for security",
            ));
        }

        if self.access_token_expiration <= 0 {
            return Err(ConfigError::validation(
                "jwt.access_token_expiration",
                "Access token expiration must be positive",
            ));
        }

        if self.verification_token_expiration <= 0 {
            return Err(ConfigError::validation(
                "jwt.verification_token_expiration",
                "Verification token expiration must be positive",
            ));
        }

        Ok(())
    }
}

impl MailConfig {
    /// Validate mail configuration
    ///
    /// # Validation Rules
    /// - Transport must be one of: log, webhook
    /// - The webhook transport needs an http(s) `webhook_url`
    /// - Verification URL must not be empty and timeout must be positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        let transport = self.transport.to_lowercase();
        if !VALID_MAIL_TRANSPORTS.contains(&transport.as_str()) {
            return Err(ConfigError::ValidationError {
                field: "mail.transport".to_string(),
                message: format!(
                    "Invalid mail transport '{}'. Valid transports are: {}",
                    self.transport,
                    VALID_MAIL_TRANSPORTS.join(", ")
                ),
            });
        }

        if transport == "webhook" {
            let url = self.webhook_url.as_deref().unwrap_or_default();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::validation(
                    "mail.webhook_url",
                    "The webhook transport requires an http(s) webhook_url.",
                ));
            }
        }

        if self.from.trim().is_empty() {
            return Err(ConfigError::validation(
                "mail.from",
                "Sender address cannot be empty.",
            ));
        }

        if self.verification_url.trim().is_empty() {
            return Err(ConfigError::validation(
                "mail.verification_url",
                "Verification URL cannot be empty.",
            ));
        }

        if self.timeout_seconds == 0 {
            return Err(ConfigError::validation(
                "mail.timeout_seconds",
                "Mail timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        self.file.validate()?;

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings, returning the first failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.mail.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: ConfigError) -> String {
        match err {
            ConfigError::ValidationError { field, .. } => field,
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    fn valid_settings() -> Settings {
        Settings {
            database: DatabaseConfig {
                url: "postgres://localhost/school".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    // ========================================================================
    // ServerConfig
    // ========================================================================

    #[test]
    fn test_server_config_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_server_config_invalid_port_zero() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "server.port");
    }

    #[test]
    fn test_server_config_invalid_timeouts() {
        let config = ServerConfig {
            request_timeout: 0,
            ..Default::default()
        };
        assert_eq!(
            field_of(config.validate().unwrap_err()),
            "server.request_timeout"
        );

        let config = ServerConfig {
            keep_alive_timeout: 0,
            ..Default::default()
        };
        assert_eq!(
            field_of(config.validate().unwrap_err()),
            "server.keep_alive_timeout"
        );
    }

    #[test]
    fn test_server_config_requires_cors_origin() {
        let config = ServerConfig {
            cors_origins: vec![],
            ..Default::default()
        };
        assert_eq!(
            field_of(config.validate().unwrap_err()),
            "server.cors_origins"
        );
    }

    // ========================================================================
    // DatabaseConfig
    // ========================================================================

    #[test]
    fn test_database_config_empty_url() {
        let err = DatabaseConfig::default().validate().unwrap_err();
        assert_eq!(field_of(err), "database.url");
    }

    #[test]
    fn test_database_config_rejects_non_postgres_url() {
        for url in ["mysql://localhost/db", "sqlite://school.db", "invalid-url"] {
            let config = DatabaseConfig {
                url: url.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "URL should be rejected: {}", url);
        }
    }

    #[test]
    fn test_database_config_accepts_postgres_schemes() {
        for url in ["postgres://localhost/db", "postgresql://u:p@host:5432/db"] {
            let config = DatabaseConfig {
                url: url.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "URL should be valid: {}", url);
        }
    }

    #[test]
    fn test_database_config_min_exceeds_max() {
        let config = DatabaseConfig {
            url: "postgres://localhost/db".to_string(),
            max_connections: 2,
            min_connections: 5,
            ..Default::default()
        };
        assert_eq!(
            field_of(config.validate().unwrap_err()),
            "database.min_connections"
        );
    }

    // ========================================================================
    // JwtConfig
    // ========================================================================

    #[test]
    fn test_jwt_config_requires_long_secret() {
        let config = JwtConfig::default();
        assert_eq!(field_of(config.validate().unwrap_err()), "jwt.secret");

        let config = JwtConfig {
            secret: "short".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "jwt.secret");
    }

    #[test]
    fn test_jwt_config_valid() {
        let config = JwtConfig {
            secret: "a".repeat(32),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_jwt_config_rejects_non_positive_verification_expiry() {
        let config = JwtConfig {
            secret: "a".repeat(32),
            verification_token_expiration: 0,
            ..Default::default()
        };
        assert_eq!(
            field_of(config.validate().unwrap_err()),
            "jwt.verification_token_expiration"
        );
    }

    // ========================================================================
    // MailConfig
    // ========================================================================

    #[test]
    fn test_mail_config_default_is_valid() {
        assert!(MailConfig::default().validate().is_ok());
    }

    #[test]
    fn test_mail_config_unknown_transport() {
        let config = MailConfig {
            transport: "smtp".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "mail.transport");
    }

    #[test]
    fn test_mail_config_webhook_requires_url() {
        let config = MailConfig {
            transport: "webhook".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "mail.webhook_url");

        let config = MailConfig {
            transport: "webhook".to_string(),
            webhook_url: Some("https://relay.school.test/send".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    // ========================================================================
    // LoggerSettings
    // ========================================================================

    #[test]
    fn test_logger_settings_invalid_level() {
        let settings = LoggerSettings {
            level: "verbose".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(settings.validate().unwrap_err()), "logger.level");
    }

    #[test]
    fn test_logger_settings_file_enabled_empty_path() {
        let settings = LoggerSettings {
            file: FileSettings {
                enabled: true,
                path: "  ".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            field_of(settings.validate().unwrap_err()),
            "logger.file.path"
        );
    }

    #[test]
    fn test_logger_settings_file_disabled_empty_path_ok() {
        let settings = LoggerSettings {
            file: FileSettings {
                enabled: false,
                path: String::new(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }

    // ========================================================================
    // Settings
    // ========================================================================

    #[test]
    fn test_settings_valid() {
        assert!(valid_settings().validate().is_ok());
    }

    #[test]
    fn test_settings_reports_first_invalid_section() {
        let mut settings = valid_settings();
        settings.mail.transport = "pigeon".to_string();
        assert_eq!(field_of(settings.validate().unwrap_err()), "mail.transport");

        let mut settings = valid_settings();
        settings.server.port = 0;
        settings.mail.transport = "pigeon".to_string();
        assert_eq!(field_of(settings.validate().unwrap_err()), "server.port");
    }
}
