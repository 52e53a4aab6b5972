//! Application state for Axum web framework.
//!
//! Contains shared services and resources that are accessible
//! across all request handlers.

use axum::extract::FromRef;

use crate::config::{JwtConfig, Settings};
use crate::db::AsyncDbPool;
use crate::error::AppResult;
use crate::repositories::Repositories;
use crate::services::{Services, VerificationMailer, mail};

/// Application state containing all shared services and resources.
///
/// Cloning is cheap since services hold their stores and transports in `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// All business logic services
    pub services: Services,
    /// JWT configuration for token generation and validation
    pub jwt_config: JwtConfig,
}

impl AppState {
    /// Wires PostgreSQL repositories and the configured mail transport.
    ///
    /// # Example
    /// ```ignore
    /// let pool = establish_async_connection_pool(&settings.database).await?;
    /// let state = AppState::new(pool, &settings)?;
    /// ```
    pub fn new(pool: AsyncDbPool, settings: &Settings) -> AppResult<Self> {
        let transport = mail::build_transport(&settings.mail)?;
        let mailer = VerificationMailer::new(transport, &settings.mail, &settings.jwt);
        tracing::info!(transport = mailer.transport_name(), "Mail transport ready");
        let services = Services::new(Repositories::new(pool), mailer);
        Ok(Self::from_services(services, settings.jwt.clone()))
    }

    pub fn from_services(services: Services, jwt_config: JwtConfig) -> Self {
        Self {
            services,
            jwt_config,
        }
    }
}

impl FromRef<AppState> for JwtConfig {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_config.clone()
    }
}
