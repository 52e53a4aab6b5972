//! Bearer token authentication middleware.
//!
//! Decodes an optional `Authorization: Bearer <token>` header into an
//! [`AuthUser`] request extension. Handlers use it as reviewer context.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};
use crate::utils::jwt::{Claims, validate_access_token};

/// Authenticated caller, extracted in handlers with `Option<Extension<AuthUser>>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
}

impl TryFrom<Claims> for AuthUser {
    type Error = AppError;

    fn try_from(claims: Claims) -> AppResult<Self> {
        Ok(Self {
            user_id: claims.user_id()?,
            email: claims.email,
        })
    }
}

fn bearer_token(value: &str) -> AppResult<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized {
            message: "Invalid authorization header format. Expected: Bearer <token>".to_string(),
        })
}

/// Anonymous requests pass through; a header that is present but malformed,
/// expired or signed with another key is rejected with 401.
pub async fn optional_auth_middleware(
    State(jwt): State<JwtConfig>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    if let Some(value) = request.headers().get(header::AUTHORIZATION) {
        let value = value.to_str().map_err(|_| AppError::Unauthorized {
            message: "Invalid authorization header".to_string(),
        })?;
        let claims = validate_access_token(bearer_token(value)?, &jwt.secret)?;
        let user = AuthUser::try_from(claims)?;

        tracing::debug!(user_id = user.user_id, "Request authenticated");
        request.extensions_mut().insert(user);
    }

    Ok(next.run(request).await)
}
