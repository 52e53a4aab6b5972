//! Error response DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ValidationFieldError;

/// One entry of `errors`, e.g. `{"message": "body.email is Invalid email address"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ErrorItem {
    pub message: String,
}

impl From<&ValidationFieldError> for ErrorItem {
    fn from(error: &ValidationFieldError) -> Self {
        Self {
            message: error.to_string(),
        }
    }
}

/// Standard error response format.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "NOT_FOUND")]
    pub code: String,
    #[schema(example = "Student not found")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    /// Creates a new error response with code and message.
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            errors: None,
            details: None,
            request_id: None,
        }
    }

    /// The 400 body listing every offending field.
    pub fn validation(errors: &[ValidationFieldError]) -> Self {
        Self::new("VALIDATION_ERROR", "Validation Error")
            .with_errors(errors.iter().map(ErrorItem::from).collect())
    }

    pub fn with_errors(mut self, errors: Vec<ErrorItem>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Adds details to the error response.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Adds request ID to the error response for correlation.
    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }
}
