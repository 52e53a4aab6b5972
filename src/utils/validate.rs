//! Extractors that deserialize a request part and run `validator` rules on it.
//!
//! Failures are reported as [`AppError::ValidationErrors`] with fields
//! prefixed by where the value came from: `body`, `query` or `params`.

use crate::error::{AppError, AppResult, ValidationFieldError};
use axum::extract::{FromRequest, FromRequestParts, Json, Path, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

const BODY: &str = "body";
const QUERY: &str = "query";
const PARAMS: &str = "params";

/// `foo_bar` -> `fooBar`, matching the wire names of the DTOs.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Flattens validator output into sorted `location.field` entries.
pub fn field_errors(location: &str, errors: &ValidationErrors) -> Vec<ValidationFieldError> {
    let mut fields: Vec<ValidationFieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let path = format!("{}.{}", location, camel_case(&field));
            errs.iter()
                .map(|e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid ({})", e.code));
                    ValidationFieldError::new(path.clone(), message)
                })
                .collect::<Vec<_>>()
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

fn validate_at<T: Validate>(location: &str, value: &T) -> AppResult<()> {
    value.validate().map_err(|e| AppError::ValidationErrors {
        errors: field_errors(location, &e),
    })
}

fn rejected(location: &str, message: String) -> AppError {
    AppError::ValidationErrors {
        errors: vec![ValidationFieldError::new(location, message)],
    }
}

/// JSON body, validated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| rejected(BODY, e.body_text()))?;
        validate_at(BODY, &value)?;
        Ok(ValidatedJson(value))
    }
}

/// Query string, validated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> AppResult<Self> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| rejected(QUERY, e.body_text()))?;
        validate_at(QUERY, &value)?;
        Ok(ValidatedQuery(value))
    }
}

/// Path parameters, validated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> AppResult<Self> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| rejected(PARAMS, e.body_text()))?;
        validate_at(PARAMS, &value)?;
        Ok(ValidatedPath(value))
    }
}
