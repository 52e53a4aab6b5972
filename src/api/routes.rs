//! Router configuration for the API.
//!
//! This module provides centralized route registration and middleware
//! configuration for the application.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method, StatusCode, header};
use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{
    REQUEST_ID_HEADER, global_error_handler, logging_middleware, optional_auth_middleware,
    request_id_middleware,
};
use crate::config::ServerConfig;
use crate::state::AppState;

pub const API_PREFIX: &str = "/api/v1";

/// CORS for the configured origins; `*` allows any origin without credentials.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .allow_credentials(true)
}

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Layers added last run first:
/// 1. CORS, compression and the request timeout
/// 2. Request ID: generates or propagates `x-request-id`
/// 3. Logging: one `http_request` span per request
/// 4. Error fallback: non-JSON error responses get the standard body
/// 5. Optional bearer authentication
///
/// # Routes
/// - `/api/v1/students`, `/api/v1/classes`, `/api/v1/sections`
/// - `/health`, `/health/ready`, `/health/live`
/// - `/swagger-ui`, `/api-docs/openapi.json`
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let api = OpenApiRouter::new()
        .merge(handlers::students::student_routes())
        .merge(handlers::classes::class_routes());

    let (router, openapi) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(handlers::health::health_routes())
        .nest(API_PREFIX, api)
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ))
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(server.request_timeout),
        ))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&server.cors_origins))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JwtConfig, MailConfig};
    use crate::models::Role;
    use crate::repositories::Repositories;
    use crate::repositories::memory::InMemoryStore;
    use crate::services::mail::testing::RecordingTransport;
    use crate::services::{Services, VerificationMailer};
    use crate::utils::jwt::generate_access_token;
    use axum::body::Body;
    use axum::extract::Request;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    const SECRET: &str = "router_test_secret_key_0123456789abc";

    struct TestApp {
        router: Router,
        store: Arc<InMemoryStore>,
        mail: Arc<RecordingTransport>,
    }

    fn test_app() -> TestApp {
        let store = Arc::new(InMemoryStore::new());
        let mail = Arc::new(RecordingTransport::default());
        let jwt = JwtConfig {
            secret: SECRET.to_string(),
            ..Default::default()
        };
        let mailer = VerificationMailer::new(mail.clone(), &MailConfig::default(), &jwt);
        let services = Services::new(Repositories::in_memory(store.clone()), mailer);
        let state = AppState::from_services(services, jwt);

        TestApp {
            router: create_router(state, &ServerConfig::default()),
            store,
            mail,
        }
    }

    impl TestApp {
        async fn send(&self, request: Request) -> (StatusCode, Value) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, body)
        }

        async fn get(&self, uri: &str) -> (StatusCode, Value) {
            self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
        }

        async fn json(&self, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
            self.send(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
        }
    }

    fn asha() -> Value {
        json!({
            "name": "Asha Rao",
            "email": "asha@school.test",
            "gender": "Female",
            "dob": "2012-06-01",
            "class": "Class 1",
            "section": "A",
            "roll": 3,
            "systemAccess": true
        })
    }

    #[tokio::test]
    async fn test_create_read_delete_lifecycle() {
        let app = test_app();

        let (status, body) = app.json(Method::POST, "/api/v1/students", asha()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["message"],
            "Student added and verification email sent successfully."
        );
        assert_eq!(app.mail.sent().len(), 1);

        let (status, body) = app.get("/api/v1/students?page=1&limit=10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["meta"]["totalPages"], 1);
        let id = body["data"][0]["id"].as_i64().unwrap();

        let (status, body) = app.get(&format!("/api/v1/students/{}", id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["systemAccess"], true);
        assert_eq!(body["class"], "Class 1");

        let (status, body) = app
            .send(
                Request::builder()
                    .method(Method::DELETE)
                    .uri(format!("/api/v1/students/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Student deleted successfully");

        let (status, body) = app.get(&format!("/api/v1/students/{}", id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["systemAccess"], false);
    }

    #[tokio::test]
    async fn test_create_with_mail_failure_still_succeeds() {
        let app = test_app();
        app.mail
            .fail
            .store(true, std::sync::atomic::Ordering::SeqCst);

        let (status, body) = app.json(Method::POST, "/api/v1/students", asha()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["message"],
            "Student added, but failed to send verification email."
        );

        let (_, body) = app.get("/api/v1/students").await;
        assert_eq!(body["meta"]["total"], 1);
    }

    #[tokio::test]
    async fn test_list_filters_by_class_and_section_query() {
        let app = test_app();
        let placements = [("Class 1", "A"), ("Class 1", "B"), ("Class 2", "A")];
        for (i, (class, section)) in placements.iter().enumerate() {
            let mut body = asha();
            body["email"] = json!(format!("student{}@school.test", i));
            body["class"] = json!(class);
            body["section"] = json!(section);
            let (status, _) = app.json(Method::POST, "/api/v1/students", body).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = app.get("/api/v1/students?class=Class%201&section=A").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["class"], "Class 1");
        assert_eq!(body["data"][0]["section"], "A");

        let (_, body) = app.get("/api/v1/students?class=Class%201").await;
        assert_eq!(body["meta"]["total"], 2);

        let (_, body) = app.get("/api/v1/students?section=A").await;
        assert_eq!(body["meta"]["total"], 2);
    }

    #[tokio::test]
    async fn test_extreme_pagination_values_do_not_fail() {
        let app = test_app();
        app.json(Method::POST, "/api/v1/students", asha()).await;

        let (status, body) = app
            .get(&format!("/api/v1/students?limit={}", i64::MAX))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["meta"]["totalPages"], 1);

        let (status, body) = app
            .get(&format!("/api/v1/students?page={}", i64::MAX))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_body_lists_every_field() {
        let app = test_app();
        let (status, body) = app.json(Method::POST, "/api/v1/students", json!({})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "Validation Error");
        assert_eq!(body["errors"].as_array().unwrap().len(), 4);
        assert!(body["request_id"].is_string());
        assert_eq!(app.store.insert_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_overlong_phone_is_rejected_before_insert() {
        let app = test_app();
        let mut body = asha();
        body["phone"] = json!("9".repeat(21));
        let (status, body) = app.json(Method::POST, "/api/v1/students", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["errors"][0]["message"],
            "body.phone is Phone must be at most 20 characters"
        );
        assert_eq!(app.store.insert_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_id_is_rejected() {
        let app = test_app();
        let (status, body) = app.get("/api/v1/students/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["message"], "params.id is Invalid ID");
    }

    #[tokio::test]
    async fn test_invalid_pagination_is_rejected() {
        let app = test_app();
        let (status, body) = app.get("/api/v1/students?page=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["errors"][0]["message"],
            "query.page is Page must be a positive integer"
        );
    }

    #[tokio::test]
    async fn test_unknown_student_is_not_found() {
        let app = test_app();
        let (status, body) = app.get("/api/v1/students/99").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Student not found");

        let (status, _) = app
            .json(Method::POST, "/api/v1/students/99/status", json!({"status": true}))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_status_change_records_reviewer_from_token() {
        let app = test_app();
        let reviewer = app.store.add_account("Admin", "admin@school.test", Role::Admin);
        app.json(Method::POST, "/api/v1/students", asha()).await;
        let student_id = reviewer + 1;

        let token =
            generate_access_token(reviewer, "admin@school.test".to_string(), SECRET, 1).unwrap();
        let (status, body) = app
            .send(
                Request::builder()
                    .method(Method::POST)
                    .uri(format!("/api/v1/students/{}/status", student_id))
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::from(json!({"status": false}).to_string()))
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Student status changed successfully");

        let (_, body) = app.get(&format!("/api/v1/students/{}", student_id)).await;
        assert_eq!(body["systemAccess"], false);
        assert_eq!(body["reviewerId"], reviewer);
    }

    #[tokio::test]
    async fn test_status_body_must_be_boolean() {
        let app = test_app();
        app.json(Method::POST, "/api/v1/students", asha()).await;
        let (status, body) = app
            .json(Method::POST, "/api/v1/students/1/status", json!({"status": "yes"}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_update_unknown_student_is_internal() {
        let app = test_app();
        let (status, body) = app
            .json(Method::PUT, "/api/v1/students/5", json!({"roll": 2}))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Student not found");
    }

    #[tokio::test]
    async fn test_lookups() {
        let app = test_app();
        let (status, body) = app.get("/api/v1/classes").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["classes"][0]["name"], "Class 1");

        let (status, body) = app.get("/api/v1/sections").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sections"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_health_and_docs() {
        let app = test_app();
        assert_eq!(app.get("/health/live").await.0, StatusCode::OK);
        assert_eq!(app.get("/health/ready").await.0, StatusCode::OK);

        let (status, body) = app.get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = app.get("/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/v1/students"].is_object());
        assert!(body["paths"]["/api/v1/students/{id}/status"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_route_gets_standard_error_body() {
        let app = test_app();
        let (status, body) = app.get("/api/v1/nothing-here").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
        assert!(body["request_id"].is_string());
    }

    #[test]
    fn test_cors_layer_accepts_wildcard_and_lists() {
        let _ = cors_layer(&["*".to_string()]);
        let _ = cors_layer(&["http://localhost:5173".to_string()]);
    }
}
