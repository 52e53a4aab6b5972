//! Mail relay over HTTP.
//!
//! POSTs each message as JSON to the configured relay endpoint.

use super::transport::{MailMessage, MailTransport};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use std::time::{Duration, Instant};

pub struct WebhookTransport {
    client: reqwest::Client,
    url: String,
}

impl WebhookTransport {
    /// Creates a transport posting to `url` with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout_seconds: u64) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .connect_timeout(Duration::from_secs(timeout_seconds.min(10)))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::internal_with("Failed to build mail relay client", e))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl MailTransport for WebhookTransport {
    async fn deliver(&self, message: &MailMessage) -> AppResult<()> {
        let start = Instant::now();

        let response = self
            .client
            .post(&self.url)
            .json(message)
            .send()
            .await
            .map_err(|e| AppError::internal_with("Mail relay request failed", e))?;

        let status = response.status();
        let duration_ms = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                transport = self.name(),
                status = status.as_u16(),
                duration_ms,
                response = %body,
                "Mail relay rejected message"
            );
            return Err(AppError::internal(format!(
                "Mail relay responded with {}",
                status
            )));
        }

        tracing::debug!(
            transport = self.name(),
            status = status.as_u16(),
            duration_ms,
            to = %message.to,
            "Mail handed to relay"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};

    type Received = Arc<Mutex<Vec<serde_json::Value>>>;

    async fn spawn_relay(status: StatusCode) -> (String, Received) {
        let received: Received = Arc::default();
        let store = received.clone();
        let app = Router::new().route(
            "/send",
            post(move |Json(body): Json<serde_json::Value>| {
                let store = store.clone();
                async move {
                    store.lock().unwrap().push(body);
                    status
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/send", addr), received)
    }

    fn message() -> MailMessage {
        MailMessage {
            from: "no-reply@school.test".to_string(),
            to: "asha@school.test".to_string(),
            subject: "Verify your email address".to_string(),
            body: "link".to_string(),
        }
    }

    #[tokio::test]
    async fn test_delivers_json_to_relay() {
        let (url, received) = spawn_relay(StatusCode::ACCEPTED).await;
        let transport = WebhookTransport::new(url, 5).unwrap();

        transport.deliver(&message()).await.unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["to"], "asha@school.test");
        assert_eq!(received[0]["subject"], "Verify your email address");
    }

    #[tokio::test]
    async fn test_non_success_status_is_failure() {
        let (url, _) = spawn_relay(StatusCode::INTERNAL_SERVER_ERROR).await;
        let transport = WebhookTransport::new(url, 5).unwrap();

        let result = transport.deliver(&message()).await;
        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = WebhookTransport::new(format!("http://{}/send", addr), 2).unwrap();
        assert!(transport.deliver(&message()).await.is_err());
    }
}
