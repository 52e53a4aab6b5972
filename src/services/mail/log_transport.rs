use super::transport::{MailMessage, MailTransport};
use crate::error::AppResult;
use async_trait::async_trait;

/// Writes outgoing mail to the structured log instead of sending it.
///
/// Meant for development, where the verification link is copied from the
/// log output.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn deliver(&self, message: &MailMessage) -> AppResult<()> {
        tracing::info!(
            transport = self.name(),
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "Mail delivered to log"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
