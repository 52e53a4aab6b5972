use std::sync::Arc;

use super::transport::{MailMessage, MailTransport};
use crate::config::{JwtConfig, MailConfig};
use crate::error::AppResult;
use crate::utils::jwt::generate_verification_token;

const SUBJECT: &str = "Verify your email address";

/// Sends account verification emails carrying a signed link.
#[derive(Clone)]
pub struct VerificationMailer {
    transport: Arc<dyn MailTransport>,
    from: String,
    verification_url: String,
    secret: String,
    expiration_hours: i64,
}

impl VerificationMailer {
    pub fn new(transport: Arc<dyn MailTransport>, mail: &MailConfig, jwt: &JwtConfig) -> Self {
        Self {
            transport,
            from: mail.from.clone(),
            verification_url: mail.verification_url.clone(),
            secret: jwt.secret.clone(),
            expiration_hours: jwt.verification_token_expiration,
        }
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    fn link(&self, token: &str) -> String {
        let separator = if self.verification_url.contains('?') {
            '&'
        } else {
            '?'
        };
        format!("{}{}token={}", self.verification_url, separator, token)
    }

    /// Signs a verification token for the account and mails the link.
    pub async fn send_account_verification(&self, user_id: i32, email: &str) -> AppResult<()> {
        let token = generate_verification_token(
            user_id,
            email.to_string(),
            &self.secret,
            self.expiration_hours,
        )?;
        let link = self.link(&token);

        let message = MailMessage {
            from: self.from.clone(),
            to: email.to_string(),
            subject: SUBJECT.to_string(),
            body: format!(
                "Your school account has been created.\n\n\
                 Confirm your email address by opening the link below:\n{}\n\n\
                 The link expires in {} hours.",
                link, self.expiration_hours
            ),
        };

        self.transport.deliver(&message).await?;
        tracing::info!(
            user_id,
            transport = self.transport.name(),
            "Verification email sent"
        );
        Ok(())
    }
}
