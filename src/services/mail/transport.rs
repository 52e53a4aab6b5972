//! Core mail transport trait and message type.

use crate::error::AppResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An outgoing email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

/// Trait for mail transports (log, webhook relay, ...)
///
/// A transport either hands the message off or returns an error; callers
/// decide whether a failed delivery matters.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, message: &MailMessage) -> AppResult<()>;

    /// Transport name for logging
    fn name(&self) -> &'static str;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::error::AppError;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Keeps delivered messages in memory; can be switched to fail.
    #[derive(Default)]
    pub(crate) struct RecordingTransport {
        pub(crate) sent: Mutex<Vec<MailMessage>>,
        pub(crate) fail: AtomicBool,
    }

    impl RecordingTransport {
        pub(crate) fn failing() -> Self {
            let transport = Self::default();
            transport.fail.store(true, Ordering::SeqCst);
            transport
        }

        pub(crate) fn sent(&self) -> Vec<MailMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn deliver(&self, message: &MailMessage) -> AppResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::internal("mail relay unavailable"));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }
}
