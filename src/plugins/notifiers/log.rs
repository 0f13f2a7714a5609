use crate::plugins::traits::Mailer;
use crate::utils::error::DeliveryError;
use async_trait::async_trait;

/// Logs messages instead of sending them. Used when no SMTP credentials are configured.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        tracing::info!(recipient = to, subject = subject, "Mail delivery disabled, message not sent: {}", body);
        Ok(())
    }
}
