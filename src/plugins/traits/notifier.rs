use async_trait::async_trait;

use crate::utils::error::DeliveryError;

/// Mail-delivery capability: delivers one message to one recipient.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError>;
}
