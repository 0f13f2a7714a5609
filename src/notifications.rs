use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::plugins::traits::Mailer;
use crate::utils::error::DeliveryError;

pub const PRICE_DROP_SUBJECT: &str = "A product you are tracking dropped in price!";

/// A detected price decrease for one tracked item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceDrop {
    pub title: String,
    pub link: String,
    pub old_price: Decimal,
    pub new_price: Decimal,
}

impl PriceDrop {
    pub fn body(&self) -> String {
        format!(
            "The price of {} is now {} (previously {})\nProduct link: {}",
            self.title, self.new_price, self.old_price, self.link
        )
    }
}

#[derive(Debug, Default)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: Vec<(String, DeliveryError)>,
}

impl DispatchReport {
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct NotificationDispatcher {
    mailer: Arc<dyn Mailer>,
}

impl NotificationDispatcher {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    pub async fn notify(&self, email: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        self.mailer.send(email, subject, body).await
    }

    /// Sends the price-drop message to every subscriber.
    ///
    /// A failed delivery is logged and recorded; remaining subscribers are
    /// still notified.
    pub async fn dispatch_price_drop(&self, subscribers: &[String], price_drop: &PriceDrop) -> DispatchReport {
        let body = price_drop.body();
        let mut report = DispatchReport::default();

        for email in subscribers {
            match self.notify(email, PRICE_DROP_SUBJECT, &body).await {
                Ok(()) => {
                    tracing::debug!("Notified {} about {}", email, price_drop.link);
                    report.sent += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to notify {} about {}: {}", email, price_drop.link, e);
                    report.failed.push((email.clone(), e));
                }
            }
        }

        report
    }
}
