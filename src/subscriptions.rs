use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::extractor::PriceExtractor;
use crate::models::{Item, MergeOutcome, RemoveOutcome, Store};
use crate::site_resolver::SiteResolver;
use crate::store::SubscriptionStore;
use crate::utils::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum AddOutcome {
    /// The link was not tracked yet; it was priced and added.
    Created { price: Decimal },
    Subscribed,
    AlreadySubscribed,
}

/// Entry point for subscribe/unsubscribe requests.
pub struct SubscriptionManager {
    store: Arc<SubscriptionStore>,
    resolver: Arc<dyn SiteResolver>,
    extractor: Arc<PriceExtractor>,
}

impl SubscriptionManager {
    pub fn new(store: Arc<SubscriptionStore>, resolver: Arc<dyn SiteResolver>, extractor: Arc<PriceExtractor>) -> Self {
        Self {
            store,
            resolver,
            extractor,
        }
    }

    /// Subscribes `email` to `link`, seeding a new item with a fresh price when needed.
    ///
    /// Re-subscribing is a no-op. If the seeding extraction fails nothing is
    /// stored and the error is returned.
    pub async fn add_subscription(&self, link: &str, email: &str) -> Result<AddOutcome> {
        if let Some(outcome) = self.store.add_subscriber(link, email).await? {
            tracing::info!("{} subscribed to tracked link {} ({:?})", email, link, outcome);
            return Ok(Self::existing_outcome(outcome));
        }

        let family = self.resolver.resolve(link);
        // Priced without the writer lock; the insert re-checks for a concurrent creator.
        let price = self.extractor.extract(link, family).await?;
        let outcome = self.store.insert_item(Item::new(family, link, email, price)).await?;

        match outcome {
            MergeOutcome::Inserted => {
                tracing::info!("Tracking new {} link {} at {}", family, link, price);
                Ok(AddOutcome::Created { price })
            }
            other => Ok(Self::existing_outcome(other)),
        }
    }

    pub async fn remove_subscription(&self, link: &str, email: &str) -> Result<RemoveOutcome> {
        let outcome = self.store.remove_subscription(link, email).await?;
        match outcome {
            RemoveOutcome::ItemDeleted => tracing::info!("Last subscriber left, stopped tracking {}", link),
            RemoveOutcome::Removed => tracing::info!("{} unsubscribed from {}", email, link),
            RemoveOutcome::NoSuchUser | RemoveOutcome::NoSuchLink => {
                tracing::debug!("Unsubscribe of {} from {} rejected: {:?}", email, link, outcome)
            }
        }
        Ok(outcome)
    }

    pub async fn snapshot(&self) -> Result<Store> {
        self.store.snapshot().await
    }

    fn existing_outcome(outcome: MergeOutcome) -> AddOutcome {
        match outcome {
            MergeOutcome::AlreadySubscribed => AddOutcome::AlreadySubscribed,
            MergeOutcome::Subscribed | MergeOutcome::Inserted => AddOutcome::Subscribed,
        }
    }
}
