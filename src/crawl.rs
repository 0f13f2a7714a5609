use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::Instant;

use crate::extractor::PriceExtractor;
use crate::models::Item;
use crate::notifications::{NotificationDispatcher, PriceDrop};
use crate::plugins::trackers::price::{compare, percent_change, ChangeType};
use crate::store::SubscriptionStore;
use crate::utils::error::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CycleReport {
    pub items_checked: usize,
    pub items_failed: usize,
    pub price_drops: usize,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
    pub duration_ms: u64,
}

/// One full re-pricing pass over every tracked item.
pub struct CrawlCycle {
    store: Arc<SubscriptionStore>,
    extractor: Arc<PriceExtractor>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl CrawlCycle {
    pub fn new(
        store: Arc<SubscriptionStore>,
        extractor: Arc<PriceExtractor>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            store,
            extractor,
            dispatcher,
        }
    }

    /// Re-prices every item in the current snapshot, in order.
    ///
    /// Only an unreadable store aborts the cycle; extraction, delivery and
    /// per-item save failures are logged and counted.
    pub async fn run(&self) -> Result<CycleReport> {
        let start_time = Instant::now();
        let snapshot = self.store.snapshot().await?;
        let mut report = CycleReport::default();

        tracing::info!("Starting crawl cycle over {} items", snapshot.len());

        for item in &snapshot.items {
            report.items_checked += 1;
            self.check_item(item, &mut report).await;
        }

        report.duration_ms = start_time.elapsed().as_millis() as u64;
        tracing::info!(
            "Crawl cycle finished: {} checked, {} failed, {} price drops, {} notifications sent ({} failed) in {}ms",
            report.items_checked,
            report.items_failed,
            report.price_drops,
            report.notifications_sent,
            report.notifications_failed,
            report.duration_ms
        );
        Ok(report)
    }

    async fn check_item(&self, item: &Item, report: &mut CycleReport) {
        let new_price = match self.extractor.extract(&item.link, item.site).await {
            Ok(price) => price,
            Err(e) => {
                tracing::warn!("Skipping {} this cycle: {}", item.link, e);
                report.items_failed += 1;
                return;
            }
        };

        if compare(item.price, new_price) != ChangeType::Decreased {
            tracing::debug!("No price drop for {} ({} -> {})", item.link, item.price, new_price);
            return;
        }

        tracing::info!(
            "Price drop for {}: {} -> {} ({}%)",
            item.link,
            item.price,
            new_price,
            percent_change(item.price, new_price).unwrap_or_default()
        );
        report.price_drops += 1;

        let title = match self.extractor.title(&item.link).await {
            Ok(title) => title,
            Err(e) => {
                tracing::warn!("Could not fetch title of {}: {}", item.link, e);
                item.link.clone()
            }
        };

        let price_drop = PriceDrop {
            title,
            link: item.link.clone(),
            old_price: item.price,
            new_price,
        };
        let dispatch = self.dispatcher.dispatch_price_drop(&item.subscribers, &price_drop).await;
        report.notifications_sent += dispatch.sent;
        report.notifications_failed += dispatch.failed.len();

        match self.store.update_price(&item.link, new_price).await {
            Ok(true) => {}
            Ok(false) => tracing::info!("{} was removed during the cycle, price not recorded", item.link),
            Err(e) => tracing::error!("Failed to record new price for {}: {}", item.link, e),
        }
    }
}
