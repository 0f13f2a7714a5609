pub mod cli;
pub mod config;
pub mod crawl;
pub mod extractor;
pub mod models;
pub mod notifications;
pub mod plugins;
pub mod scheduler;
pub mod scraper;
pub mod site_resolver;
pub mod store;
pub mod subscriptions;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::AppConfig;
pub use crawl::{CrawlCycle, CycleReport};
pub use extractor::PriceExtractor;
pub use models::{Item, RemoveOutcome, SiteFamily, Store};
pub use notifications::NotificationDispatcher;
pub use scheduler::MonitorScheduler;
pub use store::SubscriptionStore;
pub use subscriptions::{AddOutcome, SubscriptionManager};
pub use utils::error::{AppError, Result};
