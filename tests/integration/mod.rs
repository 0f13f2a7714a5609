// Shared harness for the integration tests: a real store on disk, the real
// HTTP page fetcher pointed at a wiremock server, and a recording mailer.

pub mod crawl_cycle_tests;
pub mod subscription_tests;

use async_trait::async_trait;
use pricedrop_watcher::config::ScraperConfig;
use pricedrop_watcher::plugins::Mailer;
use pricedrop_watcher::scraper::WebScraper;
use pricedrop_watcher::site_resolver::SubstringResolver;
use pricedrop_watcher::utils::error::DeliveryError;
use pricedrop_watcher::{
    CrawlCycle, NotificationDispatcher, PriceExtractor, SiteFamily, SubscriptionManager, SubscriptionStore,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone, PartialEq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Records every message; addresses listed in `rejected` fail delivery.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    rejected: Mutex<Vec<String>>,
}

impl RecordingMailer {
    pub fn reject(&self, address: &str) {
        self.rejected.lock().unwrap().push(address.to_string());
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        if self.rejected.lock().unwrap().iter().any(|r| r == to) {
            return Err(DeliveryError::Transport(format!("550 mailbox {} unavailable", to)));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

pub fn get_test_scraper_config() -> ScraperConfig {
    ScraperConfig {
        request_timeout: 5,
        user_agent: "PricedropWatcher-Test/1.0".to_string(),
        chrome_path: None,
        retry_attempts: 0,
        retry_delay_ms: 10,
    }
}

pub struct TestHarness {
    _dir: TempDir,
    pub server: MockServer,
    pub store: Arc<SubscriptionStore>,
    pub manager: Arc<SubscriptionManager>,
    pub cycle: Arc<CrawlCycle>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestHarness {
    pub async fn new() -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let server = MockServer::start().await;

        let scraper = WebScraper::new(get_test_scraper_config())?;
        let extractor = Arc::new(PriceExtractor::new(Arc::new(scraper), Duration::from_secs(10)));
        let store = Arc::new(SubscriptionStore::new(dir.path().join("db.json")));
        // Mock server links carry no marketplace domain, so everything resolves to n11.
        let resolver = Arc::new(SubstringResolver::new(SiteFamily::N11));
        let mailer = Arc::new(RecordingMailer::default());
        let dispatcher = Arc::new(NotificationDispatcher::new(mailer.clone()));

        let manager = Arc::new(SubscriptionManager::new(store.clone(), resolver, extractor.clone()));
        let cycle = Arc::new(CrawlCycle::new(store.clone(), extractor, dispatcher));

        Ok(Self {
            _dir: dir,
            server,
            store,
            manager,
            cycle,
            mailer,
        })
    }

    pub fn link(&self, product_path: &str) -> String {
        format!("{}{}", self.server.uri(), product_path)
    }

    /// Serves an n11-style product page at `product_path`.
    pub async fn serve_price(&self, product_path: &str, title: &str, price_text: &str) {
        let html = format!(
            r#"<html><head><title>{}</title></head>
<body><div class="unitPrice"><div class="newPrice"><ins>{}</ins></div></div></body></html>"#,
            title, price_text
        );
        Mock::given(method("GET"))
            .and(path(product_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&self.server)
            .await;
    }

    /// Drops every mounted page, so the next `serve_price` replaces old prices.
    pub async fn reset_pages(&self) {
        self.server.reset().await;
    }
}
