use rust_decimal::Decimal;
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;

use crate::models::SiteFamily;
use crate::plugins::trackers::price::parse_price;
use crate::scraper::{FetchMode, PageFetcher};
use crate::utils::error::ExtractionError;

/// Prices a product page: fetch, locate the family's price element, parse.
pub struct PriceExtractor {
    fetcher: Arc<dyn PageFetcher>,
    timeout: Duration,
}

impl PriceExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    pub fn fetch_mode(family: SiteFamily) -> FetchMode {
        if family.requires_rendering() {
            FetchMode::Rendered
        } else {
            FetchMode::Static
        }
    }

    pub async fn extract(&self, link: &str, family: SiteFamily) -> Result<Decimal, ExtractionError> {
        let html = self.fetch_bounded(link, Self::fetch_mode(family)).await?;
        let text = select_text(&html, family.price_selector())?;
        let price = parse_price(&text)?;
        tracing::debug!("Extracted price {} from {} ({})", price, link, family);
        Ok(price)
    }

    /// Display title of the page, read from its `<title>` element.
    pub async fn title(&self, link: &str) -> Result<String, ExtractionError> {
        let html = self.fetch_bounded(link, FetchMode::Static).await?;
        let title = select_text(&html, "title")?;
        if title.is_empty() {
            return Err(ExtractionError::ElementNotFound {
                selector: "title".to_string(),
            });
        }
        Ok(title)
    }

    async fn fetch_bounded(&self, link: &str, mode: FetchMode) -> Result<String, ExtractionError> {
        match tokio::time::timeout(self.timeout, self.fetcher.fetch(link, mode)).await {
            Ok(result) => result,
            Err(_) => Err(ExtractionError::Timeout {
                url: link.to_string(),
                seconds: self.timeout.as_secs(),
            }),
        }
    }
}

/// Trimmed text of the first element matching `selector`.
fn select_text(html: &str, selector: &str) -> Result<String, ExtractionError> {
    let document = Html::parse_document(html);
    let css_selector = Selector::parse(selector).map_err(|e| ExtractionError::Parse {
        message: format!("Invalid CSS selector '{}': {:?}", selector, e),
    })?;

    document
        .select(&css_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .ok_or_else(|| ExtractionError::ElementNotFound {
            selector: selector.to_string(),
        })
}
