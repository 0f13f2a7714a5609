//! In-memory collaborators shared by unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::scraper::{FetchMode, PageFetcher};
use crate::utils::error::ExtractionError;

/// Serves canned HTML per URL; unknown URLs answer 404.
#[derive(Default)]
pub struct StaticPages {
    pages: Mutex<HashMap<String, String>>,
    fetches: Mutex<Vec<String>>,
}

impl StaticPages {
    pub fn set_page(&self, url: &str, html: &str) {
        self.pages.lock().unwrap().insert(url.to_string(), html.to_string());
    }

    /// Product page with an n11-style price element and a title.
    pub fn set_n11_price(&self, url: &str, price_text: &str) {
        self.set_page(
            url,
            &format!(
                "<html><head><title>Test Product</title></head><body><div class=\"newPrice\"><ins>{}</ins></div></body></html>",
                price_text
            ),
        );
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for StaticPages {
    async fn fetch(&self, url: &str, _mode: FetchMode) -> Result<String, ExtractionError> {
        self.fetches.lock().unwrap().push(url.to_string());
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| ExtractionError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}
