use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;

use crate::config::ScraperConfig;
use crate::utils::error::ExtractionError;

/// How a page has to be retrieved before its price element is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// A single GET; the served HTML already contains the price.
    Static,
    /// The page is loaded in a headless browser and scripts are run first.
    Rendered,
}

/// Page-fetch capability: returns raw or rendered HTML for a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<String, ExtractionError>;
}

pub struct WebScraper {
    client: reqwest::Client,
    browser: Mutex<Option<Browser>>,
    config: ScraperConfig,
}

impl WebScraper {
    pub fn new(config: ScraperConfig) -> Result<Self, ExtractionError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|e| ExtractionError::Network {
                url: String::new(),
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            browser: Mutex::new(None),
            config,
        })
    }

    async fn fetch_static(&self, url: &str) -> Result<String, ExtractionError> {
        let strategy = FixedInterval::from_millis(self.config.retry_delay_ms)
            .take(self.config.retry_attempts as usize);

        // Only transport failures are retried; an HTTP status is a definite answer.
        let response = Retry::start(strategy, || self.client.get(url).send())
            .await
            .map_err(|e| ExtractionError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| ExtractionError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Shared browser, launched on first use and again after it was lost.
    async fn browser(&self, url: &str) -> Result<Browser, ExtractionError> {
        let mut slot = self.browser.lock().await;
        if let Some(browser) = slot.as_ref() {
            return Ok(browser.clone());
        }

        let chrome_path = self.config.chrome_path.clone();
        let browser = tokio::task::spawn_blocking(move || launch_browser(chrome_path))
            .await
            .map_err(|e| e.to_string())
            .and_then(|result| result)
            .map_err(|message| ExtractionError::Render {
                url: url.to_string(),
                message,
            })?;
        *slot = Some(browser.clone());
        Ok(browser)
    }

    async fn fetch_rendered(&self, url: &str) -> Result<String, ExtractionError> {
        let browser = self.browser(url).await?;
        let user_agent = self.config.user_agent.clone();
        let target = url.to_string();

        let rendered = tokio::task::spawn_blocking(move || -> Result<String, String> {
            let tab = browser
                .new_tab()
                .map_err(|e| format!("{}: {}", TAB_FAILURE, e))?;
            tab.set_user_agent(&user_agent, None, None)
                .map_err(|e| format!("Failed to set user agent: {}", e))?;
            tab.navigate_to(&target)
                .map_err(|e| format!("Navigation failed: {}", e))?;
            tab.wait_until_navigated()
                .map_err(|e| format!("Page load failed: {}", e))?;
            let content = tab.get_content().map_err(|e| format!("Failed to get page content: {}", e));

            // Close tab to free resources
            let _ = tab.close(true);
            content
        })
        .await
        .map_err(|e| e.to_string())
        .and_then(|result| result);

        match rendered {
            Ok(html) => Ok(html),
            Err(message) => {
                if browser_lost(&message) {
                    tracing::warn!("Headless browser is gone, relaunching on next render: {}", message);
                    self.browser.lock().await.take();
                }
                Err(ExtractionError::Render {
                    url: url.to_string(),
                    message,
                })
            }
        }
    }
}

const TAB_FAILURE: &str = "Failed to create tab";

/// Render failures after which the browser process cannot be reused.
fn browser_lost(message: &str) -> bool {
    message.starts_with(TAB_FAILURE) || message.contains("connection is closed")
}

fn launch_browser(chrome_path: Option<String>) -> Result<Browser, String> {
    let mut launch_options = LaunchOptions::default_builder()
        .headless(true)
        .sandbox(false) // Often needed in containerized environments
        .args(vec![
            std::ffi::OsStr::new("--no-sandbox"),
            std::ffi::OsStr::new("--disable-dev-shm-usage"),
            std::ffi::OsStr::new("--disable-gpu"),
            std::ffi::OsStr::new("--disable-extensions"),
        ])
        .build()
        .map_err(|e| format!("Failed to create launch options: {}", e))?;

    if let Some(chrome_path) = chrome_path {
        launch_options.path = Some(std::path::PathBuf::from(chrome_path));
    }

    tracing::info!("Launching headless browser for rendered pages");
    Browser::new(launch_options).map_err(|e| format!("Failed to launch browser: {}", e))
}

#[async_trait]
impl PageFetcher for WebScraper {
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<String, ExtractionError> {
        tracing::debug!("Fetching {} ({:?})", url, mode);
        match mode {
            FetchMode::Static => self.fetch_static(url).await,
            FetchMode::Rendered => self.fetch_rendered(url).await,
        }
    }
}
