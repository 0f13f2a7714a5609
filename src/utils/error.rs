use thiserror::Error;

/// Failure while pricing a single page. Never fatal to a crawl cycle.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Timed out after {seconds}s fetching {url}")]
    Timeout { url: String, seconds: u64 },

    #[error("Rendering failed for {url}: {message}")]
    Render { url: String, message: String },

    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("Parsing error: {message}")]
    Parse { message: String },
}

/// Failure handing a message to the mail-delivery capability.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Invalid address {address}: {message}")]
    Address { address: String, message: String },

    #[error("Could not build message: {0}")]
    Message(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Store IO error: {0}")]
    StoreIo(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<tokio_cron_scheduler::JobSchedulerError> for AppError {
    fn from(err: tokio_cron_scheduler::JobSchedulerError) -> Self {
        AppError::Scheduler(err.to_string())
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
