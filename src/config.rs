use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub scraper: ScraperConfig,
    pub scheduler: SchedulerConfig,
    pub notifications: NotificationsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Upper bound in seconds for one page fetch, rendering included.
    pub request_timeout: u64,
    pub user_agent: String,
    pub chrome_path: Option<String>,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: Option<String>,
    pub from_name: String,
    pub use_tls: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for daily rolling log files; stdout only when unset.
    pub directory: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("db.json"),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            request_timeout: 30,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) PricedropWatcher/0.1".to_string(),
            chrome_path: None,
            retry_attempts: 2,
            retry_delay_ms: 1000,
        }
    }
}

impl ScraperConfig {
    /// Upper bound for one price extraction, covering every retry of a static fetch.
    pub fn extraction_timeout(&self) -> Duration {
        let attempts = u64::from(self.retry_attempts) + 1;
        Duration::from_secs(self.request_timeout * attempts)
            + Duration::from_millis(self.retry_delay_ms * u64::from(self.retry_attempts))
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { interval_secs: 3600 }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            username: None,
            password: None,
            from_address: None,
            from_name: "Pricedrop Watcher".to_string(),
            use_tls: true,
        }
    }
}

impl SmtpConfig {
    /// Credentials are present, so real delivery is possible.
    pub fn is_configured(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    /// Sender address, falling back to the login name.
    pub fn sender(&self) -> Option<&str> {
        self.from_address.as_deref().or(self.username.as_deref())
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Add environment-specific config
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix "PRICEDROP_"
            .add_source(Environment::with_prefix("PRICEDROP").separator("__").try_parsing(true))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        // Add Chrome path from environment if not set
        if config.scraper.chrome_path.is_none() {
            config.scraper.chrome_path = env::var("CHROME_PATH").ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::Message("Store path must not be empty".into()));
        }

        if self.scraper.request_timeout == 0 {
            return Err(ConfigError::Message("Scraper request_timeout must be greater than 0".into()));
        }

        if self.scheduler.interval_secs == 0 {
            return Err(ConfigError::Message("Scheduler interval_secs must be greater than 0".into()));
        }

        let smtp = &self.notifications.smtp;
        if smtp.port == 0 {
            return Err(ConfigError::Message("SMTP port must be greater than 0".into()));
        }

        if smtp.username.is_some() != smtp.password.is_some() {
            return Err(ConfigError::Message(
                "SMTP username and password must be configured together".into(),
            ));
        }

        Ok(())
    }
}
