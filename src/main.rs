use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use pricedrop_watcher::cli::{Cli, Commands};
use pricedrop_watcher::plugins::{LogMailer, Mailer, SmtpMailer};
use pricedrop_watcher::scraper::WebScraper;
use pricedrop_watcher::site_resolver::{SiteResolver, SubstringResolver};
use pricedrop_watcher::utils::{logger, validation};
use pricedrop_watcher::{
    AddOutcome, AppConfig, CrawlCycle, MonitorScheduler, NotificationDispatcher, PriceExtractor, RemoveOutcome,
    SiteFamily, SubscriptionManager, SubscriptionStore,
};

struct App {
    manager: SubscriptionManager,
    cycle: Arc<CrawlCycle>,
    store: Arc<SubscriptionStore>,
    resolver: Arc<dyn SiteResolver>,
}

fn build_mailer(config: &AppConfig) -> Result<Arc<dyn Mailer>> {
    let smtp = &config.notifications.smtp;
    if smtp.is_configured() {
        let mailer = SmtpMailer::new(smtp).context("Failed to set up SMTP transport")?;
        info!("Delivering notifications through {}:{}", smtp.host, smtp.port);
        Ok(Arc::new(mailer))
    } else {
        tracing::warn!("No SMTP credentials configured, notifications will only be logged");
        Ok(Arc::new(LogMailer))
    }
}

fn build_app(config: &AppConfig) -> Result<App> {
    let scraper = WebScraper::new(config.scraper.clone()).context("Failed to build page fetcher")?;
    let extractor = Arc::new(PriceExtractor::new(
        Arc::new(scraper),
        config.scraper.extraction_timeout(),
    ));
    let store = Arc::new(SubscriptionStore::new(config.store.path.clone()));
    let resolver: Arc<dyn SiteResolver> = Arc::new(SubstringResolver::default());
    let dispatcher = Arc::new(NotificationDispatcher::new(build_mailer(config)?));

    let manager = SubscriptionManager::new(store.clone(), resolver.clone(), extractor.clone());
    let cycle = Arc::new(CrawlCycle::new(store.clone(), extractor, dispatcher));

    Ok(App {
        manager,
        cycle,
        store,
        resolver,
    })
}

async fn run_scheduler(app: &App, config: &AppConfig, now: bool) -> Result<()> {
    let mut scheduler =
        MonitorScheduler::new(app.cycle.clone(), Duration::from_secs(config.scheduler.interval_secs)).await?;
    scheduler.start().await?;

    if now {
        // Failures are logged and counted by the scheduler.
        let _ = scheduler.run_now().await;
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    let stats = scheduler.stats().await;
    scheduler.shutdown().await?;
    info!(
        "Ran {} cycles ({} failed, {} skipped ticks) over {}s",
        stats.completed_runs, stats.failed_runs, stats.skipped_ticks, stats.uptime_seconds
    );
    Ok(())
}

async fn subscribe(app: &App, link: &str, email: &str, site: Option<SiteFamily>) -> Result<()> {
    validation::validate_email(email)?;
    validation::validate_link(link, site.unwrap_or_else(|| app.resolver.resolve(link)))?;

    match app.manager.add_subscription(link, email).await? {
        AddOutcome::Created { price } => println!("Now tracking {} at {}; {} subscribed", link, price, email),
        AddOutcome::Subscribed => println!("{} subscribed to {}", email, link),
        AddOutcome::AlreadySubscribed => println!("{} is already subscribed to {}", email, link),
    }
    Ok(())
}

async fn unsubscribe(app: &App, link: &str, email: &str) -> Result<()> {
    validation::validate_email(email)?;

    match app.manager.remove_subscription(link, email).await? {
        RemoveOutcome::Removed => println!("{} unsubscribed from {}", email, link),
        RemoveOutcome::ItemDeleted => println!("{} unsubscribed; {} is no longer tracked", email, link),
        RemoveOutcome::NoSuchUser => println!("{} is not subscribed to {}", email, link),
        RemoveOutcome::NoSuchLink => println!("{} is not tracked", link),
    }
    Ok(())
}

async fn list(app: &App, json: bool) -> Result<()> {
    let store = app.store.snapshot().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&store)?);
        return Ok(());
    }

    if store.is_empty() {
        println!("No tracked items");
    }
    for item in &store.items {
        println!("[{}] {} @ {}", item.site, item.link, item.price);
        for subscriber in &item.subscribers {
            println!("    {}", subscriber);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let _log_guard = logger::init_logger(cli.verbose, config.logging.directory.as_deref());

    info!("Starting Pricedrop Watcher (store: {})", config.store.path.display());
    let app = build_app(&config)?;

    match cli.command {
        Commands::Run { now } => run_scheduler(&app, &config, now).await,
        Commands::Subscribe { link, email, site } => subscribe(&app, &link, &email, site).await,
        Commands::Unsubscribe { link, email } => unsubscribe(&app, &link, &email).await,
        Commands::List { json } => list(&app, json).await,
        Commands::Crawl => {
            let report = app.cycle.run().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}
