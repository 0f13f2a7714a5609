use super::TestHarness;
use pricedrop_watcher::notifications::PRICE_DROP_SUBJECT;
use pricedrop_watcher::MonitorScheduler;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;

#[tokio::test]
async fn test_price_drop_notifies_every_subscriber() -> anyhow::Result<()> {
    let harness = TestHarness::new().await?;
    harness.serve_price("/laptop", "Dizüstü Bilgisayar", "100 TL").await;
    let link = harness.link("/laptop");
    harness.manager.add_subscription(&link, "a@x.com").await?;
    harness.manager.add_subscription(&link, "b@x.com").await?;

    harness.reset_pages().await;
    harness.serve_price("/laptop", "Dizüstü Bilgisayar", "89,50 TL").await;

    let report = harness.cycle.run().await?;

    assert_eq!(report.items_checked, 1);
    assert_eq!(report.price_drops, 1);
    assert_eq!(report.notifications_sent, 2);

    let sent = harness.mailer.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to, "a@x.com");
    assert_eq!(sent[1].to, "b@x.com");
    assert_eq!(sent[0].subject, PRICE_DROP_SUBJECT);
    assert_eq!(
        sent[0].body,
        format!("The price of Dizüstü Bilgisayar is now 89.50 (previously 100)\nProduct link: {}", link)
    );

    let store = harness.store.snapshot().await?;
    assert_eq!(store.get(&link).expect("still tracked").price, Decimal::from_str("89.50")?);
    Ok(())
}

#[tokio::test]
async fn test_unchanged_or_raised_price_is_silent() -> anyhow::Result<()> {
    let harness = TestHarness::new().await?;
    harness.serve_price("/a", "A", "100 TL").await;
    harness.serve_price("/b", "B", "50 TL").await;
    harness.manager.add_subscription(&harness.link("/a"), "a@x.com").await?;
    harness.manager.add_subscription(&harness.link("/b"), "a@x.com").await?;
    let before = harness.store.snapshot().await?;

    harness.reset_pages().await;
    harness.serve_price("/a", "A", "100,00 TL").await;
    harness.serve_price("/b", "B", "65 TL").await;

    let report = harness.cycle.run().await?;

    assert_eq!(report.items_checked, 2);
    assert_eq!(report.price_drops, 0);
    assert!(harness.mailer.sent().is_empty());
    assert_eq!(harness.store.snapshot().await?, before);
    Ok(())
}

#[tokio::test]
async fn test_failures_are_isolated_per_item_and_recipient() -> anyhow::Result<()> {
    let harness = TestHarness::new().await?;
    harness.serve_price("/gone", "Gone", "300 TL").await;
    harness.serve_price("/drop", "Drop", "300 TL").await;
    let gone = harness.link("/gone");
    let drop_link = harness.link("/drop");
    harness.manager.add_subscription(&gone, "a@x.com").await?;
    harness.manager.add_subscription(&drop_link, "bounce@x.com").await?;
    harness.manager.add_subscription(&drop_link, "b@x.com").await?;
    harness.mailer.reject("bounce@x.com");

    harness.reset_pages().await;
    harness.serve_price("/drop", "Drop", "250 TL").await;

    let report = harness.cycle.run().await?;

    assert_eq!(report.items_failed, 1);
    assert_eq!(report.price_drops, 1);
    assert_eq!(report.notifications_sent, 1);
    assert_eq!(report.notifications_failed, 1);
    assert_eq!(harness.mailer.sent()[0].to, "b@x.com");

    let store = harness.store.snapshot().await?;
    assert_eq!(store.get(&gone).expect("kept").price, Decimal::from(300));
    assert_eq!(store.get(&drop_link).expect("kept").price, Decimal::from(250));
    Ok(())
}

#[tokio::test]
async fn test_scheduler_runs_real_cycle() -> anyhow::Result<()> {
    let harness = TestHarness::new().await?;
    harness.serve_price("/saat", "Saat", "1.000,00 TL").await;
    let link = harness.link("/saat");
    harness.manager.add_subscription(&link, "a@x.com").await?;

    harness.reset_pages().await;
    harness.serve_price("/saat", "Saat", "900 TL").await;

    let scheduler = MonitorScheduler::new(harness.cycle.clone(), Duration::from_secs(3600)).await?;
    let report = scheduler.run_now().await?;

    assert_eq!(report.price_drops, 1);
    let stats = scheduler.stats().await;
    assert_eq!(stats.completed_runs, 1);
    assert_eq!(stats.last_report.expect("report recorded").notifications_sent, 1);
    Ok(())
}
