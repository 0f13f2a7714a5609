use super::TestHarness;
use pricedrop_watcher::{AddOutcome, AppError, RemoveOutcome, SiteFamily};
use rust_decimal::Decimal;
use std::str::FromStr;

#[tokio::test]
async fn test_subscribe_seeds_item_from_live_page() -> anyhow::Result<()> {
    let harness = TestHarness::new().await?;
    harness.serve_price("/telefon/1", "Akıllı Telefon", "12.499,90 TL").await;
    let link = harness.link("/telefon/1");

    let outcome = harness.manager.add_subscription(&link, "a@x.com").await?;

    assert_eq!(
        outcome,
        AddOutcome::Created {
            price: Decimal::from_str("12499.90")?
        }
    );
    let store = harness.store.snapshot().await?;
    let item = store.get(&link).expect("item was created");
    assert_eq!(item.site, SiteFamily::N11);
    assert_eq!(item.subscribers, vec!["a@x.com"]);
    assert_eq!(item.price, Decimal::from_str("12499.9")?);

    // Persisted as {"items": [...]} with short site tags.
    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(harness.store.path())?)?;
    assert_eq!(raw["items"][0]["site"], "n11");
    assert_eq!(raw["items"][0]["link"], link.as_str());
    Ok(())
}

#[tokio::test]
async fn test_unreachable_page_creates_nothing() -> anyhow::Result<()> {
    let harness = TestHarness::new().await?;
    let link = harness.link("/missing");

    let result = harness.manager.add_subscription(&link, "a@x.com").await;

    assert!(matches!(result, Err(AppError::Extraction(_))));
    assert!(harness.store.snapshot().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_concurrent_first_subscriptions_share_one_item() -> anyhow::Result<()> {
    let harness = TestHarness::new().await?;
    harness.serve_price("/tablet", "Tablet", "5.000 TL").await;
    let link = harness.link("/tablet");

    let emails: Vec<String> = (0..8).map(|i| format!("user{}@x.com", i)).collect();
    let handles: Vec<_> = emails
        .iter()
        .map(|email| {
            let manager = harness.manager.clone();
            let link = link.clone();
            let email = email.clone();
            tokio::spawn(async move { manager.add_subscription(&link, &email).await })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        if let AddOutcome::Created { .. } = handle.await?? {
            created += 1;
        }
    }

    assert_eq!(created, 1);
    let store = harness.store.snapshot().await?;
    assert_eq!(store.len(), 1);
    let mut subscribers = store.get(&link).expect("item exists").subscribers.clone();
    subscribers.sort();
    let mut expected = emails.clone();
    expected.sort();
    assert_eq!(subscribers, expected);
    Ok(())
}

#[tokio::test]
async fn test_unsubscribe_lifecycle() -> anyhow::Result<()> {
    let harness = TestHarness::new().await?;
    harness.serve_price("/kulaklik", "Kulaklık", "799 TL").await;
    let link = harness.link("/kulaklik");

    harness.manager.add_subscription(&link, "a@x.com").await?;
    assert_eq!(harness.manager.add_subscription(&link, "b@x.com").await?, AddOutcome::Subscribed);
    assert_eq!(
        harness.manager.add_subscription(&link, "b@x.com").await?,
        AddOutcome::AlreadySubscribed
    );

    assert_eq!(
        harness.manager.remove_subscription(&harness.link("/other"), "a@x.com").await?,
        RemoveOutcome::NoSuchLink
    );
    assert_eq!(
        harness.manager.remove_subscription(&link, "c@x.com").await?,
        RemoveOutcome::NoSuchUser
    );
    assert_eq!(harness.manager.remove_subscription(&link, "a@x.com").await?, RemoveOutcome::Removed);
    assert_eq!(
        harness.manager.remove_subscription(&link, "b@x.com").await?,
        RemoveOutcome::ItemDeleted
    );
    assert!(harness.store.snapshot().await?.is_empty());
    Ok(())
}
