//! Durable subscription store.
//!
//! The whole store lives in one JSON file. Every mutation is a full
//! load-mutate-save cycle performed under a single writer lock, and every
//! save replaces the file atomically (temporary sibling file, fsync, rename),
//! so readers always see the last fully committed snapshot.

use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::models::{Item, MergeOutcome, RemoveOutcome, Store};
use crate::utils::error::Result;

pub struct SubscriptionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
    tmp_counter: AtomicU64,
}

impl SubscriptionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            tmp_counter: AtomicU64::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the last committed snapshot. Does not wait for in-flight writers.
    ///
    /// A missing or zero-length file is an empty store.
    pub async fn snapshot(&self) -> Result<Store> {
        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Store::default()),
            Err(e) => return Err(e.into()),
        };

        if data.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Store::default());
        }

        let store: Store = serde_json::from_slice(&data)?;
        Ok(store.normalized())
    }

    /// Atomically persists `store` as the new full snapshot.
    pub async fn replace(&self, store: &Store) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_snapshot(store).await
    }

    /// Subscribes `email` to an already tracked link. `None` when the link is not tracked.
    pub async fn add_subscriber(&self, link: &str, email: &str) -> Result<Option<MergeOutcome>> {
        self.mutate(|store| {
            let outcome = store.subscribe_existing(link, email);
            let changed = outcome == Some(MergeOutcome::Subscribed);
            (outcome, changed)
        })
        .await
    }

    /// Inserts a new item, merging into an existing one if the link appeared meanwhile.
    pub async fn insert_item(&self, item: Item) -> Result<MergeOutcome> {
        self.mutate(|store| {
            let outcome = store.insert_or_merge(item);
            (outcome, outcome != MergeOutcome::AlreadySubscribed)
        })
        .await
    }

    pub async fn remove_subscription(&self, link: &str, email: &str) -> Result<RemoveOutcome> {
        self.mutate(|store| {
            let outcome = store.unsubscribe(link, email);
            (outcome, outcome.is_removed())
        })
        .await
    }

    /// Records a new price for `link`. Returns false when the item was removed meanwhile.
    pub async fn update_price(&self, link: &str, price: Decimal) -> Result<bool> {
        self.mutate(|store| {
            let updated = store.set_price(link, price);
            (updated, updated)
        })
        .await
    }

    /// Runs one load-mutate-save cycle under the writer lock.
    ///
    /// `apply` returns its result and whether the store changed; unchanged
    /// stores are not rewritten.
    async fn mutate<R>(&self, apply: impl FnOnce(&mut Store) -> (R, bool)) -> Result<R> {
        let _guard = self.write_lock.lock().await;
        let mut store = self.snapshot().await?;
        let (result, changed) = apply(&mut store);
        if changed {
            self.write_snapshot(&store).await?;
        }
        Ok(result)
    }

    async fn write_snapshot(&self, store: &Store) -> Result<()> {
        let content = serde_json::to_vec_pretty(store)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let temp = self.temp_path();
        // Only a file this call created is ever cleaned up.
        let file = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&temp)
            .await?;
        if let Err(e) = write_synced(file, &content).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp, &self.path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        tracing::debug!("Saved {} items to {}", store.len(), self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store".to_string());
        let id = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        self.path
            .with_file_name(format!(".{}.tmp.{}.{}", name, std::process::id(), id))
    }
}

async fn write_synced(mut file: fs::File, content: &[u8]) -> std::io::Result<()> {
    file.write_all(content).await?;
    file.sync_all().await
}
