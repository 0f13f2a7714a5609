use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::SiteFamily;

/// One tracked product page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub site: SiteFamily,
    pub link: String,
    pub subscribers: Vec<String>,
    pub price: Decimal,
}

impl Item {
    pub fn new(site: SiteFamily, link: impl Into<String>, subscriber: impl Into<String>, price: Decimal) -> Self {
        Self {
            site,
            link: link.into(),
            subscribers: vec![subscriber.into()],
            price,
        }
    }

    pub fn has_subscriber(&self, email: &str) -> bool {
        self.subscribers.iter().any(|s| s == email)
    }

    /// Adds `email` unless it is already subscribed. Returns whether the set changed.
    pub fn add_subscriber(&mut self, email: &str) -> bool {
        if self.has_subscriber(email) {
            return false;
        }
        self.subscribers.push(email.to_string());
        true
    }

    /// Removes `email`. Returns whether it was present.
    pub fn remove_subscriber(&mut self, email: &str) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s != email);
        self.subscribers.len() != before
    }
}

/// Result of a subscriber insert against the in-memory store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    Subscribed,
    AlreadySubscribed,
}

/// Result of an unsubscribe against the in-memory store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveOutcome {
    /// The subscriber was removed; others remain.
    Removed,
    /// The sole subscriber was removed, taking the item with it.
    ItemDeleted,
    NoSuchUser,
    NoSuchLink,
}

impl RemoveOutcome {
    pub fn is_removed(&self) -> bool {
        matches!(self, RemoveOutcome::Removed | RemoveOutcome::ItemDeleted)
    }
}

/// The full persisted snapshot, in the layout of the `db.json` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Store {
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Store {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, link: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.link == link)
    }

    pub fn get_mut(&mut self, link: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.link == link)
    }

    /// Subscribes `email` to an existing item. `None` when the link is not tracked.
    pub fn subscribe_existing(&mut self, link: &str, email: &str) -> Option<MergeOutcome> {
        let item = self.get_mut(link)?;
        if item.add_subscriber(email) {
            Some(MergeOutcome::Subscribed)
        } else {
            Some(MergeOutcome::AlreadySubscribed)
        }
    }

    /// Inserts `item`, or merges its subscribers into an item already tracking the same link.
    pub fn insert_or_merge(&mut self, item: Item) -> MergeOutcome {
        match self.get_mut(&item.link) {
            Some(existing) => {
                let mut changed = false;
                for email in &item.subscribers {
                    changed |= existing.add_subscriber(email);
                }
                if changed {
                    MergeOutcome::Subscribed
                } else {
                    MergeOutcome::AlreadySubscribed
                }
            }
            None => {
                self.items.push(item);
                MergeOutcome::Inserted
            }
        }
    }

    pub fn unsubscribe(&mut self, link: &str, email: &str) -> RemoveOutcome {
        let Some(index) = self.items.iter().position(|item| item.link == link) else {
            return RemoveOutcome::NoSuchLink;
        };

        let item = &mut self.items[index];
        if !item.remove_subscriber(email) {
            return RemoveOutcome::NoSuchUser;
        }

        if item.subscribers.is_empty() {
            self.items.remove(index);
            RemoveOutcome::ItemDeleted
        } else {
            RemoveOutcome::Removed
        }
    }

    /// Sets the stored price of `link`. Returns false when the item no longer exists.
    pub fn set_price(&mut self, link: &str, price: Decimal) -> bool {
        match self.get_mut(link) {
            Some(item) => {
                item.price = price;
                true
            }
            None => false,
        }
    }

    /// Drops duplicate links (first wins), duplicate subscribers and empty items.
    ///
    /// Applied to every snapshot read from disk so hand-edited files cannot
    /// break the store invariants.
    pub fn normalized(mut self) -> Self {
        let mut seen = std::collections::HashSet::new();
        self.items.retain(|item| seen.insert(item.link.clone()));
        for item in &mut self.items {
            let mut emails = std::collections::HashSet::new();
            item.subscribers.retain(|email| emails.insert(email.clone()));
        }
        self.items.retain(|item| !item.subscribers.is_empty());
        self
    }
}
