//! Snapshot fan-out shared by the store backends.
//!
//! One `tokio::sync::watch` channel per subscribed page: a write publishes
//! the full updated document, every subscriber observes it (writers see
//! their own writes echo back), and deleting the page drops the sender,
//! which subscribers observe as a closed feed. `watch` deliberately
//! coalesces bursts — a slow subscriber sees the latest snapshot, not every
//! intermediate one, which is exactly the wholesale-replace contract.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::watch;

use crate::models::{PageDocument, PageId};

use super::StoreError;

/// A live feed of one page's snapshots.
pub struct PageSubscription {
    rx: watch::Receiver<PageDocument>,
}

impl PageSubscription {
    /// Wait for the next snapshot after the last one observed.
    /// `Err(SubscriptionClosed)` once the page is deleted or the store is
    /// gone; the feed never recovers after that.
    pub async fn changed(&mut self) -> Result<PageDocument, StoreError> {
        self.rx
            .changed()
            .await
            .map_err(|_| StoreError::SubscriptionClosed)?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// The most recent snapshot, without waiting.
    pub fn latest(&self) -> PageDocument {
        self.rx.borrow().clone()
    }
}

/// Watcher registry: page id → sender of the latest document.
#[derive(Default)]
pub(crate) struct ChangeFeed {
    channels: Mutex<HashMap<PageId, watch::Sender<PageDocument>>>,
}

impl ChangeFeed {
    /// Subscribe to a page, seeding the channel with its current document if
    /// nobody is watching yet.
    pub fn subscribe(&self, page: &PageId, current: PageDocument) -> PageSubscription {
        let mut channels = self.channels.lock().expect("change feed lock poisoned");
        let tx = channels
            .entry(page.clone())
            .or_insert_with(|| watch::channel(current).0);
        PageSubscription { rx: tx.subscribe() }
    }

    /// Publish a new snapshot to whoever is watching.
    pub fn publish(&self, page: &PageId, doc: &PageDocument) {
        let channels = self.channels.lock().expect("change feed lock poisoned");
        if let Some(tx) = channels.get(page) {
            // The registry keeps the sender alive even with zero receivers,
            // so late subscribers still get a fresh seed value.
            tx.send_replace(doc.clone());
        }
    }

    /// Drop the page's channel, closing every subscriber's feed.
    pub fn close(&self, page: &PageId) {
        let mut channels = self.channels.lock().expect("change feed lock poisoned");
        channels.remove(page);
    }
}
