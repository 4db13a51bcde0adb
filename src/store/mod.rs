//! Page document stores.
//!
//! The board core consumes two store capabilities, a live snapshot
//! subscription and a partial-field write, expressed by [`DocumentStore`].
//! Two backends implement it: [`MemoryStore`] (in-process, also the test
//! double) and [`SqliteStore`] (durable, one row per page with JSON columns
//! for the board maps).
//!
//! Both backends are last-write-wins: a write replaces the named fields
//! wholesale, with no conflict detection between concurrent writers. That is
//! the documented semantics of the product, not an accident; see DESIGN.md.

mod feed;
mod memory;
mod schema;
mod sqlite;

use thiserror::Error;

pub use feed::PageSubscription;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::models::{CreatePageInput, PageDocument, PageFields, PageId};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The page does not exist (or no longer exists).
    #[error("page not found")]
    NotFound,
    /// The snapshot feed ended: the page was deleted or the store dropped.
    /// Terminal for the subscriber; there is no automatic resubscribe.
    #[error("subscription closed")]
    SubscriptionClosed,
    #[error("storage backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Backend(e.into())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Backend(e.into())
    }
}

/// A remote-document store holding page documents.
///
/// Writes are partial: only the `Some` fields of [`PageFields`] are touched.
/// Every successful write fans out the full updated document to all live
/// subscribers of that page, including the writer itself; the board core
/// relies on its own writes echoing back.
pub trait DocumentStore: Send + Sync {
    fn load(&self, page: &PageId) -> Result<Option<PageDocument>, StoreError>;

    /// Partial update. `Err(NotFound)` if the page is absent.
    fn write(&self, page: &PageId, fields: PageFields) -> Result<(), StoreError>;

    /// Live full-snapshot feed for one page. `Err(NotFound)` if the page is
    /// absent. Dropping the subscription is the teardown.
    fn subscribe(&self, page: &PageId) -> Result<PageSubscription, StoreError>;

    /// Create a page with its type's seed payload: board pages get the
    /// default three-column board, document pages empty content.
    fn create_page(&self, input: CreatePageInput) -> Result<PageDocument, StoreError>;

    /// Returns whether the page existed. Deletion closes its feed.
    fn delete_page(&self, page: &PageId) -> Result<bool, StoreError>;

    /// All pages, newest first.
    fn list_pages(&self) -> Result<Vec<PageDocument>, StoreError>;
}
