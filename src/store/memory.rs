use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::models::{
    Board, CreatePageInput, PageDocument, PageFields, PageId, PageType,
};

use super::feed::ChangeFeed;
use super::{DocumentStore, PageSubscription, StoreError};

/// In-process page store.
///
/// Backs every test in the repo and doubles as the store for single-process
/// embedding. Cheap to clone; clones share the same pages and feed.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pages: Arc<Mutex<HashMap<PageId, PageDocument>>>,
    feed: Arc<ChangeFeed>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self, page: &PageId) -> Result<Option<PageDocument>, StoreError> {
        let pages = self.pages.lock().expect("page map lock poisoned");
        Ok(pages.get(page).cloned())
    }

    fn write(&self, page: &PageId, fields: PageFields) -> Result<(), StoreError> {
        let updated = {
            let mut pages = self.pages.lock().expect("page map lock poisoned");
            let doc = pages.get_mut(page).ok_or(StoreError::NotFound)?;
            fields.apply_to(doc);
            doc.clone()
        };
        self.feed.publish(page, &updated);
        Ok(())
    }

    fn subscribe(&self, page: &PageId) -> Result<PageSubscription, StoreError> {
        let current = self.load(page)?.ok_or(StoreError::NotFound)?;
        Ok(self.feed.subscribe(page, current))
    }

    fn create_page(&self, input: CreatePageInput) -> Result<PageDocument, StoreError> {
        let doc = seed_page(input);
        let mut pages = self.pages.lock().expect("page map lock poisoned");
        pages.insert(doc.id.clone(), doc.clone());
        tracing::info!(page = %doc.id, kind = doc.page_type.as_str(), "created page");
        Ok(doc)
    }

    fn delete_page(&self, page: &PageId) -> Result<bool, StoreError> {
        let existed = {
            let mut pages = self.pages.lock().expect("page map lock poisoned");
            pages.remove(page).is_some()
        };
        if existed {
            self.feed.close(page);
        }
        Ok(existed)
    }

    fn list_pages(&self) -> Result<Vec<PageDocument>, StoreError> {
        let pages = self.pages.lock().expect("page map lock poisoned");
        let mut all: Vec<PageDocument> = pages.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}

/// Build a new page document with its type's seed payload.
pub(crate) fn seed_page(input: CreatePageInput) -> PageDocument {
    let mut doc = PageDocument {
        id: PageId::new(Uuid::new_v4().to_string()),
        title: input.title,
        page_type: input.page_type,
        content: None,
        tasks: None,
        columns: None,
        column_order: None,
        owner_id: input.owner_id,
        created_at: Utc::now(),
    };

    match input.page_type {
        PageType::Board => {
            let board = Board::default_board();
            doc.tasks = Some(board.tasks);
            doc.columns = Some(board.columns);
            doc.column_order = Some(board.column_order);
        }
        PageType::Document => {
            doc.content = Some(String::new());
        }
    }
    doc
}
