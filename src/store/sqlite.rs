use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::models::{
    CreatePageInput, PageDocument, PageFields, PageId, PageType,
};

use super::feed::ChangeFeed;
use super::memory::seed_page;
use super::{schema, DocumentStore, PageSubscription, StoreError};

/// Durable page store: one row per page, board maps as JSON columns.
///
/// Snapshot fan-out is in-process only — two `SqliteStore` handles on the
/// same file see each other's writes on the next read, but only clones of
/// one handle share a live feed.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    feed: Arc<ChangeFeed>,
}

impl SqliteStore {
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Store path has no parent directory"))?;
        std::fs::create_dir_all(parent).map_err(anyhow::Error::from)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self::from_conn(conn))
    }

    pub fn open_default() -> Result<Self, StoreError> {
        let dirs = directories::ProjectDirs::from("", "", "pods-board")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("pods-board.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_conn(conn))
    }

    fn from_conn(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            feed: Arc::new(ChangeFeed::default()),
        }
    }

    pub fn migrate(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("store lock poisoned");
        schema::run_migrations(&conn).map_err(StoreError::Backend)
    }
}

impl DocumentStore for SqliteStore {
    fn load(&self, page: &PageId) -> Result<Option<PageDocument>, StoreError> {
        let conn = self.conn.lock().expect("store lock poisoned");
        load_row(&conn, page)
    }

    fn write(&self, page: &PageId, fields: PageFields) -> Result<(), StoreError> {
        let updated = {
            let conn = self.conn.lock().expect("store lock poisoned");
            let mut doc = load_row(&conn, page)?.ok_or(StoreError::NotFound)?;
            fields.apply_to(&mut doc);
            store_row(&conn, &doc)?;
            doc
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
        let conn = self.conn.lock().expect("store lock poisoned");
        conn.execute(
            "INSERT INTO pages (id, title, page_type, content, tasks, columns, column_order, owner_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                doc.id.as_str(),
                &doc.title,
                doc.page_type.as_str(),
                &doc.content,
                to_json_column(&doc.tasks)?,
                to_json_column(&doc.columns)?,
                to_json_column(&doc.column_order)?,
                &doc.owner_id,
                doc.created_at.to_rfc3339(),
            ),
        )?;
        tracing::info!(page = %doc.id, kind = doc.page_type.as_str(), "created page");
        Ok(doc)
    }

    fn delete_page(&self, page: &PageId) -> Result<bool, StoreError> {
        let rows = {
            let conn = self.conn.lock().expect("store lock poisoned");
            conn.execute("DELETE FROM pages WHERE id = ?", [page.as_str()])?
        };
        if rows > 0 {
            self.feed.close(page);
        }
        Ok(rows > 0)
    }

    fn list_pages(&self) -> Result<Vec<PageDocument>, StoreError> {
        let conn = self.conn.lock().expect("store lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, title, page_type, content, tasks, columns, column_order, owner_id, created_at
             FROM pages ORDER BY created_at DESC",
        )?;

        let pages = stmt
            .query_map([], map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pages)
    }
}

impl Clone for SqliteStore {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            feed: self.feed.clone(),
        }
    }
}

fn load_row(conn: &Connection, page: &PageId) -> Result<Option<PageDocument>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, page_type, content, tasks, columns, column_order, owner_id, created_at
         FROM pages WHERE id = ?",
    )?;
    let doc = stmt
        .query_row([page.as_str()], map_row)
        .optional()?;
    Ok(doc)
}

fn store_row(conn: &Connection, doc: &PageDocument) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE pages SET title = ?, content = ?, tasks = ?, columns = ?, column_order = ? WHERE id = ?",
        (
            &doc.title,
            &doc.content,
            to_json_column(&doc.tasks)?,
            to_json_column(&doc.columns)?,
            to_json_column(&doc.column_order)?,
            doc.id.as_str(),
        ),
    )?;
    Ok(())
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<PageDocument> {
    Ok(PageDocument {
        id: PageId::new(row.get::<_, String>(0)?),
        title: row.get(1)?,
        page_type: parse_page_type(row.get::<_, String>(2)?),
        content: row.get(3)?,
        tasks: from_json_column(row.get::<_, Option<String>>(4)?),
        columns: from_json_column(row.get::<_, Option<String>>(5)?),
        column_order: from_json_column(row.get::<_, Option<String>>(6)?),
        owner_id: row.get(7)?,
        created_at: parse_datetime(row.get::<_, String>(8)?),
    })
}

fn to_json_column<T: serde::Serialize>(value: &Option<T>) -> Result<Option<String>, StoreError> {
    value
        .as_ref()
        .map(|v| serde_json::to_string(v))
        .transpose()
        .map_err(Into::into)
}

fn from_json_column<T: serde::de::DeserializeOwned>(raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            // Malformed JSON behaves like an absent field; the loader's
            // normalization takes it from there.
            tracing::warn!(error = %e, "discarding malformed JSON column");
            None
        }
    }
}

fn parse_page_type(s: String) -> PageType {
    PageType::from_str(&s).unwrap_or(PageType::Document)
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
