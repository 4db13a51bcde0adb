use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Column, ColumnId, PageId, Task, TaskId};

/// What kind of content a page carries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    /// Free-form notes page; payload is the `content` field.
    Document,
    /// Kanban page; payload is the embedded board fields.
    Board,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Board => "board",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "document" => Some(Self::Document),
            "board" => Some(Self::Board),
            _ => None,
        }
    }
}

/// One page document as held by the store.
///
/// Board fields are optional at this boundary: document pages never have
/// them, and legacy board pages may lack some of them. Normalization into a
/// guaranteed-consistent [`crate::models::Board`] happens in the loader, not
/// here — the rest of the core never re-checks for missing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDocument {
    pub id: PageId,
    pub title: String,
    #[serde(rename = "type")]
    pub page_type: PageType,
    /// Notes payload for document pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<HashMap<TaskId, Task>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<HashMap<ColumnId, Column>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_order: Option<Vec<ColumnId>>,
    /// Identity-provider stamp of the creating user. Opaque to the core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a page. Board pages are seeded with the default
/// three-column board, document pages with empty content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageInput {
    pub title: String,
    #[serde(rename = "type")]
    pub page_type: PageType,
    #[serde(default)]
    pub owner_id: Option<String>,
}

/// A partial page update: the unit of a store write.
///
/// Only `Some` fields are written; everything else on the document is left
/// untouched. `merge` combines two partial updates with last-writer-wins per
/// field, which is exactly the coalescing rule the debounced writer needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<HashMap<TaskId, Task>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<HashMap<ColumnId, Column>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_order: Option<Vec<ColumnId>>,
}

impl PageFields {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.tasks.is_none()
            && self.columns.is_none()
            && self.column_order.is_none()
    }

    /// Overlay `newer` on top of `self`, field by field.
    pub fn merge(&mut self, newer: PageFields) {
        if newer.title.is_some() {
            self.title = newer.title;
        }
        if newer.content.is_some() {
            self.content = newer.content;
        }
        if newer.tasks.is_some() {
            self.tasks = newer.tasks;
        }
        if newer.columns.is_some() {
            self.columns = newer.columns;
        }
        if newer.column_order.is_some() {
            self.column_order = newer.column_order;
        }
    }

    /// Apply this partial update to a document in place.
    pub fn apply_to(&self, page: &mut PageDocument) {
        if let Some(title) = &self.title {
            page.title = title.clone();
        }
        if let Some(content) = &self.content {
            page.content = Some(content.clone());
        }
        if let Some(tasks) = &self.tasks {
            page.tasks = Some(tasks.clone());
        }
        if let Some(columns) = &self.columns {
            page.columns = Some(columns.clone());
        }
        if let Some(order) = &self.column_order {
            page.column_order = Some(order.clone());
        }
    }
}
