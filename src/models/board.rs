use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{ColumnId, TaskId};

/// The atomic work item on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    /// Short display text (the card title).
    pub content: String,
    /// Optional long-form text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-text assignee label. Not a foreign key into any user registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

/// An ordered bucket of tasks.
///
/// Every id in `task_ids` must reference a key in the owning board's task
/// map. Snapshots that violate this are repaired on read (see
/// [`Board::from_page`]) and the repaired form is what gets persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    /// Vertical task order, top to bottom.
    pub task_ids: Vec<TaskId>,
}

/// The full Kanban state for one page.
///
/// `column_order` is authoritative for left-to-right position; the two maps
/// have no meaningful iteration order. The board is a value type: every
/// mutation operation produces a new `Board`, the previous value is never
/// edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub tasks: HashMap<TaskId, Task>,
    pub columns: HashMap<ColumnId, Column>,
    pub column_order: Vec<ColumnId>,
}

impl Board {
    /// Tasks of one column in display order, skipping ids that fail to
    /// resolve. Unresolvable ids can appear transiently when a gesture races
    /// a concurrently arrived snapshot; rendering must tolerate them.
    pub fn tasks_for_column(&self, column_id: &ColumnId) -> Vec<&Task> {
        let Some(column) = self.columns.get(column_id) else {
            return Vec::new();
        };
        column
            .task_ids
            .iter()
            .filter_map(|id| self.tasks.get(id))
            .collect()
    }

    /// Columns in display order, skipping ids that fail to resolve.
    pub fn ordered_columns(&self) -> Vec<&Column> {
        self.column_order
            .iter()
            .filter_map(|id| self.columns.get(id))
            .collect()
    }

    /// Total number of task-id occurrences across all columns.
    pub fn referenced_task_count(&self) -> usize {
        self.columns.values().map(|c| c.task_ids.len()).sum()
    }
}
