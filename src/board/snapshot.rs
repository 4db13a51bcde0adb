//! Building a consistent [`Board`] from a raw page snapshot.
//!
//! The loader boundary is where all shape-checking happens: remote documents
//! can miss board fields entirely (fresh pages), or reference ids that no
//! longer resolve (interrupted writes from other clients, hand-edited data).
//! Everything downstream of [`Board::from_page`] may assume the invariants
//! hold — `column_order` is exactly the column keys, every referenced task id
//! resolves, and no task id is claimed by two columns.

use std::collections::{HashMap, HashSet};

use crate::models::{Board, Column, ColumnId, PageDocument, TaskId};

impl Board {
    /// The board a fresh page starts with: three empty columns.
    pub fn default_board() -> Board {
        let columns = [
            ("col-1", "To Do"),
            ("col-2", "In Progress"),
            ("col-3", "Done"),
        ];

        let mut board = Board {
            tasks: HashMap::new(),
            columns: HashMap::new(),
            column_order: Vec::new(),
        };
        for (id, title) in columns {
            let id = ColumnId::from(id);
            board.columns.insert(
                id.clone(),
                Column {
                    id: id.clone(),
                    title: title.to_string(),
                    task_ids: Vec::new(),
                },
            );
            board.column_order.push(id);
        }
        board
    }

    /// Rebuild the board wholesale from one snapshot.
    ///
    /// Pages without board fields (or with an empty column map) get the
    /// default board. Corrupt references are dropped here and never written
    /// back: a later persist writes the repaired form.
    pub fn from_page(page: &PageDocument) -> Board {
        let (columns, column_order) = match &page.columns {
            Some(columns) if !columns.is_empty() => (
                columns.clone(),
                page.column_order.clone().unwrap_or_default(),
            ),
            _ => {
                let default = Board::default_board();
                (default.columns, default.column_order)
            }
        };
        // Tasks survive even when the column shape had to be replaced; they
        // come back as orphans rather than being silently discarded.
        let tasks = page.tasks.clone().unwrap_or_default();

        normalize(page, tasks, columns, column_order)
    }
}

fn normalize(
    page: &PageDocument,
    tasks: HashMap<TaskId, crate::models::Task>,
    mut columns: HashMap<ColumnId, Column>,
    column_order: Vec<ColumnId>,
) -> Board {
    // Column order: keep known, deduped ids; append columns the order missed
    // (sorted, so repair is deterministic).
    let mut seen_columns = HashSet::new();
    let mut order: Vec<ColumnId> = column_order
        .into_iter()
        .filter(|id| {
            let keep = columns.contains_key(id) && seen_columns.insert(id.clone());
            if !keep {
                tracing::warn!(page = %page.id, column = %id, "dropping unresolvable column order entry");
            }
            keep
        })
        .collect();

    let mut missing: Vec<ColumnId> = columns
        .keys()
        .filter(|id| !seen_columns.contains(*id))
        .cloned()
        .collect();
    if !missing.is_empty() {
        tracing::warn!(page = %page.id, count = missing.len(), "columns missing from column order, appending");
        missing.sort();
        order.extend(missing);
    }

    // Task references: walk columns in display order so a task id claimed by
    // two columns stays with its leftmost claimant.
    let mut claimed = HashSet::new();
    for column_id in &order {
        let column = columns.get_mut(column_id).expect("order entry verified above");
        column.task_ids.retain(|id| {
            let keep = tasks.contains_key(id) && claimed.insert(id.clone());
            if !keep {
                tracing::warn!(page = %page.id, column = %column_id, task = %id, "dropping unresolvable task reference");
            }
            keep
        });
    }

    // Tasks in the map but referenced by no column are left alone; orphaning
    // is a legal state under ColumnDeletePolicy::OrphanTasks.
    Board {
        tasks,
        columns,
        column_order: order,
    }
}
