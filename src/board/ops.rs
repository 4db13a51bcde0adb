//! Pure mutation operations over [`Board`] values.
//!
//! Every operation takes the current board by reference and returns
//! `Option<BoardUpdate>`: `Some` carries the new board plus the scoped
//! fields that changed, `None` means the operation was a no-op. No-ops are
//! silent on purpose — gesture-derived ids and indices can race a
//! concurrently arrived snapshot, so an unknown reference or a stale index
//! must never panic or error (it resolves itself on the next snapshot).
//!
//! Operations never perform I/O and never mutate their input.

use uuid::Uuid;

use crate::models::{Board, Column, ColumnId, PageFields, Task, TaskId};

/// Generates ids unique within a board's lifetime.
///
/// Injected rather than called inline so the operations stay deterministic
/// under test. A collision is a correctness bug in the generator, not a
/// runtime condition the board recovers from.
pub trait IdGenerator: Send + Sync {
    fn task_id(&self) -> TaskId;
    fn column_id(&self) -> ColumnId;
}

/// Production generator: random v4 uuids with a type prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn task_id(&self) -> TaskId {
        TaskId::new(format!("task-{}", Uuid::new_v4()))
    }

    fn column_id(&self) -> ColumnId {
        ColumnId::new(format!("col-{}", Uuid::new_v4()))
    }
}

/// Which top-level board fields an operation touched. Drives scoped
/// persistence: only changed fields go into the store write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangedFields {
    pub tasks: bool,
    pub columns: bool,
    pub column_order: bool,
}

impl ChangedFields {
    pub fn tasks() -> Self {
        Self {
            tasks: true,
            ..Self::default()
        }
    }

    pub fn columns() -> Self {
        Self {
            columns: true,
            ..Self::default()
        }
    }

    pub fn column_order() -> Self {
        Self {
            column_order: true,
            ..Self::default()
        }
    }

    /// The partial store write for these changes against `board`.
    pub fn to_fields(&self, board: &Board) -> PageFields {
        PageFields {
            tasks: self.tasks.then(|| board.tasks.clone()),
            columns: self.columns.then(|| board.columns.clone()),
            column_order: self.column_order.then(|| board.column_order.clone()),
            ..PageFields::default()
        }
    }
}

/// The result of a non-no-op operation: a fresh board value and the scope of
/// what changed in it.
#[derive(Debug, Clone)]
pub struct BoardUpdate {
    pub board: Board,
    pub changed: ChangedFields,
}

/// What happens to a deleted column's tasks.
///
/// The original product silently cascaded; this makes it a named decision so
/// a trash/undo flow can opt into orphaning instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDeletePolicy {
    /// Remove the column's tasks from the task map along with it.
    CascadeTasks,
    /// Keep the tasks in the map, unreferenced by any column.
    OrphanTasks,
}

/// Partial task edit. `Some` fields overwrite, `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub content: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<String>,
}

/// Move a task from `source_index` in `source` to `dest_index` in `dest`.
///
/// Within one column this is a reorder: the id is spliced out and re-inserted
/// against the shortened list, matching drag-gesture index semantics.
/// Precondition: `task_id` is the element currently at `source_index` — a
/// mismatch means the gesture was computed against a stale snapshot, and the
/// whole move is dropped.
pub fn move_task(
    board: &Board,
    source: &ColumnId,
    source_index: usize,
    dest: &ColumnId,
    dest_index: usize,
    task_id: &TaskId,
) -> Option<BoardUpdate> {
    if source == dest && source_index == dest_index {
        return None;
    }

    let source_column = board.columns.get(source)?;
    if source_column.task_ids.get(source_index) != Some(task_id) {
        tracing::warn!(
            task = %task_id,
            column = %source,
            index = source_index,
            "move dropped: task is not at the reported source position"
        );
        return None;
    }

    let mut board = board.clone();

    if source == dest {
        let column = board.columns.get_mut(source)?;
        column.task_ids.remove(source_index);
        if dest_index > column.task_ids.len() {
            return None;
        }
        column.task_ids.insert(dest_index, task_id.clone());
    } else {
        if !board.columns.contains_key(dest) {
            return None;
        }
        board
            .columns
            .get_mut(source)?
            .task_ids
            .remove(source_index);
        let dest_column = board.columns.get_mut(dest)?;
        if dest_index > dest_column.task_ids.len() {
            return None;
        }
        dest_column.task_ids.insert(dest_index, task_id.clone());
    }

    Some(BoardUpdate {
        board,
        changed: ChangedFields::columns(),
    })
}

/// Move a column from `source_index` to `dest_index` in the column order.
pub fn move_column(
    board: &Board,
    source_index: usize,
    dest_index: usize,
    column_id: &ColumnId,
) -> Option<BoardUpdate> {
    if source_index == dest_index {
        return None;
    }
    if board.column_order.get(source_index) != Some(column_id) {
        tracing::warn!(
            column = %column_id,
            index = source_index,
            "column move dropped: column is not at the reported position"
        );
        return None;
    }

    let mut board = board.clone();
    board.column_order.remove(source_index);
    if dest_index > board.column_order.len() {
        return None;
    }
    board.column_order.insert(dest_index, column_id.clone());

    Some(BoardUpdate {
        board,
        changed: ChangedFields::column_order(),
    })
}

/// Create a task at the end of `column_id` with the given title. Returns
/// the new task's id alongside the update.
pub fn add_task(
    board: &Board,
    column_id: &ColumnId,
    content: &str,
    ids: &dyn IdGenerator,
) -> Option<(TaskId, BoardUpdate)> {
    if !board.columns.contains_key(column_id) {
        return None;
    }

    let id = ids.task_id();
    debug_assert!(
        !board.tasks.contains_key(&id),
        "id generator produced a colliding task id"
    );

    let mut board = board.clone();
    board.tasks.insert(
        id.clone(),
        Task {
            id: id.clone(),
            content: content.to_string(),
            description: None,
            assigned_to: None,
        },
    );
    board
        .columns
        .get_mut(column_id)?
        .task_ids
        .push(id.clone());

    Some((
        id,
        BoardUpdate {
            board,
            changed: ChangedFields {
                tasks: true,
                columns: true,
                column_order: false,
            },
        },
    ))
}

/// Merge a patch into an existing task. Unknown ids are a silent no-op.
pub fn update_task(board: &Board, task_id: &TaskId, patch: &TaskPatch) -> Option<BoardUpdate> {
    if !board.tasks.contains_key(task_id) {
        return None;
    }

    let mut board = board.clone();
    let task = board.tasks.get_mut(task_id)?;
    if let Some(content) = &patch.content {
        task.content = content.clone();
    }
    if let Some(description) = &patch.description {
        task.description = Some(description.clone());
    }
    if let Some(assigned_to) = &patch.assigned_to {
        task.assigned_to = Some(assigned_to.clone());
    }

    Some(BoardUpdate {
        board,
        changed: ChangedFields::tasks(),
    })
}

/// Replace a column's display title.
pub fn rename_column(board: &Board, column_id: &ColumnId, new_title: &str) -> Option<BoardUpdate> {
    if !board.columns.contains_key(column_id) {
        return None;
    }

    let mut board = board.clone();
    board.columns.get_mut(column_id)?.title = new_title.to_string();

    Some(BoardUpdate {
        board,
        changed: ChangedFields::columns(),
    })
}

/// Create an empty column at the end of the column order. Returns the new
/// column's id alongside the update.
pub fn add_column(board: &Board, title: &str, ids: &dyn IdGenerator) -> (ColumnId, BoardUpdate) {
    let id = ids.column_id();
    debug_assert!(
        !board.columns.contains_key(&id),
        "id generator produced a colliding column id"
    );

    let mut board = board.clone();
    board.columns.insert(
        id.clone(),
        Column {
            id: id.clone(),
            title: title.to_string(),
            task_ids: Vec::new(),
        },
    );
    board.column_order.push(id.clone());

    (
        id,
        BoardUpdate {
            board,
            changed: ChangedFields {
                tasks: false,
                columns: true,
                column_order: true,
            },
        },
    )
}

/// Remove a column from the board. What happens to its tasks is the
/// caller's named [`ColumnDeletePolicy`] decision.
pub fn delete_column(
    board: &Board,
    column_id: &ColumnId,
    policy: ColumnDeletePolicy,
) -> Option<BoardUpdate> {
    if !board.columns.contains_key(column_id) {
        return None;
    }

    let mut board = board.clone();
    let column = board.columns.remove(column_id)?;
    board.column_order.retain(|id| id != column_id);

    let mut tasks_changed = false;
    if policy == ColumnDeletePolicy::CascadeTasks {
        for task_id in &column.task_ids {
            tasks_changed |= board.tasks.remove(task_id).is_some();
        }
    }

    Some(BoardUpdate {
        board,
        changed: ChangedFields {
            tasks: tasks_changed,
            columns: true,
            column_order: true,
        },
    })
}

/// Remove a task from its column and from the task map.
pub fn delete_task(board: &Board, task_id: &TaskId, column_id: &ColumnId) -> Option<BoardUpdate> {
    let in_column = board
        .columns
        .get(column_id)
        .is_some_and(|c| c.task_ids.contains(task_id));
    if !in_column && !board.tasks.contains_key(task_id) {
        return None;
    }

    let mut board = board.clone();
    if let Some(column) = board.columns.get_mut(column_id) {
        column.task_ids.retain(|id| id != task_id);
    }
    board.tasks.remove(task_id);

    Some(BoardUpdate {
        board,
        changed: ChangedFields {
            tasks: true,
            columns: true,
            column_order: false,
        },
    })
}
