use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use pods_board::board::ops::{self, ColumnDeletePolicy, IdGenerator, TaskPatch};
use pods_board::models::*;
use speculate2::speculate;

/// Deterministic id generator for assertions on created ids.
#[derive(Default)]
struct SeqIds(AtomicUsize);

impl IdGenerator for SeqIds {
    fn task_id(&self) -> TaskId {
        TaskId::new(format!("task-n{}", self.0.fetch_add(1, Ordering::Relaxed)))
    }

    fn column_id(&self) -> ColumnId {
        ColumnId::new(format!("col-n{}", self.0.fetch_add(1, Ordering::Relaxed)))
    }
}

fn task(id: &str) -> Task {
    Task {
        id: id.into(),
        content: format!("Task {id}"),
        description: None,
        assigned_to: None,
    }
}

fn column(id: &str, title: &str, task_ids: &[&str]) -> Column {
    Column {
        id: id.into(),
        title: title.to_string(),
        task_ids: task_ids.iter().map(|t| TaskId::from(*t)).collect(),
    }
}

/// Board with columns c1 (t1, t2) and c2 (empty).
fn board_fixture() -> Board {
    let mut tasks = HashMap::new();
    tasks.insert("t1".into(), task("t1"));
    tasks.insert("t2".into(), task("t2"));

    let mut columns = HashMap::new();
    columns.insert("c1".into(), column("c1", "To Do", &["t1", "t2"]));
    columns.insert("c2".into(), column("c2", "Done", &[]));

    Board {
        tasks,
        columns,
        column_order: vec!["c1".into(), "c2".into()],
    }
}

/// Referential integrity: every column-order entry resolves, every task
/// reference resolves, order covers exactly the column keys.
fn assert_integrity(board: &Board) {
    assert_eq!(board.column_order.len(), board.columns.len());
    for id in &board.column_order {
        assert!(board.columns.contains_key(id), "dangling column order entry {id}");
    }
    for col in board.columns.values() {
        for task_id in &col.task_ids {
            assert!(board.tasks.contains_key(task_id), "dangling task reference {task_id}");
        }
    }
}

fn task_ids<'a>(board: &'a Board, column: &str) -> Vec<&'a str> {
    board.columns[&ColumnId::from(column)]
        .task_ids
        .iter()
        .map(|t| t.as_str())
        .collect()
}

speculate! {
    before {
        let board = board_fixture();
    }

    describe "move_task" {
        it "moves a task to the head of another column" {
            let update = ops::move_task(&board, &"c1".into(), 0, &"c2".into(), 0, &"t1".into())
                .expect("move should apply");

            assert_eq!(task_ids(&update.board, "c1"), vec!["t2"]);
            assert_eq!(task_ids(&update.board, "c2"), vec!["t1"]);
            assert!(update.changed.columns);
            assert!(!update.changed.tasks);
            assert!(!update.changed.column_order);
            assert_integrity(&update.board);
        }

        it "reorders within a single column" {
            let update = ops::move_task(&board, &"c1".into(), 1, &"c1".into(), 0, &"t2".into())
                .expect("move should apply");

            assert_eq!(task_ids(&update.board, "c1"), vec!["t2", "t1"]);
            assert_integrity(&update.board);
        }

        it "preserves the total task reference count" {
            let before_count = board.referenced_task_count();
            let update = ops::move_task(&board, &"c1".into(), 1, &"c2".into(), 0, &"t2".into())
                .expect("move should apply");

            assert_eq!(update.board.referenced_task_count(), before_count);
            assert_eq!(update.board.tasks.len(), board.tasks.len());
        }

        it "is a no-op when source and destination positions are identical" {
            assert!(ops::move_task(&board, &"c1".into(), 0, &"c1".into(), 0, &"t1".into()).is_none());
        }

        it "drops a move whose reported source index is stale" {
            // Gesture says t2 is at index 0, but the snapshot has t1 there.
            assert!(ops::move_task(&board, &"c1".into(), 0, &"c2".into(), 0, &"t2".into()).is_none());
        }

        it "drops a move referencing an unknown source column" {
            assert!(ops::move_task(&board, &"ghost".into(), 0, &"c2".into(), 0, &"t1".into()).is_none());
        }

        it "drops a move referencing an unknown destination column" {
            assert!(ops::move_task(&board, &"c1".into(), 0, &"ghost".into(), 0, &"t1".into()).is_none());
        }

        it "drops a move whose destination index is out of bounds" {
            assert!(ops::move_task(&board, &"c1".into(), 0, &"c2".into(), 5, &"t1".into()).is_none());
        }

        it "does not mutate the input board" {
            let snapshot = board.clone();
            let _ = ops::move_task(&board, &"c1".into(), 0, &"c2".into(), 0, &"t1".into());
            assert_eq!(board, snapshot);
        }
    }

    describe "move_column" {
        it "reorders the column order" {
            let update = ops::move_column(&board, 0, 1, &"c1".into())
                .expect("move should apply");

            assert_eq!(update.board.column_order, vec![ColumnId::from("c2"), ColumnId::from("c1")]);
            assert!(update.changed.column_order);
            assert!(!update.changed.columns);
            assert_integrity(&update.board);
        }

        it "is a no-op when positions are identical" {
            assert!(ops::move_column(&board, 0, 0, &"c1".into()).is_none());
        }

        it "drops a move whose reported position is stale" {
            assert!(ops::move_column(&board, 1, 0, &"c1".into()).is_none());
        }
    }

    describe "add_task" {
        it "appends a task to the end of the column" {
            let ids = SeqIds::default();
            let (id, update) = ops::add_task(&board, &"c1".into(), "New item", &ids)
                .expect("add should apply");

            assert_eq!(task_ids(&update.board, "c1"), vec!["t1", "t2", id.as_str()]);
            let created = &update.board.tasks[&id];
            assert_eq!(created.content, "New item");
            assert!(created.description.is_none());
            assert!(created.assigned_to.is_none());
            assert!(update.changed.tasks);
            assert!(update.changed.columns);
            assert_integrity(&update.board);
        }

        it "is a no-op for an unknown column" {
            let ids = SeqIds::default();
            assert!(ops::add_task(&board, &"ghost".into(), "x", &ids).is_none());
        }
    }

    describe "update_task" {
        it "merges a content patch" {
            let update = ops::update_task(&board, &"t1".into(), &TaskPatch {
                content: Some("Rewritten".to_string()),
                ..TaskPatch::default()
            }).expect("update should apply");

            assert_eq!(update.board.tasks[&TaskId::from("t1")].content, "Rewritten");
            // Untouched fields survive.
            assert!(update.board.tasks[&TaskId::from("t1")].description.is_none());
            assert!(update.changed.tasks);
            assert!(!update.changed.columns);
        }

        it "merges description and assignee independently of content" {
            let update = ops::update_task(&board, &"t2".into(), &TaskPatch {
                description: Some("details".to_string()),
                assigned_to: Some("ana".to_string()),
                ..TaskPatch::default()
            }).expect("update should apply");

            let t2 = &update.board.tasks[&TaskId::from("t2")];
            assert_eq!(t2.content, "Task t2");
            assert_eq!(t2.description.as_deref(), Some("details"));
            assert_eq!(t2.assigned_to.as_deref(), Some("ana"));
        }

        it "is a silent no-op for an unknown task id" {
            let snapshot = board.clone();
            assert!(ops::update_task(&board, &"t-unknown".into(), &TaskPatch {
                content: Some("x".to_string()),
                ..TaskPatch::default()
            }).is_none());
            assert_eq!(board, snapshot);
        }
    }

    describe "rename_column" {
        it "replaces the column title" {
            let update = ops::rename_column(&board, &"c2".into(), "Shipped")
                .expect("rename should apply");

            assert_eq!(update.board.columns[&ColumnId::from("c2")].title, "Shipped");
            assert!(update.changed.columns);
        }

        it "is a no-op for an unknown column" {
            assert!(ops::rename_column(&board, &"ghost".into(), "x").is_none());
        }
    }

    describe "add_column" {
        it "appends an empty column to the order" {
            let ids = SeqIds::default();
            let (id, update) = ops::add_column(&board, "Backlog", &ids);

            assert_eq!(update.board.column_order.len(), 3);
            assert_eq!(update.board.column_order.last(), Some(&id));
            let created = &update.board.columns[&id];
            assert_eq!(created.title, "Backlog");
            assert!(created.task_ids.is_empty());
            assert!(update.changed.columns);
            assert!(update.changed.column_order);
            assert_integrity(&update.board);
        }
    }

    describe "delete_column" {
        it "cascades: removes the column, its order entry and its tasks" {
            let update = ops::delete_column(&board, &"c1".into(), ColumnDeletePolicy::CascadeTasks)
                .expect("delete should apply");

            assert!(!update.board.columns.contains_key(&ColumnId::from("c1")));
            assert!(!update.board.column_order.contains(&ColumnId::from("c1")));
            assert!(!update.board.tasks.contains_key(&TaskId::from("t1")));
            assert!(!update.board.tasks.contains_key(&TaskId::from("t2")));
            assert!(update.changed.tasks);
            assert!(update.changed.columns);
            assert!(update.changed.column_order);
            assert_integrity(&update.board);
        }

        it "orphans: keeps the tasks in the map when asked to" {
            let update = ops::delete_column(&board, &"c1".into(), ColumnDeletePolicy::OrphanTasks)
                .expect("delete should apply");

            assert!(!update.board.columns.contains_key(&ColumnId::from("c1")));
            assert!(update.board.tasks.contains_key(&TaskId::from("t1")));
            assert!(update.board.tasks.contains_key(&TaskId::from("t2")));
            assert!(!update.changed.tasks);
            assert_integrity(&update.board);
        }

        it "is a no-op for an unknown column" {
            assert!(ops::delete_column(&board, &"ghost".into(), ColumnDeletePolicy::CascadeTasks).is_none());
        }
    }

    describe "delete_task" {
        it "removes the task from its column and the task map" {
            let update = ops::delete_task(&board, &"t1".into(), &"c1".into())
                .expect("delete should apply");

            assert_eq!(task_ids(&update.board, "c1"), vec!["t2"]);
            assert!(!update.board.tasks.contains_key(&TaskId::from("t1")));
            assert_integrity(&update.board);
        }

        it "empties a single-task column" {
            let update = ops::delete_task(&board, &"t1".into(), &"c1".into())
                .expect("delete should apply");
            let update = ops::delete_task(&update.board, &"t2".into(), &"c1".into())
                .expect("delete should apply");

            assert!(task_ids(&update.board, "c1").is_empty());
            assert!(update.board.tasks.is_empty());
        }

        it "is a no-op for an unknown task" {
            assert!(ops::delete_task(&board, &"ghost".into(), &"c1".into()).is_none());
        }
    }

    describe "operation sequences" {
        it "keeps referential integrity across a mixed sequence" {
            let ids = SeqIds::default();
            let (backlog, update) = ops::add_column(&board, "Backlog", &ids);
            let (new_task, update) = ops::add_task(&update.board, &backlog, "triage", &ids)
                .expect("add task");
            let update = ops::move_task(&update.board, &backlog, 0, &"c2".into(), 0, &new_task)
                .expect("move task");
            let update = ops::move_column(&update.board, 2, 0, &backlog)
                .expect("move column");
            let update = ops::delete_column(&update.board, &"c1".into(), ColumnDeletePolicy::CascadeTasks)
                .expect("delete column");

            assert_integrity(&update.board);
            assert_eq!(update.board.column_order.first(), Some(&backlog));
            assert_eq!(task_ids(&update.board, "c2"), vec![new_task.as_str()]);
        }
    }
}
