use std::sync::Arc;

use tokio::time::Duration;

use crate::models::{Board, ColumnId, PageFields, PageId, TaskId};
use crate::store::{DocumentStore, PageSubscription, StoreError};

use super::debounce::DebouncedWriter;
use super::ops::{self, BoardUpdate, ColumnDeletePolicy, IdGenerator, TaskPatch};

/// The normalized reorder gesture the presentation layer hands to the core.
/// Pixel, animation and hit-testing concerns stay on the rendering side;
/// this is the entire drag-and-drop contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderEvent {
    Task {
        source_column: ColumnId,
        source_index: usize,
        dest_column: ColumnId,
        dest_index: usize,
        task: TaskId,
    },
    Column {
        source_index: usize,
        dest_index: usize,
        column: ColumnId,
    },
}

/// A live editing session on one board page.
///
/// Owns the snapshot subscription, the in-memory board (a read-through,
/// write-back cache of the remote document), and the persistence policy:
/// structural changes write immediately, text edits are debounced. The
/// session is single-writer locally (mutations replace the whole board
/// value), while the remote document stays last-write-wins across clients.
///
/// Dropping the session tears down the subscription. Call [`flush`] first if
/// an in-flight text edit must not be lost.
///
/// [`flush`]: BoardSession::flush
pub struct BoardSession {
    store: Arc<dyn DocumentStore>,
    ids: Arc<dyn IdGenerator>,
    page_id: PageId,
    title: String,
    board: Board,
    subscription: PageSubscription,
    writer: DebouncedWriter,
}

impl BoardSession {
    /// Open a session on an existing page. `Err(StoreError::NotFound)` means
    /// the page is gone and the caller should navigate away.
    pub fn open(
        store: Arc<dyn DocumentStore>,
        ids: Arc<dyn IdGenerator>,
        page_id: PageId,
    ) -> Result<Self, StoreError> {
        let page = store.load(&page_id)?.ok_or(StoreError::NotFound)?;
        let subscription = store.subscribe(&page_id)?;

        Ok(Self {
            title: page.title.clone(),
            board: Board::from_page(&page),
            store,
            ids,
            page_id,
            subscription,
            writer: DebouncedWriter::default(),
        })
    }

    /// Same as [`open`], with an explicit debounce window.
    ///
    /// [`open`]: BoardSession::open
    pub fn open_with_debounce(
        store: Arc<dyn DocumentStore>,
        ids: Arc<dyn IdGenerator>,
        page_id: PageId,
        window: Duration,
    ) -> Result<Self, StoreError> {
        let mut session = Self::open(store, ids, page_id)?;
        session.writer = DebouncedWriter::new(window);
        Ok(session)
    }

    pub fn page_id(&self) -> &PageId {
        &self.page_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Drive the session until the next remote snapshot replaces the local
    /// board. Also services the debounce deadline internally, so callers
    /// only ever await this one future between gestures.
    ///
    /// A write failure from a due debounced save surfaces here as `Err`;
    /// local state is untouched and the save is re-armed. A closed feed
    /// (page deleted, store gone) is `Err(StoreError::SubscriptionClosed)`
    /// and is terminal; there is no automatic resubscribe.
    pub async fn next_change(&mut self) -> Result<(), StoreError> {
        loop {
            tokio::select! {
                snapshot = self.subscription.changed() => {
                    let page = snapshot?;
                    tracing::debug!(page = %self.page_id, "applying remote snapshot");
                    self.title = page.title.clone();
                    self.board = Board::from_page(&page);
                    return Ok(());
                }
                _ = self.writer.deadline() => {
                    self.writer.flush(self.store.as_ref(), &self.page_id)?;
                }
            }
        }
    }

    /// Write any pending debounced edit now. The blur/unmount path.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        self.writer.flush(self.store.as_ref(), &self.page_id)
    }

    // ------------------------------------------------------------
    // Structural mutations (immediate persistence)
    // ------------------------------------------------------------

    /// Apply a drag gesture. Stale or unresolvable gestures are dropped
    /// silently; they mean a snapshot arrived mid-drag.
    pub fn apply_reorder(&mut self, event: ReorderEvent) -> Result<(), StoreError> {
        let update = match &event {
            ReorderEvent::Task {
                source_column,
                source_index,
                dest_column,
                dest_index,
                task,
            } => ops::move_task(
                &self.board,
                source_column,
                *source_index,
                dest_column,
                *dest_index,
                task,
            ),
            ReorderEvent::Column {
                source_index,
                dest_index,
                column,
            } => ops::move_column(&self.board, *source_index, *dest_index, column),
        };

        match update {
            Some(update) => self.commit_now(update),
            None => Ok(()),
        }
    }

    /// Create a task at the end of a column. `Ok(None)` if the column no
    /// longer exists.
    pub fn add_task(
        &mut self,
        column_id: &ColumnId,
        content: &str,
    ) -> Result<Option<TaskId>, StoreError> {
        match ops::add_task(&self.board, column_id, content, self.ids.as_ref()) {
            Some((id, update)) => {
                self.commit_now(update)?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    /// Create an empty column at the end of the board.
    pub fn add_column(&mut self, title: &str) -> Result<ColumnId, StoreError> {
        let (id, update) = ops::add_column(&self.board, title, self.ids.as_ref());
        self.commit_now(update)?;
        Ok(id)
    }

    /// Delete a column, cascading its tasks (the product default).
    pub fn delete_column(&mut self, column_id: &ColumnId) -> Result<(), StoreError> {
        self.delete_column_with(column_id, ColumnDeletePolicy::CascadeTasks)
    }

    pub fn delete_column_with(
        &mut self,
        column_id: &ColumnId,
        policy: ColumnDeletePolicy,
    ) -> Result<(), StoreError> {
        match ops::delete_column(&self.board, column_id, policy) {
            Some(update) => self.commit_now(update),
            None => Ok(()),
        }
    }

    pub fn delete_task(
        &mut self,
        task_id: &TaskId,
        column_id: &ColumnId,
    ) -> Result<(), StoreError> {
        match ops::delete_task(&self.board, task_id, column_id) {
            Some(update) => self.commit_now(update),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------
    // Text edits (debounced persistence)
    // ------------------------------------------------------------

    /// Merge a patch into a task. Unknown ids are a silent no-op: the UI
    /// only ever derives task ids from state it already holds, so a miss
    /// means a snapshot removed the task mid-edit.
    pub fn update_task(&mut self, task_id: &TaskId, patch: TaskPatch) {
        if let Some(update) = ops::update_task(&self.board, task_id, &patch) {
            self.commit_debounced(update);
        }
    }

    pub fn rename_column(&mut self, column_id: &ColumnId, new_title: &str) {
        if let Some(update) = ops::rename_column(&self.board, column_id, new_title) {
            self.commit_debounced(update);
        }
    }

    /// Edit the page title (lives on the page document, not the board).
    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
        self.writer.queue(PageFields::title(title));
    }

    // ------------------------------------------------------------

    /// Apply an update locally and persist its changed fields right away,
    /// folding in any pending debounced edit so one write carries both and
    /// the store never sees them out of order. On failure the local state
    /// stays (optimistic, never rolled back) and the whole write is
    /// re-queued for the debounce retry path.
    fn commit_now(&mut self, update: BoardUpdate) -> Result<(), StoreError> {
        let fields = update.changed.to_fields(&update.board);
        self.board = update.board;

        let mut merged = self.writer.take_pending();
        merged.merge(fields);

        match self.store.write(&self.page_id, merged.clone()) {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(page = %self.page_id, error = %e, "board write failed, keeping local state");
                self.writer.queue(merged);
                Err(e)
            }
        }
    }

    /// Apply an update locally and queue its changed fields behind the
    /// debounce window.
    fn commit_debounced(&mut self, update: BoardUpdate) {
        let fields = update.changed.to_fields(&update.board);
        self.board = update.board;
        self.writer.queue(fields);
    }
}
