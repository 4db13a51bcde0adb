//! The debounced save state machine.
//!
//! Free-text edits (task content, column titles, the page title) are written
//! only after a quiet period since the last keystroke; each new edit resets
//! the timer. The machine is `Idle -> Pending { deadline } -> Idle`, with an
//! explicit [`DebouncedWriter::flush`] for the blur/teardown path so
//! correctness does not depend on every caller re-implementing the timer
//! dance.

use tokio::time::{sleep_until, Duration, Instant};

use crate::models::{PageFields, PageId};
use crate::store::{DocumentStore, StoreError};

/// Quiet period after the last edit before a write is issued.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(900);

#[derive(Debug, Clone, Copy)]
enum SaveState {
    Idle,
    Pending { deadline: Instant },
}

/// Coalesces partial page writes behind a debounce window.
///
/// Pending fields merge with last-writer-wins per field, so N keystrokes on
/// one field collapse into a single write carrying the final value. The
/// write itself is synchronous; a failed write re-queues the fields and
/// re-arms the window, keeping the local state as the provisional truth.
#[derive(Debug)]
pub struct DebouncedWriter {
    window: Duration,
    state: SaveState,
    pending: PageFields,
}

impl DebouncedWriter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: SaveState::Idle,
            pending: PageFields::default(),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, SaveState::Idle)
    }

    /// Merge fields into the pending write and reset the deadline. A pending
    /// timer is replaced, never stacked.
    pub fn queue(&mut self, fields: PageFields) {
        if fields.is_empty() {
            return;
        }
        self.pending.merge(fields);
        self.state = SaveState::Pending {
            deadline: Instant::now() + self.window,
        };
    }

    /// Take the pending fields out of the machine, returning it to idle.
    /// Used when a structural write is about to happen anyway and wants to
    /// carry the pending text edits along in the same write.
    pub fn take_pending(&mut self) -> PageFields {
        self.state = SaveState::Idle;
        std::mem::take(&mut self.pending)
    }

    /// Resolves when the current deadline passes. Never resolves while idle,
    /// which makes it safe to park in a `select!` arm.
    pub async fn deadline(&self) {
        match self.state {
            SaveState::Pending { deadline } => sleep_until(deadline).await,
            SaveState::Idle => std::future::pending().await,
        }
    }

    /// Write the pending fields now, regardless of the deadline. No-op when
    /// idle. On failure the fields stay queued and the window re-arms, so
    /// the edit is retried rather than lost.
    pub fn flush(&mut self, store: &dyn DocumentStore, page: &PageId) -> Result<(), StoreError> {
        let fields = self.take_pending();
        if fields.is_empty() {
            return Ok(());
        }

        match store.write(page, fields.clone()) {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(page = %page, error = %e, "debounced write failed, re-queueing");
                self.queue(fields);
                Err(e)
            }
        }
    }
}

impl Default for DebouncedWriter {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_and_take_pending_drive_the_state_machine() {
        let mut writer = DebouncedWriter::default();
        assert!(writer.is_idle());

        writer.queue(PageFields::title("draft"));
        assert!(!writer.is_idle());

        let fields = writer.take_pending();
        assert_eq!(fields.title.as_deref(), Some("draft"));
        assert!(writer.is_idle());
        assert!(writer.take_pending().is_empty());
    }

    #[test]
    fn empty_fields_do_not_arm_the_timer() {
        let mut writer = DebouncedWriter::default();
        writer.queue(PageFields::default());
        assert!(writer.is_idle());
    }

    #[test]
    fn queued_fields_coalesce_per_field() {
        let mut writer = DebouncedWriter::default();
        writer.queue(PageFields::title("first"));
        writer.queue(PageFields::content("notes"));
        writer.queue(PageFields::title("second"));

        let fields = writer.take_pending();
        assert_eq!(fields.title.as_deref(), Some("second"));
        assert_eq!(fields.content.as_deref(), Some("notes"));
    }
}
