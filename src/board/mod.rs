//! The board core: pure mutation operations, snapshot normalization, the
//! debounced save state machine, and the per-page [`BoardSession`] that ties
//! them to a [`crate::store::DocumentStore`].
//!
//! Data flow is a closed loop with the remote document as the single source
//! of truth: snapshot → in-memory [`crate::models::Board`] → user gesture →
//! [`ops`] → new board → store write → snapshot (every write echoes back,
//! including our own).

pub mod debounce;
pub mod ops;
mod session;
mod snapshot;

pub use debounce::{DebouncedWriter, DEFAULT_DEBOUNCE_WINDOW};
pub use ops::{BoardUpdate, ChangedFields, ColumnDeletePolicy, IdGenerator, TaskPatch, UuidIds};
pub use session::{BoardSession, ReorderEvent};
