//! Domain models for the PODS board core.
//!
//! # Core Concepts
//!
//! ## Board aggregate
//!
//! - [`Board`]: the normalized Kanban state for one page — tasks keyed by id,
//!   columns keyed by id, and the authoritative left-to-right `column_order`.
//! - [`Column`]: an ordered bucket of task ids. The order of `task_ids` is the
//!   vertical position within the column.
//! - [`Task`]: the atomic work item.
//!
//! ## Page documents
//!
//! - [`PageDocument`]: one remote document as the store holds it. Board pages
//!   embed the board fields directly; document pages carry free-form `content`.
//! - [`PageFields`]: a partial update — the unit of a store write. Only fields
//!   set to `Some` are touched, mirroring a partial document update.
//!
//! All records serialize with the remote document's camelCase field names
//! (`columnOrder`, `taskIds`, `assignedTo`), so a document round-trips through
//! either store backend unchanged.

mod board;
mod ids;
mod page;

pub use board::*;
pub use ids::*;
pub use page::*;
