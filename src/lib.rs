//! Collaborative Kanban board core for the PODS Administrator dashboard.
//!
//! Every board-bearing page in the dashboard runs the same loop: a live
//! subscription to the page's remote document replaces the in-memory board
//! wholesale on every snapshot, user gestures run pure mutation operations
//! that produce a new board value, and the changed fields are written back —
//! immediately for structural changes, debounced for free-text edits. The
//! remote document is the single source of truth; the local board is a
//! read-through, write-back cache.
//!
//! The application shell (routing, auth, rendering) lives elsewhere and
//! talks to this crate through two seams: the [`store::DocumentStore`] trait
//! on the bottom and the [`board::BoardSession`] gesture surface on top.

pub mod board;
pub mod models;
pub mod store;
