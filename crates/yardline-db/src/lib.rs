//! State store for the Yardline panel.
//!
//! The whole [`PanelState`](yardline_types::PanelState) aggregate is read
//! once at startup and written back in full after every accepted
//! mutation. Three backends are available:
//!
//! ```text
//! StateStore
//!     |
//!     +-- Memory    (process memory, for tests and demos)
//!     +-- File      (one JSON document, replaced atomically)
//!     +-- Postgres  (normalized tables, replaced in one transaction)
//! ```
//!
//! # Modules
//!
//! - [`store`] -- the [`StateStore`] dispatch enum
//! - [`memory_store`] -- in-process backend
//! - [`file_store`] -- JSON document backend
//! - [`panel_store`] -- panel tables in `PostgreSQL` (pool and migrations)
//! - [`error`] -- Shared error types

pub mod error;
pub mod file_store;
pub mod memory_store;
pub mod panel_store;
pub mod store;

pub use error::DbError;
pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use panel_store::PanelStore;
pub use store::StateStore;
