//! Backend-agnostic state store.
//!
//! The API holds one [`StateStore`] and calls [`StateStore::save`] after
//! every accepted mutation. Backends are a closed set, so this is an enum
//! rather than a trait object.

use std::fmt;

use yardline_types::PanelState;

use crate::error::DbError;
use crate::file_store::FileStore;
use crate::memory_store::MemoryStore;
use crate::panel_store::PanelStore;

/// The configured persistence backend.
#[derive(Clone)]
pub enum StateStore {
    /// Process memory.
    Memory(MemoryStore),
    /// JSON document on disk.
    File(FileStore),
    /// `PostgreSQL` tables.
    Postgres(PanelStore),
}

impl StateStore {
    /// Read the persisted panel. An empty store yields the default panel.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend cannot be read or holds data
    /// that does not decode into a panel.
    pub async fn load(&self) -> Result<PanelState, DbError> {
        match self {
            Self::Memory(store) => Ok(store.load().await),
            Self::File(store) => store.load().await,
            Self::Postgres(store) => store.load().await,
        }
    }

    /// Persist the whole panel.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the write fails. The previously persisted
    /// panel is left intact in that case.
    pub async fn save(&self, panel: &PanelState) -> Result<(), DbError> {
        match self {
            Self::Memory(store) => {
                store.save(panel).await;
                Ok(())
            }
            Self::File(store) => store.save(panel).await,
            Self::Postgres(store) => store.save(panel).await,
        }
    }

    /// Short backend name for logs and the status page.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::File(_) => "file",
            Self::Postgres(_) => "postgres",
        }
    }
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory(_) => f.write_str("StateStore::Memory"),
            Self::File(store) => write!(f, "StateStore::File({})", store.path().display()),
            Self::Postgres(_) => f.write_str("StateStore::Postgres"),
        }
    }
}
