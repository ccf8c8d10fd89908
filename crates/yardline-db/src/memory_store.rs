//! In-process backend. Nothing survives a restart.

use std::sync::Arc;

use tokio::sync::RwLock;
use yardline_types::PanelState;

/// Keeps the last saved panel in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<PanelState>>,
}

impl MemoryStore {
    /// A store holding the empty default panel.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with `panel`.
    pub fn with_state(panel: PanelState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(panel)),
        }
    }

    /// Return a copy of the last saved panel.
    pub async fn load(&self) -> PanelState {
        self.inner.read().await.clone()
    }

    /// Replace the stored panel.
    pub async fn save(&self, panel: &PanelState) {
        panel.clone_into(&mut *self.inner.write().await);
    }
}
