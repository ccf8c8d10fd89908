//! Shared application state for the API server.
//!
//! [`AppState`] owns the cached panel, the state store, and the
//! broadcaster. All writes go through [`AppState::mutate`], which holds
//! the panel lock for the whole read-check-write-publish sequence, so two
//! clients acting on the same record are strictly ordered.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use yardline_core::config::UserConfig;
use yardline_core::queue;
use yardline_core::{Clock, PassphraseCheck};
use yardline_db::{DbError, StateStore};
use yardline_types::PanelState;

use crate::auth::SessionTable;
use crate::broadcast::PanelBroadcaster;
use crate::error::ApiError;

/// Default session lifetime.
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
pub struct AppState {
    panel: Mutex<PanelState>,
    store: StateStore,
    broadcaster: PanelBroadcaster,
    passphrase: Arc<dyn PassphraseCheck>,
    clock: Clock,
    users: Vec<UserConfig>,
    sessions: SessionTable,
    static_dir: Option<PathBuf>,
    started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// State over an empty panel, without reading the store.
    pub fn new(store: StateStore, passphrase: Arc<dyn PassphraseCheck>) -> Self {
        Self::with_panel(store, passphrase, PanelState::default())
    }

    /// Read the panel from `store` and bring the queue in line with the
    /// loads before serving anything.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be read.
    pub async fn load(
        store: StateStore,
        passphrase: Arc<dyn PassphraseCheck>,
    ) -> Result<Self, DbError> {
        let mut panel = store.load().await?;
        let outcome = queue::resync(&mut panel);
        tracing::info!(
            backend = store.kind(),
            loads = panel.loads.len(),
            pointer = ?outcome.pointer,
            "Panel state loaded"
        );
        Ok(Self::with_panel(store, passphrase, panel))
    }

    fn with_panel(
        store: StateStore,
        passphrase: Arc<dyn PassphraseCheck>,
        panel: PanelState,
    ) -> Self {
        Self {
            panel: Mutex::new(panel),
            store,
            broadcaster: PanelBroadcaster::new(),
            passphrase,
            clock: Clock::System,
            users: Vec::new(),
            sessions: SessionTable::new(DEFAULT_SESSION_TTL),
            static_dir: None,
            started_at: chrono::Utc::now(),
        }
    }

    /// Replace the clock (tests pin "today").
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Set the users allowed to log in and the session lifetime.
    #[must_use]
    pub fn with_users(mut self, users: Vec<UserConfig>, session_ttl: Duration) -> Self {
        self.users = users;
        self.sessions = SessionTable::new(session_ttl);
        self
    }

    /// Serve static pages from `dir` for unmatched paths.
    #[must_use]
    pub fn with_static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// A copy of the current panel.
    pub async fn snapshot(&self) -> PanelState {
        self.panel.lock().await.clone()
    }

    /// Apply `op` to the panel as one atomic step.
    ///
    /// `op` runs against a copy. If it declines, or the store write
    /// fails, the cached panel and the store are left as they were.
    /// Otherwise the copy is persisted, becomes the cached panel, and is
    /// published to every subscriber.
    ///
    /// # Errors
    ///
    /// Returns the rejection from `op`, or [`ApiError::Store`] if the
    /// write fails.
    pub async fn mutate<T, E>(
        &self,
        op: impl FnOnce(&mut PanelState) -> Result<T, E>,
    ) -> Result<T, ApiError>
    where
        ApiError: From<E>,
    {
        let mut current = self.panel.lock().await;
        let mut next = current.clone();

        let value = op(&mut next)?;

        self.store.save(&next).await?;
        *current = next;

        let reached = self.broadcaster.publish(&current);
        tracing::debug!(subscribers = reached, "Published panel update");

        Ok(value)
    }

    /// The update broadcaster.
    pub const fn broadcaster(&self) -> &PanelBroadcaster {
        &self.broadcaster
    }

    /// The reset passphrase check.
    pub fn passphrase(&self) -> &dyn PassphraseCheck {
        self.passphrase.as_ref()
    }

    /// The configured clock.
    pub const fn clock(&self) -> Clock {
        self.clock
    }

    /// Users allowed to log in.
    pub fn users(&self) -> &[UserConfig] {
        &self.users
    }

    /// Live login sessions.
    pub const fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    /// Directory of static pages, if any.
    pub fn static_dir(&self) -> Option<&PathBuf> {
        self.static_dir.as_ref()
    }

    /// Backend name of the state store.
    pub const fn store_kind(&self) -> &'static str {
        self.store.kind()
    }

    /// When the server started.
    pub const fn started_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.started_at
    }
}
