//! Yardline server binary.
//!
//! Wires configuration, logging, the state store, and the HTTP API
//! together, then serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `yardline-config.yaml` (or defaults)
//! 2. Initialize structured logging (tracing)
//! 3. Open the configured state store
//! 4. Load the panel and re-synchronize the queue
//! 5. Serve the HTTP + `WebSocket` API

mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use yardline_api::{AppState, spawn_api};
use yardline_core::config::{LogFormat, LoggingConfig, StorageBackend, StorageConfig};
use yardline_core::{StaticPassphrase, YardConfig};
use yardline_db::{FileStore, MemoryStore, PanelStore, StateStore};

use crate::error::ServerError;

/// Config file used when `YARDLINE_CONFIG` is not set.
const DEFAULT_CONFIG_PATH: &str = "yardline-config.yaml";

/// Passphrase shipped in the defaults; worth a warning when still in use.
const PLACEHOLDER_PASSPHRASE: &str = "change-me";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any startup step fails or the server stops with
/// an error.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration (logged once tracing is up).
    let config_path = std::env::var("YARDLINE_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, loaded_from_file) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("yardline-server starting");
    if loaded_from_file {
        info!(path = %config_path.display(), "Loaded configuration");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    // 3. Open the state store.
    let store = open_store(&config.storage).await?;

    // 4. Load the panel.
    if config.queue.reset_passphrase == PLACEHOLDER_PASSPHRASE {
        warn!("Queue reset passphrase is the default; set queue.reset_passphrase");
    }
    if config.auth.users.is_empty() {
        warn!("No users configured; nobody will be able to log in");
    }

    let passphrase = Arc::new(StaticPassphrase::new(config.queue.reset_passphrase.clone()));
    let state = AppState::load(store, passphrase)
        .await?
        .with_users(
            config.auth.users.clone(),
            Duration::from_secs(config.auth.session_ttl_secs),
        )
        .with_static_dir(config.server.static_dir.clone());

    // 5. Serve.
    let handle = spawn_api(config.server.clone(), Arc::new(state))?;
    match handle.await {
        Ok(result) => result.map_err(ServerError::from)?,
        Err(e) => {
            return Err(ServerError::Task {
                message: e.to_string(),
            }
            .into());
        }
    }

    info!("yardline-server stopped");
    Ok(())
}

/// Load configuration from `path`, falling back to defaults (with env
/// overrides) when the file does not exist. The flag reports whether the
/// file was read.
fn load_config(path: &Path) -> Result<(YardConfig, bool), ServerError> {
    if path.exists() {
        Ok((YardConfig::from_file(path)?, true))
    } else {
        let mut config = YardConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

/// Open the configured backend.
async fn open_store(storage: &StorageConfig) -> Result<StateStore, ServerError> {
    let store = match storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory state store; nothing survives a restart");
            StateStore::Memory(MemoryStore::new())
        }
        StorageBackend::File => {
            info!(path = %storage.data_file.display(), "Using JSON file state store");
            StateStore::File(FileStore::new(&storage.data_file))
        }
        StorageBackend::Postgres => {
            StateStore::Postgres(
                PanelStore::connect(&storage.postgres_url, storage.max_connections).await?,
            )
        }
    };
    Ok(store)
}
