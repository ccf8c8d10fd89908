//! Background startup helper.
//!
//! [`spawn_api`] launches the server on a Tokio task so the binary can
//! keep the handle and await it alongside other work.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;
use yardline_core::config::HttpConfig;

use crate::server::ServerError;
use crate::state::AppState;

/// Spawn the HTTP server on a background Tokio task.
///
/// The address is validated before spawning so misconfiguration is
/// reported to the caller; bind and serve failures after that are
/// logged and returned through the handle.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if `host:port` is not a valid address.
pub fn spawn_api(
    config: HttpConfig,
    state: Arc<AppState>,
) -> Result<JoinHandle<Result<(), ServerError>>, ServerError> {
    let addr_str = format!("{}:{}", config.host, config.port);
    let _: SocketAddr = addr_str
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address {addr_str}: {e}")))?;

    let handle = tokio::spawn(async move {
        let result = crate::server::start_server(&config, state).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "Yardline server exited with error");
        }
        result
    });

    tracing::info!(address = addr_str, "Yardline server spawned on background task");

    Ok(handle)
}
