//! `WebSocket` handler for live panel updates.
//!
//! Clients connect to `GET /ws/panel` (a session is required) and get:
//!
//! - `initial_state` with the full panel right after connecting,
//! - `state_updated` with the full panel after every accepted mutation,
//! - `initial_state` again whenever they send the text frame `refresh`.
//!
//! A client that lags behind the broadcast channel is sent the current
//! panel instead of the skipped updates. A client that reconnects after
//! a drop gets a fresh `initial_state`, so missed updates never leave a
//! view stale.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};
use yardline_types::PanelState;

use crate::auth::CurrentUser;
use crate::broadcast::{PanelEvent, PanelMessage};
use crate::state::AppState;

/// Text frame a client sends to request the full panel.
const REFRESH: &str = "refresh";

/// Upgrade to a `WebSocket` and start streaming panel updates.
///
/// # Route
///
/// `GET /ws/panel`
pub async fn ws_panel(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state, user))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>, user: CurrentUser) {
    debug!(username = user.username, "WebSocket client connected");

    // Subscribe before reading the snapshot so no update falls in between.
    let mut rx = state.broadcaster().subscribe();

    let initial = state.snapshot().await;
    if !send(&mut socket, PanelEvent::InitialState, &initial).await {
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(panel) => {
                        if !send(&mut socket, PanelEvent::StateUpdated, &panel).await {
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, resending full state");
                        let current = state.snapshot().await;
                        if !send(&mut socket, PanelEvent::StateUpdated, &current).await {
                            return;
                        }
                    }
                    Err(RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(username = user.username, "WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Text(text))) if text.trim() == REFRESH => {
                        let current = state.snapshot().await;
                        if !send(&mut socket, PanelEvent::InitialState, &current).await {
                            return;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Send one frame. Returns `false` once the client is gone.
async fn send(socket: &mut WebSocket, event: PanelEvent, panel: &PanelState) -> bool {
    let json = match serde_json::to_string(&PanelMessage {
        event,
        state: panel,
    }) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to serialize panel message: {e}");
            return true;
        }
    };

    if socket.send(Message::Text(json.into())).await.is_err() {
        debug!("WebSocket client disconnected (send failed)");
        return false;
    }
    true
}
