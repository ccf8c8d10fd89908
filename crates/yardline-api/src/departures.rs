//! REST handlers for the departure queue.
//!
//! # Endpoints
//!
//! | Method | Path | Role | Description |
//! |--------|------|------|-------------|
//! | `GET` | `/api/queue` | any | Records, pointer, and tallies |
//! | `POST` | `/api/queue/resync` | operator | Match records to loads |
//! | `POST` | `/api/queue/{sequence}/depart` | operator | Mark departed |
//! | `POST` | `/api/queue/{sequence}/skip` | operator | Skip the current record |
//! | `PUT` | `/api/queue/{sequence}/driver` | operator | Record the driver |
//! | `POST` | `/api/queue/reset` | admin | Clear the queue (passphrase) |

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use yardline_core::queue::{self, Departure, QueueCounts, QueueOutcome, QueueRejection};
use yardline_types::QueueRecord;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Response body for `GET /api/queue`.
#[derive(Debug, serde::Serialize)]
pub struct QueueView {
    /// One record per load.
    pub records: Vec<QueueRecord>,
    /// Record currently eligible for skip/departure.
    pub pointer: Option<u32>,
    /// Lowest pending record at or after the pointer, for highlighting.
    pub next_actionable: Option<u32>,
    /// Whether nothing pending remains.
    pub complete: bool,
    /// Records per status.
    pub counts: QueueCounts,
}

/// Request body for `PUT /api/queue/{sequence}/driver`.
#[derive(Debug, serde::Deserialize)]
pub struct AssignDriver {
    /// Driver name.
    pub driver_name: String,
}

/// Request body for `POST /api/queue/reset`.
#[derive(Debug, serde::Deserialize)]
pub struct ResetRequest {
    /// Shared reset passphrase.
    #[serde(default)]
    pub passphrase: String,
}

/// Current queue state.
pub async fn get_queue(State(state): State<Arc<AppState>>, _user: CurrentUser) -> Json<QueueView> {
    let panel = state.snapshot().await;
    Json(QueueView {
        pointer: panel.pointer,
        next_actionable: queue::next_actionable(&panel),
        complete: queue::is_complete(&panel),
        counts: queue::counts(&panel),
        records: panel.queue,
    })
}

/// Re-synchronize records with loads.
pub async fn resync(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<QueueOutcome>, ApiError> {
    user.require_operator()?;
    let outcome = state
        .mutate(|panel| Ok::<_, QueueRejection>(queue::resync(panel)))
        .await?;
    Ok(Json(outcome))
}

/// Mark a record departed.
pub async fn depart(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(sequence): Path<u32>,
    Json(departure): Json<Departure>,
) -> Result<Json<QueueOutcome>, ApiError> {
    user.require_operator()?;
    let outcome = state
        .mutate(|panel| queue::mark_departed(panel, sequence, &departure))
        .await?;
    tracing::info!(
        sequence,
        by = user.username,
        pointer = ?outcome.pointer,
        "Load departed"
    );
    Ok(Json(outcome))
}

/// Skip the current record.
pub async fn skip(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(sequence): Path<u32>,
) -> Result<Json<QueueOutcome>, ApiError> {
    user.require_operator()?;
    let outcome = state
        .mutate(|panel| queue::skip(panel, sequence))
        .await?;
    tracing::info!(sequence, by = user.username, pointer = ?outcome.pointer, "Load skipped");
    Ok(Json(outcome))
}

/// Record the driver for a record that has not departed.
pub async fn assign_driver(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(sequence): Path<u32>,
    Json(body): Json<AssignDriver>,
) -> Result<Json<QueueRecord>, ApiError> {
    user.require_operator()?;
    let record = state
        .mutate(|panel| {
            queue::assign_driver(panel, sequence, &body.driver_name)?;
            panel
                .queue
                .iter()
                .find(|r| r.sequence == sequence)
                .cloned()
                .ok_or(QueueRejection::NotFound { sequence })
        })
        .await?;
    Ok(Json(record))
}

/// Clear the queue and rebuild fresh records from the loads.
pub async fn reset(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(body): Json<ResetRequest>,
) -> Result<Json<QueueOutcome>, ApiError> {
    user.require_admin()?;
    let outcome = state
        .mutate(|panel| {
            queue::reset(panel, state.passphrase(), &body.passphrase)?;
            Ok::<_, QueueRejection>(queue::resync(panel))
        })
        .await?;
    tracing::info!(by = user.username, "Queue reset");
    Ok(Json(outcome))
}
