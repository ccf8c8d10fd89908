//! REST handlers for the status page, the full panel, and the registry.
//!
//! # Endpoints
//!
//! | Method | Path | Role | Description |
//! |--------|------|------|-------------|
//! | `GET` | `/` | - | HTML status page |
//! | `GET` | `/api/panel` | any | Full panel snapshot |
//! | `PUT` | `/api/panel` | admin | Replace the full panel |
//! | `GET` | `/api/carriers` | any | List registrations |
//! | `POST` | `/api/carriers` | admin | Register a carrier/driver |
//! | `PUT` | `/api/carriers/{id}` | admin | Partial update |
//! | `DELETE` | `/api/carriers/{id}` | admin | Delete a registration |
//! | `GET` | `/api/carriers/drivers` | any | Drivers of one carrier |
//! | `GET` | `/api/loads` | any | Today's loads |
//! | `POST` | `/api/loads` | admin | Append blank rows |
//! | `DELETE` | `/api/loads` | admin | Remove rows from the end |
//! | `PUT` | `/api/loads/{sequence}` | admin | Set a load's carrier |
//!
//! Every load edit re-synchronizes the departure queue in the same step,
//! so the queue always has one record per load.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::Json;
use yardline_core::queue;
use yardline_core::registry::{self, CarrierDraft, CarrierPatch, RegistryError};
use yardline_types::{CarrierId, PanelState};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request structs
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/carriers/drivers`.
#[derive(Debug, serde::Deserialize)]
pub struct DriversQuery {
    /// Carrier name.
    pub carrier: String,
}

/// Row count for appending or removing loads.
#[derive(Debug, serde::Deserialize)]
pub struct LoadCount {
    /// Number of rows.
    pub count: u32,
}

/// Request body for `PUT /api/loads/{sequence}`.
#[derive(Debug, serde::Deserialize)]
pub struct SetLoadCarrier {
    /// Carrier name (may be empty to clear the row).
    #[serde(default)]
    pub carrier: String,
}

// ---------------------------------------------------------------------------
// GET / -- status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page with queue status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let panel = state.snapshot().await;
    let counts = queue::counts(&panel);
    let pointer = panel
        .pointer
        .map_or_else(|| String::from("-"), |p| p.to_string());
    let next = queue::next_actionable(&panel)
        .map_or_else(|| String::from("-"), |p| p.to_string());
    let complete = if queue::is_complete(&panel) { "yes" } else { "no" };
    let today = state.clock().today();
    let backend = state.store_kind();
    let listeners = state.broadcaster().subscriber_count();
    let started = state.started_at().format("%Y-%m-%d %H:%M:%S UTC");
    let loads = panel.loads.len();
    let carriers = panel.carriers.len();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Yardline</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        code {{ color: #7ee787; }}
    </style>
</head>
<body>
    <h1>Yardline</h1>
    <p class="subtitle">Yard departure panel -- {today}, store: {backend}, up since {started}</p>

    <div>
        <div class="metric"><div class="label">Loads</div><div class="value">{loads}</div></div>
        <div class="metric"><div class="label">Carriers</div><div class="value">{carriers}</div></div>
        <div class="metric"><div class="label">Pointer</div><div class="value">{pointer}</div></div>
        <div class="metric"><div class="label">Next</div><div class="value">{next}</div></div>
        <div class="metric"><div class="label">Complete</div><div class="value">{complete}</div></div>
    </div>
    <div>
        <div class="metric"><div class="label">Pending</div><div class="value">{pending}</div></div>
        <div class="metric"><div class="label">Departed</div><div class="value">{departed}</div></div>
        <div class="metric"><div class="label">Skipped</div><div class="value">{skipped}</div></div>
        <div class="metric"><div class="label">Live views</div><div class="value">{listeners}</div></div>
    </div>

    <p>Log in with <code>POST /login</code>, then use <code>/api/panel</code>,
    <code>/api/queue</code>, <code>/api/schedule</code>, or subscribe on <code>/ws/panel</code>.</p>
</body>
</html>"#,
        pending = counts.pending,
        departed = counts.departed,
        skipped = counts.skipped,
    ))
}

// ---------------------------------------------------------------------------
// /api/panel
// ---------------------------------------------------------------------------

/// Return the full panel.
pub async fn get_panel(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> Json<PanelState> {
    Json(state.snapshot().await)
}

/// Replace the full panel.
///
/// Sequence numbers are reassigned by position and the queue is
/// re-synchronized against the new loads before saving.
pub async fn put_panel(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(incoming): Json<PanelState>,
) -> Result<Json<PanelState>, ApiError> {
    user.require_admin()?;

    let panel = state
        .mutate(|panel| {
            registry::check_load_limit(incoming.loads.len())?;
            *panel = incoming;
            registry::renumber(panel);
            queue::resync(panel);
            Ok::<_, ApiError>(panel.clone())
        })
        .await?;

    tracing::info!(
        by = user.username,
        loads = panel.loads.len(),
        carriers = panel.carriers.len(),
        "Full panel replaced"
    );
    Ok(Json(panel))
}

// ---------------------------------------------------------------------------
// /api/carriers
// ---------------------------------------------------------------------------

/// List carrier registrations.
pub async fn list_carriers(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> impl IntoResponse {
    Json(state.snapshot().await.carriers)
}

/// Register a carrier/driver row.
pub async fn create_carrier(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(draft): Json<CarrierDraft>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin()?;
    let carrier = state
        .mutate(|panel| registry::register_carrier(panel, &draft))
        .await?;
    Ok((StatusCode::CREATED, Json(carrier)))
}

/// Apply a partial update to a registration.
pub async fn update_carrier(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<CarrierPatch>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin()?;
    let id = parse_carrier_id(&id)?;
    let carrier = state
        .mutate(|panel| registry::update_carrier(panel, id, &patch))
        .await?;
    Ok(Json(carrier))
}

/// Delete a registration.
pub async fn delete_carrier(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin()?;
    let id = parse_carrier_id(&id)?;
    state
        .mutate(|panel| registry::remove_carrier(panel, id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Distinct driver names registered under a carrier.
pub async fn list_drivers(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Query(query): Query<DriversQuery>,
) -> impl IntoResponse {
    let panel = state.snapshot().await;
    Json(registry::drivers_for(&panel.carriers, &query.carrier))
}

// ---------------------------------------------------------------------------
// /api/loads
// ---------------------------------------------------------------------------

/// List today's loads.
pub async fn list_loads(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> impl IntoResponse {
    Json(state.snapshot().await.loads)
}

/// Append blank load rows.
pub async fn append_loads(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(body): Json<LoadCount>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin()?;
    let loads = state
        .mutate(|panel| {
            registry::append_loads(panel, body.count)?;
            queue::resync(panel);
            Ok::<_, RegistryError>(panel.loads.clone())
        })
        .await?;
    Ok((StatusCode::CREATED, Json(loads)))
}

/// Remove load rows from the end.
pub async fn remove_loads(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(query): Query<LoadCount>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin()?;
    let loads = state
        .mutate(|panel| {
            registry::remove_loads(panel, query.count)?;
            queue::resync(panel);
            Ok::<_, RegistryError>(panel.loads.clone())
        })
        .await?;
    Ok(Json(loads))
}

/// Set the carrier of one load row.
pub async fn set_load_carrier(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(sequence): Path<u32>,
    Json(body): Json<SetLoadCarrier>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin()?;
    let load = state
        .mutate(|panel| {
            let load = registry::set_load_carrier(panel, sequence, &body.carrier)?;
            queue::resync(panel);
            Ok::<_, RegistryError>(load)
        })
        .await?;
    Ok(Json(load))
}

fn parse_carrier_id(s: &str) -> Result<CarrierId, ApiError> {
    s.parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid carrier id '{s}': {e}")))
}
