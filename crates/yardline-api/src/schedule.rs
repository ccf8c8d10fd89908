//! REST handlers for the weekly schedule.
//!
//! Days in paths are storage indices: `0` is Sunday through `6` for
//! Saturday. Views that show Monday first convert with
//! [`BackendDay::to_display`].
//!
//! # Endpoints
//!
//! | Method | Path | Role | Description |
//! |--------|------|------|-------------|
//! | `GET` | `/api/schedule` | any | All entries plus today |
//! | `POST` | `/api/schedule` | admin | Create an entry |
//! | `DELETE` | `/api/schedule/{carrier}` | admin | Remove an entry |
//! | `PUT` | `/api/schedule/{carrier}/days/{day}` | admin | Set a slot's time |
//! | `POST` | `/api/schedule/{carrier}/days/{day}/toggle` | operator | Flip today's confirmation |
//! | `GET` | `/api/today` | any | Slots scheduled for today |

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use yardline_core::schedule;
use yardline_types::{BackendDay, Confirmation, ScheduleEntry, TodaySlot, DISPLAY_ORDER};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Response body for `GET /api/schedule`.
#[derive(Debug, serde::Serialize)]
pub struct ScheduleView {
    /// The current day, in storage order.
    pub today: BackendDay,
    /// Column order for a Monday-first table.
    pub display_order: [BackendDay; 7],
    /// One entry per carrier.
    pub entries: Vec<ScheduleEntry>,
}

/// Request body for `POST /api/schedule`.
#[derive(Debug, serde::Deserialize)]
pub struct NewEntry {
    /// Carrier name.
    pub carrier: String,
    /// Initial times, Sunday first.
    #[serde(default)]
    pub times: Option<[String; 7]>,
}

/// Request body for `PUT /api/schedule/{carrier}/days/{day}`.
#[derive(Debug, serde::Deserialize)]
pub struct SetSlot {
    /// Time of day; empty clears the slot.
    #[serde(default)]
    pub time: String,
}

/// Response body for the confirmation toggle.
#[derive(Debug, serde::Serialize)]
pub struct ToggleResult {
    /// Carrier name.
    pub carrier: String,
    /// Day that was toggled.
    pub day: BackendDay,
    /// The flag after toggling.
    pub status: Confirmation,
}

/// Response body for `GET /api/today`.
#[derive(Debug, serde::Serialize)]
pub struct TodayView {
    /// The current day.
    pub day: BackendDay,
    /// Scheduled slots for that day.
    pub slots: Vec<TodaySlot>,
}

/// The whole schedule.
pub async fn list_schedule(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> Json<ScheduleView> {
    Json(ScheduleView {
        today: state.clock().today(),
        display_order: DISPLAY_ORDER,
        entries: state.snapshot().await.schedule,
    })
}

/// Create an entry for a carrier.
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(body): Json<NewEntry>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin()?;
    state
        .mutate(|panel| schedule::add_entry(&mut panel.schedule, &body.carrier, body.times.as_ref()))
        .await?;
    Ok(StatusCode::CREATED)
}

/// Remove a carrier's entry.
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(carrier): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin()?;
    state
        .mutate(|panel| schedule::remove_entry(&mut panel.schedule, &carrier))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Set the time of one slot.
pub async fn set_slot(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path((carrier, day)): Path<(String, String)>,
    Json(body): Json<SetSlot>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin()?;
    let day = parse_day(&day)?;
    state
        .mutate(|panel| schedule::set_slot_time(&mut panel.schedule, &carrier, day, &body.time))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Flip the confirmation of today's slot.
pub async fn toggle(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path((carrier, day)): Path<(String, String)>,
) -> Result<Json<ToggleResult>, ApiError> {
    user.require_operator()?;
    let day = parse_day(&day)?;
    let today = state.clock().today();
    let status = state
        .mutate(|panel| schedule::toggle_confirmation(&mut panel.schedule, &carrier, day, today))
        .await?;
    Ok(Json(ToggleResult {
        carrier,
        day,
        status,
    }))
}

/// Slots scheduled for today (driver view).
pub async fn today(State(state): State<Arc<AppState>>, _user: CurrentUser) -> Json<TodayView> {
    let day = state.clock().today();
    let panel = state.snapshot().await;
    Json(TodayView {
        day,
        slots: schedule::todays_slots(&panel.schedule, day),
    })
}

fn parse_day(raw: &str) -> Result<BackendDay, ApiError> {
    raw.parse::<usize>()
        .ok()
        .and_then(BackendDay::from_index)
        .ok_or_else(|| ApiError::BadRequest(format!("day must be 0 (Sunday) to 6, got {raw:?}")))
}
