//! Axum router construction.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS and request tracing. When a static directory is configured,
//! unmatched paths are served from it.

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{auth, departures, handlers, schedule, ws};

/// Build the complete Axum router.
///
/// See [`handlers`], [`departures`], and [`schedule`] for the endpoint
/// tables and the role each route needs.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        // Status page and login
        .route("/", get(handlers::index))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        // WebSocket
        .route("/ws/panel", get(ws::ws_panel))
        // Full panel
        .route("/api/panel", get(handlers::get_panel).put(handlers::put_panel))
        // Registry
        .route(
            "/api/carriers",
            get(handlers::list_carriers).post(handlers::create_carrier),
        )
        .route("/api/carriers/drivers", get(handlers::list_drivers))
        .route(
            "/api/carriers/{id}",
            put(handlers::update_carrier).delete(handlers::delete_carrier),
        )
        .route(
            "/api/loads",
            get(handlers::list_loads)
                .post(handlers::append_loads)
                .delete(handlers::remove_loads),
        )
        .route("/api/loads/{sequence}", put(handlers::set_load_carrier))
        // Schedule
        .route(
            "/api/schedule",
            get(schedule::list_schedule).post(schedule::create_entry),
        )
        .route(
            "/api/schedule/{carrier}",
            axum::routing::delete(schedule::delete_entry),
        )
        .route("/api/schedule/{carrier}/days/{day}", put(schedule::set_slot))
        .route(
            "/api/schedule/{carrier}/days/{day}/toggle",
            post(schedule::toggle),
        )
        .route("/api/today", get(schedule::today))
        // Departure queue
        .route("/api/queue", get(departures::get_queue))
        .route("/api/queue/resync", post(departures::resync))
        .route("/api/queue/reset", post(departures::reset))
        .route("/api/queue/{sequence}/depart", post(departures::depart))
        .route("/api/queue/{sequence}/skip", post(departures::skip))
        .route("/api/queue/{sequence}/driver", put(departures::assign_driver));

    let router = match state.static_dir() {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
