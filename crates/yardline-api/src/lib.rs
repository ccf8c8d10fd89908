//! HTTP + `WebSocket` API for the Yardline panel.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **Login** (`POST /login`, `POST /logout`) backed by an in-memory
//!   session table and a `yardline_session` cookie
//! - **REST endpoints** for the full panel, carrier registry, loads,
//!   weekly schedule, and departure queue
//! - **`WebSocket` endpoint** (`/ws/panel`) pushing the full panel to
//!   every connected view after each accepted change
//! - **Status page** (`GET /`) and optional static pages
//!
//! # Architecture
//!
//! [`AppState`] caches the panel behind one mutex. Every write clones
//! the panel, applies a `yardline-core` operation, persists through the
//! `yardline-db` state store, and only then replaces the cache and
//! publishes on the [`PanelBroadcaster`].

pub mod auth;
pub mod broadcast;
pub mod departures;
pub mod error;
pub mod handlers;
pub mod router;
pub mod schedule;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use broadcast::PanelBroadcaster;
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use startup::spawn_api;
pub use state::AppState;
