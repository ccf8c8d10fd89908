//! Login sessions and role checks.
//!
//! Users are listed in configuration. `POST /login` checks the supplied
//! username, password, and role against that list, creates an in-memory
//! session, and sets the `yardline_session` cookie. Handlers take a
//! [`CurrentUser`] argument to require a session and call
//! [`CurrentUser::require_operator`] or [`CurrentUser::require_admin`]
//! for privileged actions.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{FromRequestParts, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use yardline_types::{Role, SessionId};

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "yardline_session";

/// A logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Login name.
    pub username: String,
    /// Role chosen at login.
    pub role: Role,
    /// When the session stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// In-memory session table.
pub struct SessionTable {
    ttl: Duration,
    sessions: RwLock<BTreeMap<SessionId, Session>>,
}

impl SessionTable {
    /// Empty table issuing sessions that live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(BTreeMap::new()),
        }
    }

    /// Start a session and return its id.
    pub async fn open(&self, username: &str, role: Role) -> SessionId {
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let id = SessionId::new();
        let mut sessions = self.sessions.write().await;
        // Drop expired entries while we hold the write lock anyway.
        let now = Utc::now();
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(
            id,
            Session {
                username: username.to_owned(),
                role,
                expires_at,
            },
        );
        id
    }

    /// Look up a live session.
    pub async fn get(&self, id: SessionId) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&id)
            .filter(|s| s.expires_at > Utc::now())
            .cloned()
    }

    /// End a session. Unknown ids are ignored.
    pub async fn close(&self, id: SessionId) {
        self.sessions.write().await.remove(&id);
    }
}

/// The user behind the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// Session id from the cookie.
    pub session_id: SessionId,
    /// Login name.
    pub username: String,
    /// Role chosen at login.
    pub role: Role,
}

impl CurrentUser {
    /// Allow operators and admins.
    pub const fn require_operator(&self) -> Result<(), ApiError> {
        if self.role.can_operate() {
            Ok(())
        } else {
            Err(ApiError::Forbidden {
                required: "operator",
            })
        }
    }

    /// Allow admins only.
    pub const fn require_admin(&self) -> Result<(), ApiError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden { required: "admin" })
        }
    }
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let session_id = session_from_headers(&parts.headers).ok_or(ApiError::Unauthenticated)?;
        let session = state
            .sessions()
            .get(session_id)
            .await
            .ok_or(ApiError::Unauthenticated)?;

        Ok(Self {
            session_id,
            username: session.username,
            role: session.role,
        })
    }
}

/// Extract the session id from the `Cookie` header(s).
pub fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| value.trim().parse().ok())
}

// ---------------------------------------------------------------------------
// POST /login, POST /logout
// ---------------------------------------------------------------------------

/// Request body for `POST /login`.
#[derive(Debug, serde::Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
    /// Role to log in as; must match the configured role.
    pub role: Role,
}

/// Response body for `POST /login`.
#[derive(Debug, serde::Serialize)]
struct LoginResponse {
    username: String,
    role: Role,
}

/// Check credentials and open a session.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users()
        .iter()
        .find(|u| u.username == req.username && u.password == req.password && u.role == req.role)
        .ok_or_else(|| {
            tracing::warn!(username = req.username, role = ?req.role, "Rejected login");
            ApiError::InvalidLogin
        })?;

    let id = state.sessions().open(&user.username, user.role).await;
    tracing::info!(username = user.username, role = ?user.role, "User logged in");

    let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::BadRequest(format!("session cookie: {e}")))?;

    Ok((
        [(SET_COOKIE, cookie)],
        Json(LoginResponse {
            username: user.username.clone(),
            role: user.role,
        }),
    ))
}

/// End the current session and clear the cookie.
pub async fn logout(State(state): State<Arc<AppState>>, user: CurrentUser) -> impl IntoResponse {
    state.sessions().close(user.session_id).await;
    tracing::info!(username = user.username, "User logged out");

    (
        StatusCode::NO_CONTENT,
        [(
            SET_COOKIE,
            HeaderValue::from_static("yardline_session=; Path=/; HttpOnly; Max-Age=0"),
        )],
    )
}
