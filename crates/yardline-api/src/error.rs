//! Error types for the API layer.
//!
//! [`ApiError`] unifies every failure mode into a single enum that
//! converts into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. The
//! JSON body is `{error, status, reason}` where `reason` is a stable
//! machine-readable code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use yardline_core::{QueueRejection, RegistryError, ScheduleRejection};
use yardline_db::DbError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A queue action was declined.
    #[error(transparent)]
    Queue(#[from] QueueRejection),

    /// A schedule action was declined.
    #[error(transparent)]
    Schedule(#[from] ScheduleRejection),

    /// A registry edit was declined.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The state store failed; nothing was changed.
    #[error("failed to persist panel state: {0}")]
    Store(#[from] DbError),

    /// No valid session cookie.
    #[error("login required")]
    Unauthenticated,

    /// Username, password, or role did not match.
    #[error("invalid username, password, or role")]
    InvalidLogin,

    /// The session's role may not perform this action.
    #[error("this action requires the {required} role")]
    Forbidden {
        /// Role name the action needs.
        required: &'static str,
    },

    /// A path or query parameter could not be parsed.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Queue(QueueRejection::NotFound { .. })
            | Self::Schedule(ScheduleRejection::NotFound { .. })
            | Self::Registry(RegistryError::CarrierNotFound { .. } | RegistryError::LoadNotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            Self::Queue(QueueRejection::WrongPassphrase) | Self::Forbidden { .. } => {
                StatusCode::FORBIDDEN
            }
            Self::Queue(_) | Self::Schedule(_) | Self::Registry(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthenticated | Self::InvalidLogin => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    const fn reason(&self) -> &'static str {
        match self {
            Self::Queue(rejection) => rejection.code(),
            Self::Schedule(rejection) => rejection.code(),
            Self::Registry(rejection) => rejection.code(),
            Self::Store(_) => "store_unavailable",
            Self::Unauthenticated => "unauthenticated",
            Self::InvalidLogin => "invalid_login",
            Self::Forbidden { .. } => "forbidden",
            Self::BadRequest(_) => "bad_request",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Store details stay in the log.
        let message = if let Self::Store(e) = &self {
            tracing::error!(error = %e, "State store write failed");
            String::from("failed to persist panel state")
        } else {
            self.to_string()
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
            "reason": self.reason(),
        });

        (status, axum::Json(body)).into_response()
    }
}
