//! Error types for the server binary.
//!
//! [`ServerError`] wraps every failure mode during startup and serving so
//! `main` can propagate with `?`.

/// Top-level error for the server binary.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: yardline_core::ConfigError,
    },

    /// The state store could not be opened or read.
    #[error("state store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: yardline_db::DbError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("http error: {source}")]
    Http {
        /// The underlying server error.
        #[from]
        source: yardline_api::ServerError,
    },

    /// The server task panicked or was cancelled.
    #[error("server task failed: {message}")]
    Task {
        /// Description of the failure.
        message: String,
    },
}
