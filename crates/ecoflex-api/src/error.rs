//! Error types for ecoflex-api

use axum::Json;
use axum::response::{IntoResponse, Response};
use ecoflex_auth::AuthError;
use ecoflex_core::api::ApiResponse;
use http::StatusCode;
use thiserror::Error;

/// Result type alias for ecoflex-api operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ecoflex-api
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from ecoflex-core
    #[error(transparent)]
    Core(#[from] ecoflex_core::Error),

    /// Error from ecoflex-storage
    #[error(transparent)]
    Storage(#[from] ecoflex_storage::Error),

    /// Error from ecoflex-auth
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Request body could not be read or was rejected outright
    #[error("{0}")]
    BadRequest(String),

    /// The score needs a saved financial profile
    #[error("Please complete your profile first. Financial profile not found")]
    ProfileRequired,

    /// I/O error (binding the listener, ...)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else that is the server's fault
    #[error("{0}")]
    Internal(String),
}

impl Error {
    /// Creates a 400 error carrying `message` verbatim.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Error::BadRequest(message.into())
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) | Error::ProfileRequired => StatusCode::BAD_REQUEST,
            Error::Core(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Error::Storage(ecoflex_storage::Error::Duplicate { .. }) => StatusCode::BAD_REQUEST,
            Error::Storage(ecoflex_storage::Error::Core(e)) if e.is_client_error() => {
                StatusCode::BAD_REQUEST
            }
            // Failed logins are answered like any other bad form submission.
            Error::Auth(AuthError::InvalidCredentials) => StatusCode::BAD_REQUEST,
            Error::Auth(e) => e.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the caller.
    pub fn public_message(&self) -> String {
        match self {
            Error::Storage(ecoflex_storage::Error::Duplicate { field }) => {
                format!("{} already exists", capitalize(field))
            }
            _ if self.status().is_server_error() => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        let body: ApiResponse = ApiResponse::error(self.public_message());
        (status, Json(body)).into_response()
    }
}
