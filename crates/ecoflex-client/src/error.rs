//! Error types for ecoflex-client

use thiserror::Error;

/// Result type alias for ecoflex-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ecoflex-client
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The server answered with a non-success status
    #[error("{message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// The server's `message`, or the status text when there is none
        message: String,
    },

    /// HTTP client error (connection refused, timeout, bad body, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A route that needs a session was called without a token
    #[error("Not logged in")]
    NotLoggedIn,

    /// Base URL is unusable
    #[error("Invalid API URL '{url}': {message}")]
    InvalidUrl {
        /// The configured URL
        url: String,
        /// Why it was rejected
        message: String,
    },
}

impl Error {
    /// Whether the server could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }

    /// Whether the server rejected the session (HTTP 401).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Api { status: 401, .. } | Error::NotLoggedIn)
    }

    /// HTTP status, for errors that carry one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_displays_server_message() {
        let err = Error::Api {
            status: 400,
            message: "Username already exists".into(),
        };
        assert_eq!(err.to_string(), "Username already exists");
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_unauthorized_classification() {
        assert!(
            Error::Api {
                status: 401,
                message: "Please log in to continue".into()
            }
            .is_unauthorized()
        );
        assert!(Error::NotLoggedIn.is_unauthorized());
        assert!(!Error::NotLoggedIn.is_unreachable());
    }
}
