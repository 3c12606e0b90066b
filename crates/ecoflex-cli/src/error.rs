//! Error types for ecoflex-cli

use thiserror::Error;

/// Result type alias for ecoflex-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Shown whenever the API cannot be reached at all.
pub const SERVER_UNREACHABLE: &str = "Server error. Make sure backend is running.";

/// Errors that can occur in ecoflex-cli
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from ecoflex-core (config files, validation)
    #[error(transparent)]
    Core(#[from] ecoflex_core::Error),

    /// Error from the API client
    #[error(transparent)]
    Client(#[from] ecoflex_client::Error),

    /// Terminal or file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An interactive prompt failed
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// Session file could not be read or written
    #[error("Session file {path}: {message}")]
    Session {
        /// Location of the session file
        path: String,
        /// What went wrong
        message: String,
    },

    /// A command that needs an account was run without one
    #[error("Please log in first (run `ecoflex login`)")]
    NotLoggedIn,

    /// Password and confirmation differ
    #[error("Passwords don't match")]
    PasswordMismatch,

    /// Input could not be used (bad file, closed stdin, ...)
    #[error("{0}")]
    Input(String),
}

impl Error {
    /// Creates an input error.
    pub fn input(message: impl Into<String>) -> Self {
        Error::Input(message.into())
    }

    /// Creates a session file error.
    pub fn session(path: impl AsRef<std::path::Path>, message: impl ToString) -> Self {
        Error::Session {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// Line printed to the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            Error::Client(e) if e.is_unreachable() => SERVER_UNREACHABLE.to_string(),
            Error::Client(ecoflex_client::Error::NotLoggedIn) => Error::NotLoggedIn.to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_message_passes_through() {
        let err = Error::from(ecoflex_client::Error::Api {
            status: 400,
            message: "Username already exists".into(),
        });
        assert_eq!(err.user_message(), "Username already exists");
    }

    #[test]
    fn test_missing_token_asks_for_login() {
        let err = Error::from(ecoflex_client::Error::NotLoggedIn);
        assert!(err.user_message().starts_with("Please log in first"));
    }

    #[test]
    fn test_password_mismatch_message() {
        assert_eq!(Error::PasswordMismatch.user_message(), "Passwords don't match");
    }
}
