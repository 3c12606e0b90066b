//! Error types for ecoflex-storage

use thiserror::Error;

/// Result type alias for ecoflex-storage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ecoflex-storage
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from ecoflex-core
    #[error("Core error: {0}")]
    Core(#[from] ecoflex_core::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique column already holds the value
    #[error("{field} already exists")]
    Duplicate {
        /// Column that clashed (`username`, `email`, ...)
        field: String,
    },

    /// A stored value could not be mapped back to a domain type
    #[error("Corrupt row in {table}: {message}")]
    Corrupt {
        /// Table the row came from
        table: &'static str,
        /// What could not be decoded
        message: String,
    },
}

impl Error {
    /// Creates a corrupt-row error.
    pub fn corrupt(table: &'static str, message: impl Into<String>) -> Self {
        Error::Corrupt {
            table,
            message: message.into(),
        }
    }

    /// Maps unique-constraint violations to [`Error::Duplicate`], naming the
    /// column SQLite reports (`UNIQUE constraint failed: users.email`).
    pub(crate) fn from_insert(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                let field = db
                    .message()
                    .rsplit('.')
                    .next()
                    .unwrap_or("value")
                    .trim()
                    .to_string();
                return Error::Duplicate { field };
            }
        }
        Error::Database(err)
    }
}
