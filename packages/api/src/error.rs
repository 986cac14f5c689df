//! Server-side error type and its mapping onto the wire.

use dioxus::prelude::ServerFnError;
use store::TableError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not authenticated")]
    NotAuthenticated,
    /// Request refused for a reason the user can fix; shown as is.
    #[error("{0}")]
    Rejected(String),
    #[error("DATABASE_URL must be set")]
    MissingDatabaseUrl,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
    #[error("invalid id: {0}")]
    InvalidId(#[from] uuid::Error),
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

impl ApiError {
    /// Project onto the [`TableError`] shape returned by the student endpoints.
    ///
    /// Database errors keep their SQLSTATE so the client can recognise
    /// constraint violations.
    pub fn to_table_error(&self) -> TableError {
        match self {
            ApiError::Database(sqlx::Error::Database(db)) => {
                let error = TableError::new(db.message());
                match db.code() {
                    Some(code) => error.with_code(code.into_owned()),
                    None => error,
                }
            }
            other => TableError::new(other.to_string()),
        }
    }
}

/// Transport-level failure for errors the caller cannot act on.
pub fn server_error(err: impl std::fmt::Display) -> ServerFnError {
    tracing::error!("server function failed: {err}");
    ServerFnError::new(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_have_no_code() {
        let error = ApiError::NotAuthenticated.to_table_error();
        assert_eq!(error.message, "Not authenticated");
        assert!(error.code.is_none());

        let error = ApiError::Rejected("Student not found".into()).to_table_error();
        assert_eq!(error, TableError::new("Student not found"));

        let error = ApiError::Database(sqlx::Error::RowNotFound).to_table_error();
        assert!(!error.is_unique_violation());
    }
}
