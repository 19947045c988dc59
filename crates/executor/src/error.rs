//! Typed error enum for the executor crate.

use thiserror::Error;

/// Internal execution failures, before conversion into a failed
/// [`tabletalk_core::QueryResult`]. Nothing here escapes the executor as a
/// process fault.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Statement exceeded the configured timeout (either the server-side
    /// `statement_timeout` or the outer task timeout).
    #[error("query timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Database-level failure: unknown column, type error, permission error,
    /// connection loss.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

/// Postgres SQLSTATE for `query_canceled`, raised when `statement_timeout`
/// fires server-side.
const QUERY_CANCELED: &str = "57014";

impl ExecutorError {
    pub(crate) fn from_sqlx(err: sqlx::Error, timeout_secs: u64) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().is_some_and(|c| c == QUERY_CANCELED) {
                return Self::Timeout { seconds: timeout_secs };
            }
        }
        Self::Database(err)
    }
}
