//! Bounded, read-only execution of validated SQL against Postgres.
//!
//! Every statement runs inside a transaction that is explicitly made
//! read-only and is always rolled back, so even a statement that slipped
//! through validation cannot persist a side effect. Two independent bounds
//! apply: a server-side `statement_timeout` (with an outer task timeout as
//! backstop) and a row cap enforced while streaming the result.

mod decode;
mod error;

use std::time::Duration;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Column, Executor as _, PgPool, Row, Statement as _};
use tabletalk_core::{QueryExecutor, QueryResult};

pub use error::ExecutorError;

/// Outer-timeout slack beyond the server-side `statement_timeout`, so the
/// database normally cancels first and reports a proper SQLSTATE.
const OUTER_TIMEOUT_GRACE: Duration = Duration::from_secs(5);

/// Read-only query executor over a Postgres pool.
pub struct PgExecutor {
    pool: PgPool,
    statement_timeout: Duration,
    max_rows: usize,
}

impl std::fmt::Debug for PgExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgExecutor")
            .field("statement_timeout", &self.statement_timeout)
            .field("max_rows", &self.max_rows)
            .finish()
    }
}

impl PgExecutor {
    /// Connect a pool and build an executor.
    ///
    /// # Errors
    /// Fails if the database cannot be reached.
    pub async fn connect(
        database_url: &str,
        statement_timeout: Duration,
        max_rows: usize,
    ) -> Result<Self, ExecutorError> {
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .connect(database_url)
            .await
            .map_err(ExecutorError::Database)?;
        tracing::info!(max_rows, ?statement_timeout, "PgExecutor initialized");
        Ok(Self { pool, statement_timeout, max_rows })
    }

    /// Build an executor over an existing pool.
    #[must_use]
    pub fn with_pool(pool: PgPool, statement_timeout: Duration, max_rows: usize) -> Self {
        Self { pool, statement_timeout, max_rows }
    }

    /// Check database connectivity with a trivial query.
    ///
    /// # Errors
    /// Fails if the round trip does not complete.
    pub async fn test_connection(&self) -> Result<(), ExecutorError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(ExecutorError::Database)?;
        Ok(())
    }

    /// Column metadata for one table, from `information_schema`.
    ///
    /// # Errors
    /// Fails on database errors; an unknown table yields an empty list.
    pub async fn table_info(&self, table: &str) -> Result<QueryResult, ExecutorError> {
        self.run_bounded(
            "SELECT column_name, data_type, is_nullable
               FROM information_schema.columns
              WHERE table_name = $1
              ORDER BY ordinal_position",
            Some(table),
        )
        .await
    }

    async fn run_bounded(
        &self,
        statement: &str,
        bind: Option<&str>,
    ) -> Result<QueryResult, ExecutorError> {
        let timeout_secs = self.statement_timeout.as_secs();
        let outer = self.statement_timeout + OUTER_TIMEOUT_GRACE;
        let fut = self.run_in_read_only_tx(statement, bind, timeout_secs);
        match tokio::time::timeout(outer, fut).await {
            Ok(result) => result,
            Err(_elapsed) => Err(ExecutorError::Timeout { seconds: timeout_secs }),
        }
    }

    async fn run_in_read_only_tx(
        &self,
        statement: &str,
        bind: Option<&str>,
        timeout_secs: u64,
    ) -> Result<QueryResult, ExecutorError> {
        let map_err = |e: sqlx::Error| ExecutorError::from_sqlx(e, timeout_secs);

        let mut tx = self.pool.begin().await.map_err(ExecutorError::Database)?;
        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(map_err)?;
        sqlx::query(
            format!("SET LOCAL statement_timeout = {}", self.statement_timeout.as_millis())
                .as_str(),
        )
        .execute(&mut *tx)
        .await
        .map_err(map_err)?;

        // Column names come from statement metadata so zero-row results
        // still report their columns verbatim.
        let prepared = (&mut *tx).prepare(statement).await.map_err(map_err)?;
        let columns: Vec<String> =
            prepared.columns().iter().map(|c| c.name().to_owned()).collect();

        let query = match bind {
            Some(value) => sqlx::query(statement).bind(value.to_owned()),
            None => sqlx::query(statement),
        };

        let mut rows: Vec<Vec<serde_json::Value>> = Vec::new();
        {
            // Cap checked before each fetch so `rows.len()` can never
            // exceed `max_rows`, including the degenerate cap of zero.
            let mut stream = query.fetch(&mut *tx);
            while rows.len() < self.max_rows {
                let Some(row) = stream.try_next().await.map_err(map_err)? else {
                    break;
                };
                let decoded =
                    (0..row.columns().len()).map(|i| decode::decode_column(&row, i)).collect();
                rows.push(decoded);
            }
        }

        // Read-only defense in depth: never commit, even on success.
        tx.rollback().await.map_err(ExecutorError::Database)?;
        Ok(QueryResult::ok(columns, rows))
    }
}

#[async_trait]
impl QueryExecutor for PgExecutor {
    async fn execute(&self, statement: &str) -> QueryResult {
        match self.run_bounded(statement, None).await {
            Ok(result) => {
                tracing::debug!(rows = result.row_count, "query executed");
                result
            },
            Err(e) => {
                tracing::warn!(error = %e, "query failed");
                QueryResult::failure(e.to_string())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_error_message_names_the_bound() {
        let err = ExecutorError::Timeout { seconds: 30 };
        assert_eq!(err.to_string(), "query timed out after 30s");
    }

    #[test]
    fn outer_timeout_exceeds_statement_timeout() {
        // The server-side cancel must get a chance to fire first.
        assert!(OUTER_TIMEOUT_GRACE > Duration::ZERO);
    }
}
