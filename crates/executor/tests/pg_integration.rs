//! Integration tests for PgExecutor against a live database.
//! Run with: DATABASE_URL=... cargo test -p tabletalk-executor -- --ignored pg_

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tabletalk_core::QueryExecutor;
use tabletalk_executor::PgExecutor;
use uuid::Uuid;

async fn connect_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for PgExecutor integration tests");
    PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("Failed to connect to PostgreSQL")
}

fn executor(pool: PgPool, timeout: Duration, max_rows: usize) -> PgExecutor {
    PgExecutor::with_pool(pool, timeout, max_rows)
}

fn scratch_table() -> String {
    format!("tabletalk_test_{}", Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore]
async fn pg_row_cap_bounds_larger_results() {
    let pool = connect_pool().await;
    let exec = executor(pool, Duration::from_secs(5), 5);

    let result = exec.execute("SELECT n FROM generate_series(1, 50) AS n").await;
    assert!(result.success, "error: {:?}", result.error);
    assert_eq!(result.rows.len(), 5);
    assert_eq!(result.row_count, 5);
    assert_eq!(result.columns, vec!["n"]);
}

#[tokio::test]
#[ignore]
async fn pg_zero_cap_returns_no_rows() {
    let pool = connect_pool().await;
    let exec = executor(pool, Duration::from_secs(5), 0);

    let result = exec.execute("SELECT n FROM generate_series(1, 10) AS n").await;
    assert!(result.success, "error: {:?}", result.error);
    assert!(result.rows.is_empty());
    assert_eq!(result.row_count, 0);
    // Column metadata still present even when nothing is fetched.
    assert_eq!(result.columns, vec!["n"]);
}

#[tokio::test]
#[ignore]
async fn pg_result_exactly_at_cap_is_complete() {
    let pool = connect_pool().await;
    let exec = executor(pool, Duration::from_secs(5), 10);

    let result = exec.execute("SELECT n FROM generate_series(1, 10) AS n").await;
    assert!(result.success);
    assert_eq!(result.row_count, 10);
}

#[tokio::test]
#[ignore]
async fn pg_statement_timeout_is_a_failure_not_a_hang() {
    let pool = connect_pool().await;
    let exec = executor(pool, Duration::from_secs(1), 10);

    let result = exec.execute("SELECT pg_sleep(10)").await;
    assert!(!result.success);
    let error = result.error.expect("timeout must carry an error");
    assert!(error.contains("timed out"), "unexpected error: {error}");
}

#[tokio::test]
#[ignore]
async fn pg_write_that_bypasses_validation_persists_nothing() {
    let pool = connect_pool().await;
    let table = scratch_table();
    sqlx::query(&format!("CREATE TABLE {table} (id INT)"))
        .execute(&pool)
        .await
        .expect("scratch table setup");

    let exec = executor(pool.clone(), Duration::from_secs(5), 10);
    // Handed straight to the executor, as if validation had been evaded.
    let result = exec.execute(&format!("INSERT INTO {table} VALUES (1)")).await;
    assert!(!result.success, "write must not succeed in a read-only transaction");

    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0, "no write may persist");

    sqlx::query(&format!("DROP TABLE {table}")).execute(&pool).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn pg_zero_row_select_reports_columns() {
    let pool = connect_pool().await;
    let exec = executor(pool, Duration::from_secs(5), 10);

    let result = exec.execute("SELECT 1 AS one, 'x' AS label WHERE false").await;
    assert!(result.success);
    assert_eq!(result.row_count, 0);
    assert_eq!(result.columns, vec!["one", "label"]);
}
