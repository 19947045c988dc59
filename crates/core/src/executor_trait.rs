//! Query execution abstraction trait
//!
//! Seam between the chat pipeline and the relational store. The production
//! implementation runs against Postgres; tests substitute an in-process fake.

use async_trait::async_trait;

use crate::QueryResult;

/// Executes an already-validated, read-only SQL statement under a timeout
/// and row cap. Implementations must never persist a side effect and must
/// surface database-level failures as `QueryResult { success: false, .. }`
/// rather than an `Err` — only infrastructure faults (e.g. pool exhaustion
/// treated as unrecoverable by the implementation) may error.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run `statement` and return a bounded result.
    async fn execute(&self, statement: &str) -> QueryResult;
}
