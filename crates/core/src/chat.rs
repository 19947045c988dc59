use serde::{Deserialize, Serialize};

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message within a chat session. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_result: Option<QueryResult>,
}

impl Turn {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), sql_query: None, sql_result: None }
    }

    /// Assistant turn with no executed query (explanatory-only message).
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into(), sql_query: None, sql_result: None }
    }

    #[must_use]
    pub fn assistant_with_query(
        content: impl Into<String>,
        sql_query: String,
        sql_result: QueryResult,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            sql_query: Some(sql_query),
            sql_result: Some(sql_result),
        }
    }
}

/// A conversation and its ordered turn history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub session_id: String,
    pub turns: Vec<Turn>,
}

impl ChatSession {
    #[must_use]
    pub fn new(session_id: String) -> Self {
        Self { session_id, turns: Vec::new() }
    }
}

/// Outcome of executing one validated statement.
///
/// `rows` holds at most the configured row cap; `row_count` always equals
/// `rows.len()` so the executor never claims more rows than it returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub success: bool,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub row_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResult {
    #[must_use]
    pub fn ok(columns: Vec<String>, rows: Vec<Vec<serde_json::Value>>) -> Self {
        let row_count = rows.len();
        Self { success: true, columns, rows, row_count, error: None }
    }

    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            columns: Vec::new(),
            rows: Vec::new(),
            row_count: 0,
            error: Some(error.into()),
        }
    }
}
