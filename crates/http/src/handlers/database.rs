use axum::{Json, extract::Path, extract::State};
use std::sync::Arc;
use tabletalk_core::QueryResult;

use crate::AppState;
use crate::api_error::ApiError;
use crate::api_types::ExecuteRequest;

/// Direct SQL execution. Validation failures come back as a failed
/// `QueryResult` with HTTP 200; this endpoint never writes.
pub async fn execute(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExecuteRequest>,
) -> Json<QueryResult> {
    Json(state.chat_service.execute_sql(&req.sql).await)
}

pub async fn test_connection(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .database
        .test_connection()
        .await
        .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))?;
    Ok(Json(serde_json::json!({"status": "connected"})))
}

pub async fn table_info(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
) -> Result<Json<QueryResult>, ApiError> {
    let result = state
        .database
        .table_info(&table)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;
    if result.row_count == 0 {
        return Err(ApiError::NotFound(format!("table '{table}' not found")));
    }
    Ok(Json(result))
}
