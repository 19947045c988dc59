use axum::{Json, extract::State};
use std::sync::Arc;
use tabletalk_core::{RankedSchema, SchemaDefinition};

use crate::AppState;
use crate::api_error::ApiError;
use crate::api_types::{SearchSchemasRequest, SeedSchemasRequest, SeedSchemasResponse};

/// Embed and index the supplied table definitions. Definitions that fail
/// to embed are skipped and logged; the response reports how many landed.
pub async fn seed(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SeedSchemasRequest>,
) -> Result<Json<SeedSchemasResponse>, ApiError> {
    if req.schemas.is_empty() {
        return Err(ApiError::BadRequest("schemas must not be empty".to_owned()));
    }
    let seeded = state.schema_service.seed(req.schemas).await;
    Ok(Json(SeedSchemasResponse { seeded }))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SchemaDefinition>>, ApiError> {
    Ok(Json(state.schema_service.list()?))
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchSchemasRequest>,
) -> Result<Json<Vec<RankedSchema>>, ApiError> {
    if req.query.trim().is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_owned()));
    }
    let ranked = state.schema_service.search(&req.query, req.k).await?;
    Ok(Json(ranked))
}
