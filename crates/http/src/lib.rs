//! HTTP API server for tabletalk.

pub mod api_error;
mod api_types;
mod handlers;

use axum::{
    Json, Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use tabletalk_executor::PgExecutor;
use tabletalk_service::{ChatService, SchemaService, SessionStore};

pub use api_types::{
    ChatRequest, ExecuteRequest, HealthResponse, SearchSchemasRequest, SeedSchemasRequest,
    SeedSchemasResponse,
};

/// Shared application state for all HTTP handlers.
///
/// Wrapped in `Arc` for thread-safe sharing across handlers.
pub struct AppState {
    pub chat_service: Arc<ChatService>,
    pub schema_service: Arc<SchemaService>,
    pub sessions: Arc<SessionStore>,
    pub database: Arc<PgExecutor>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/chat", post(handlers::chat::chat))
        .route("/api/chat/sessions", get(handlers::chat::list_sessions))
        .route("/api/chat/sessions/{id}", get(handlers::chat::get_session))
        .route("/api/database/execute", post(handlers::database::execute))
        .route("/api/database/test", get(handlers::database::test_connection))
        .route("/api/database/tables/{table}", get(handlers::database::table_info))
        .route("/api/schemas", post(handlers::schemas::seed))
        .route("/api/schemas", get(handlers::schemas::list))
        .route("/api/schemas/search", post(handlers::schemas::search))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok", version: env!("CARGO_PKG_VERSION") })
}
