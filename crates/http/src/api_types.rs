//! Request and response bodies for the JSON API.

use serde::{Deserialize, Serialize};
use tabletalk_core::SchemaDefinition;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub sql: String,
}

/// Body of `POST /api/schemas`: one or more table definitions to index.
#[derive(Debug, Deserialize)]
pub struct SeedSchemasRequest {
    pub schemas: Vec<SchemaDefinition>,
}

#[derive(Debug, Serialize)]
pub struct SeedSchemasResponse {
    pub seeded: usize,
}

#[derive(Debug, Deserialize)]
pub struct SearchSchemasRequest {
    pub query: String,
    #[serde(default = "default_search_k")]
    pub k: usize,
}

fn default_search_k() -> usize {
    3
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_session_id_is_optional() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert_eq!(req.message, "hi");
        assert!(req.session_id.is_none());
    }

    #[test]
    fn search_request_defaults_k() {
        let req: SearchSchemasRequest =
            serde_json::from_str(r#"{"query": "customer balances"}"#).unwrap();
        assert_eq!(req.k, 3);

        let req: SearchSchemasRequest =
            serde_json::from_str(r#"{"query": "loans", "k": 5}"#).unwrap();
        assert_eq!(req.k, 5);
    }

    #[test]
    fn seed_request_parses_definition_without_description() {
        let req: SeedSchemasRequest = serde_json::from_str(
            r#"{"schemas": [{
                "table_name": "accounts",
                "columns": [{"name": "id", "data_type": "INTEGER", "nullable": false}]
            }]}"#,
        )
        .unwrap();
        assert_eq!(req.schemas.len(), 1);
        assert_eq!(req.schemas[0].table_name, "accounts");
        assert!(req.schemas[0].description.is_none());
    }
}
