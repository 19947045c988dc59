//! Embedding generation for schema retrieval.
//!
//! The embedding model is an opaque external collaborator reached over HTTP
//! (Ollama-compatible `/api/embeddings`). The same endpoint and model must be
//! used at index-seeding time and at query time; the index enforces
//! dimensional compatibility on every insert and search.

mod error;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::EmbeddingError;

/// Turns text into a fixed-length float vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Model identifier, logged alongside dimension mismatches.
    fn model(&self) -> &str;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Embedding client for an Ollama-compatible HTTP backend.
pub struct HttpEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for HttpEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmbedder")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl HttpEmbedder {
    /// Creates a new embedding client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(base_url: &str, model: &str) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| EmbeddingError::ClientInit(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            model: model.to_owned(),
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let request = EmbeddingRequest { model: &self.model, prompt: text };
        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "could not read error body".to_owned());
            return Err(EmbeddingError::HttpStatus { code: status.as_u16(), body });
        }

        let body = response.text().await?;
        let parsed: EmbeddingResponse = serde_json::from_str(&body)
            .map_err(|e| EmbeddingError::MalformedResponse(e.to_string()))?;

        if parsed.embedding.is_empty() {
            return Err(EmbeddingError::EmptyResult);
        }
        Ok(parsed.embedding)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
