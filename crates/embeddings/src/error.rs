//! Typed error enum for the embeddings crate.

use thiserror::Error;

/// Errors from embedding generation operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
    #[error("embedding response could not be parsed: {0}")]
    MalformedResponse(String),
    #[error("embedding generation returned empty result")]
    EmptyResult,
    #[error("client initialization failed: {0}")]
    ClientInit(String),
}

impl EmbeddingError {
    /// Whether this error is transient (backend unreachable or overloaded).
    /// Transient failures degrade retrieval instead of failing the request.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpRequest(_) => true,
            Self::HttpStatus { code, .. } => matches!(code, 429 | 500 | 502 | 503),
            _ => false,
        }
    }
}
