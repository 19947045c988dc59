//! Typed error enums for the schema index and retriever.

use tabletalk_embeddings::EmbeddingError;
use thiserror::Error;

/// Errors from schema index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A vector's dimension does not match the vectors already stored.
    #[error("embedding dimension mismatch: index holds {expected}-dim vectors, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The backing store cannot be reached (poisoned lock). Degraded but
    /// continuable: callers proceed with empty schema context.
    #[error("schema index unavailable: {0}")]
    Unavailable(String),

    /// Empty vectors carry no similarity signal and are never stored.
    #[error("refusing to store empty embedding for table {0}")]
    EmptyEmbedding(String),
}

/// Errors from the retrieval step.
#[derive(Debug, Error)]
pub enum RetrieveError {
    /// Query embedding is dimensionally incompatible with the index. Fatal
    /// to the request: rankings would be nonsense.
    #[error("embedding mismatch: index holds {expected}-dim vectors, question embedded to {actual} (model {model})")]
    EmbeddingMismatch { expected: usize, actual: usize, model: String },

    /// Schema index unreachable.
    #[error("schema index unavailable: {0}")]
    IndexUnavailable(String),

    /// Embedding backend failed.
    #[error("embedding backend failed: {0}")]
    Embedding(#[from] EmbeddingError),
}

impl RetrieveError {
    /// Whether the chat pipeline may continue with empty schema context.
    /// Only a dimensional mismatch is fatal; everything else is a degraded
    /// backend the turn can survive.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::EmbeddingMismatch { .. })
    }
}
