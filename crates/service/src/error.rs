//! Typed error enum for the service layer.
//!
//! Most pipeline failures are absorbed into explanatory assistant turns or
//! failed `QueryResult`s; only request-fatal conditions surface here.

use tabletalk_embeddings::EmbeddingError;
use tabletalk_index::{IndexError, RetrieveError};
use thiserror::Error;

/// Service-layer error for conditions the chat turn cannot absorb.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Embedding space of the question diverged from the index. Fatal to
    /// the request: proceeding would rank schemas by noise.
    #[error("embedding mismatch: {0}")]
    EmbeddingMismatch(#[source] RetrieveError),

    /// Schema index operation failed during seeding or listing.
    #[error("schema index: {0}")]
    Index(#[from] IndexError),

    /// Embedding backend failed during seeding or schema search.
    #[error("embedding backend: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Caller provided invalid input (empty question, empty seed set).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
