use std::sync::Arc;

use tabletalk_core::SchemaDescriptor;
use tabletalk_embeddings::Embedder;

use crate::{IndexError, RetrieveError, SchemaIndex};

/// Embeds a question and fetches the most relevant schema descriptors.
///
/// Uses the same embedder the index was seeded with; a dimensional mismatch
/// means the models diverged and fails fast instead of producing nonsense
/// rankings.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<SchemaIndex>,
    k: usize,
}

impl Retriever {
    #[must_use]
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<SchemaIndex>, k: usize) -> Self {
        Self { embedder, index, k }
    }

    /// Retrieve the top-k schemas for `question`.
    ///
    /// # Errors
    /// `EmbeddingMismatch` when the query vector's dimension differs from the
    /// index; every other variant is a degraded backend the caller may
    /// survive with empty context.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<SchemaDescriptor>, RetrieveError> {
        if self.index.is_empty() {
            return Ok(Vec::new());
        }
        let query_vec = self.embedder.embed(question).await?;
        let hits = self.index.search(&query_vec, self.k).map_err(|e| match e {
            IndexError::DimensionMismatch { expected, actual } => {
                RetrieveError::EmbeddingMismatch {
                    expected,
                    actual,
                    model: self.embedder.model().to_owned(),
                }
            },
            other => RetrieveError::IndexUnavailable(other.to_string()),
        })?;
        tracing::debug!(
            question_len = question.len(),
            hits = hits.len(),
            "retrieved schema context"
        );
        Ok(hits.into_iter().map(|(descriptor, _)| descriptor).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tabletalk_core::{ColumnDescriptor, SchemaDefinition};
    use tabletalk_embeddings::EmbeddingError;

    /// Deterministic stand-in for the remote embedding model.
    struct FixedEmbedder {
        vector: Vec<f32>,
    }

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(self.vector.clone())
        }

        fn model(&self) -> &str {
            "fixed-test-embedder"
        }
    }

    fn seeded_index() -> Arc<SchemaIndex> {
        let index = SchemaIndex::new();
        for (name, vec) in [("accounts", vec![1.0, 0.0]), ("loans", vec![0.0, 1.0])] {
            index
                .put(SchemaDescriptor::new(
                    SchemaDefinition {
                        table_name: name.to_owned(),
                        columns: vec![ColumnDescriptor {
                            name: "id".to_owned(),
                            data_type: "INTEGER".to_owned(),
                            nullable: false,
                        }],
                        description: None,
                    },
                    vec,
                ))
                .unwrap();
        }
        Arc::new(index)
    }

    #[tokio::test]
    async fn retrieve_returns_closest_schemas() {
        let retriever = Retriever::new(
            Arc::new(FixedEmbedder { vector: vec![1.0, 0.1] }),
            seeded_index(),
            1,
        );
        let schemas = retriever.retrieve("how many accounts").await.unwrap();
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].table_name, "accounts");
    }

    #[tokio::test]
    async fn retrieve_on_empty_index_skips_embedding() {
        // Embedder that would fail if called.
        struct FailingEmbedder;
        #[async_trait]
        impl Embedder for FailingEmbedder {
            async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
                Err(EmbeddingError::EmptyResult)
            }
            fn model(&self) -> &str {
                "failing"
            }
        }

        let retriever =
            Retriever::new(Arc::new(FailingEmbedder), Arc::new(SchemaIndex::new()), 3);
        assert!(retriever.retrieve("anything").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn retrieve_fails_fast_on_dimension_mismatch() {
        let retriever = Retriever::new(
            Arc::new(FixedEmbedder { vector: vec![1.0, 0.0, 0.0] }),
            seeded_index(),
            2,
        );
        let err = retriever.retrieve("how many accounts").await.unwrap_err();
        assert!(matches!(err, RetrieveError::EmbeddingMismatch { expected: 2, actual: 3, .. }));
        assert!(!err.is_degraded());
    }

    #[tokio::test]
    async fn transient_embedding_failure_is_degraded() {
        struct DownEmbedder;
        #[async_trait]
        impl Embedder for DownEmbedder {
            async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
                Err(EmbeddingError::HttpStatus { code: 503, body: "down".to_owned() })
            }
            fn model(&self) -> &str {
                "down"
            }
        }

        let retriever = Retriever::new(Arc::new(DownEmbedder), seeded_index(), 2);
        let err = retriever.retrieve("how many accounts").await.unwrap_err();
        assert!(err.is_degraded());
    }
}
