//! In-memory vector index over table schema descriptors.
//!
//! Read-mostly and shared for concurrent reads; seeding writes are rare and
//! out-of-band. Holds one embedded descriptor per table, keyed by
//! `table_name` with replace semantics, and answers nearest-neighbour
//! lookups by cosine similarity with a deterministic name tie-break.

mod error;
mod retriever;

use std::collections::HashMap;
use std::sync::RwLock;

use tabletalk_core::SchemaDescriptor;

pub use error::{IndexError, RetrieveError};
pub use retriever::Retriever;

#[derive(Default)]
struct IndexInner {
    /// Dimension of the first stored vector; all later vectors must match.
    dimension: Option<usize>,
    tables: HashMap<String, SchemaDescriptor>,
}

/// Process-lifetime schema index. Initialized empty at startup and populated
/// only through [`SchemaIndex::put`].
#[derive(Default)]
pub struct SchemaIndex {
    inner: RwLock<IndexInner>,
}

impl std::fmt::Debug for SchemaIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaIndex").field("len", &self.len()).finish()
    }
}

impl SchemaIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the descriptor for its `table_name`.
    ///
    /// # Errors
    /// Rejects empty vectors and vectors whose dimension differs from the
    /// vectors already stored.
    pub fn put(&self, descriptor: SchemaDescriptor) -> Result<(), IndexError> {
        if descriptor.embedding.is_empty() {
            return Err(IndexError::EmptyEmbedding(descriptor.table_name));
        }
        let mut inner =
            self.inner.write().map_err(|e| IndexError::Unavailable(e.to_string()))?;
        match inner.dimension {
            Some(expected) if expected != descriptor.embedding.len() => {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    actual: descriptor.embedding.len(),
                });
            },
            Some(_) => {},
            None => inner.dimension = Some(descriptor.embedding.len()),
        }
        inner.tables.insert(descriptor.table_name.clone(), descriptor);
        Ok(())
    }

    /// Top-`k` descriptors by cosine similarity to `query_embedding`, ties
    /// broken by `table_name` ascending. An empty index yields an empty
    /// sequence, not an error.
    pub fn search(
        &self,
        query_embedding: &[f32],
        k: usize,
    ) -> Result<Vec<(SchemaDescriptor, f32)>, IndexError> {
        let inner = self.inner.read().map_err(|e| IndexError::Unavailable(e.to_string()))?;
        if inner.tables.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if let Some(expected) = inner.dimension {
            if expected != query_embedding.len() {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    actual: query_embedding.len(),
                });
            }
        }

        let mut scored: Vec<(SchemaDescriptor, f32)> = inner
            .tables
            .values()
            .map(|d| (d.clone(), cosine_similarity(&d.embedding, query_embedding)))
            .collect();
        scored.sort_by(|a, b| {
            b.1.total_cmp(&a.1).then_with(|| a.0.table_name.cmp(&b.0.table_name))
        });
        scored.truncate(k);
        Ok(scored)
    }

    /// Every stored descriptor. Order is unspecified.
    pub fn list_all(&self) -> Result<Vec<SchemaDescriptor>, IndexError> {
        let inner = self.inner.read().map_err(|e| IndexError::Unavailable(e.to_string()))?;
        Ok(inner.tables.values().cloned().collect())
    }

    /// Stored table names, used for the validator's soft schema-drift check.
    pub fn table_names(&self) -> Result<Vec<String>, IndexError> {
        let inner = self.inner.read().map_err(|e| IndexError::Unavailable(e.to_string()))?;
        Ok(inner.tables.keys().cloned().collect())
    }

    /// Dimension of stored vectors, if any are stored yet.
    pub fn dimension(&self) -> Option<usize> {
        self.inner.read().ok().and_then(|inner| inner.dimension)
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.tables.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cosine similarity of two equal-length vectors. Zero-magnitude vectors
/// score 0.0 rather than NaN.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabletalk_core::{ColumnDescriptor, SchemaDefinition};

    fn descriptor(name: &str, embedding: Vec<f32>) -> SchemaDescriptor {
        SchemaDescriptor::new(
            SchemaDefinition {
                table_name: name.to_owned(),
                columns: vec![ColumnDescriptor {
                    name: "id".to_owned(),
                    data_type: "INTEGER".to_owned(),
                    nullable: false,
                }],
                description: None,
            },
            embedding,
        )
    }

    #[test]
    fn search_ranks_by_cosine_similarity() {
        let index = SchemaIndex::new();
        index.put(descriptor("accounts", vec![1.0, 0.0])).unwrap();
        index.put(descriptor("loans", vec![0.0, 1.0])).unwrap();

        let hits = index.search(&[0.9, 0.1], 2).unwrap();
        assert_eq!(hits[0].0.table_name, "accounts");
        assert_eq!(hits[1].0.table_name, "loans");
        assert!(hits[0].1 > hits[1].1);
    }

    #[test]
    fn search_breaks_ties_by_table_name() {
        let index = SchemaIndex::new();
        index.put(descriptor("zebras", vec![1.0, 0.0])).unwrap();
        index.put(descriptor("accounts", vec![1.0, 0.0])).unwrap();

        let hits = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].0.table_name, "accounts");
        assert_eq!(hits[1].0.table_name, "zebras");
    }

    #[test]
    fn search_on_empty_index_returns_empty() {
        let index = SchemaIndex::new();
        assert!(index.search(&[1.0, 0.0], 3).unwrap().is_empty());
    }

    #[test]
    fn put_replaces_by_table_name() {
        let index = SchemaIndex::new();
        index.put(descriptor("accounts", vec![1.0, 0.0])).unwrap();
        index.put(descriptor("accounts", vec![0.0, 1.0])).unwrap();

        assert_eq!(index.len(), 1);
        let hits = index.search(&[0.0, 1.0], 1).unwrap();
        assert_eq!(hits[0].0.embedding, vec![0.0, 1.0]);
    }

    #[test]
    fn put_rejects_dimension_mismatch() {
        let index = SchemaIndex::new();
        index.put(descriptor("accounts", vec![1.0, 0.0])).unwrap();
        let err = index.put(descriptor("loans", vec![1.0, 0.0, 0.0])).unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { expected: 2, actual: 3 }));
    }

    #[test]
    fn search_rejects_query_dimension_mismatch() {
        let index = SchemaIndex::new();
        index.put(descriptor("accounts", vec![1.0, 0.0])).unwrap();
        let err = index.search(&[1.0, 0.0, 0.0], 1).unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { .. }));
    }

    #[test]
    fn put_rejects_empty_embedding() {
        let index = SchemaIndex::new();
        assert!(matches!(
            index.put(descriptor("accounts", vec![])).unwrap_err(),
            IndexError::EmptyEmbedding(_)
        ));
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn seeded_descriptor_is_top_hit_for_its_own_vector() {
        let index = SchemaIndex::new();
        index.put(descriptor("accounts", vec![0.6, 0.8])).unwrap();
        index.put(descriptor("loans", vec![-0.8, 0.6])).unwrap();
        index.put(descriptor("branches", vec![0.0, -1.0])).unwrap();

        let hits = index.search(&[0.6, 0.8], 1).unwrap();
        assert_eq!(hits[0].0.table_name, "accounts");
    }
}
