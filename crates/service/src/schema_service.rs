//! Schema seeding, listing, and similarity search.

use std::sync::Arc;

use tabletalk_core::{RankedSchema, SchemaDefinition, SchemaDescriptor};
use tabletalk_embeddings::Embedder;
use tabletalk_index::SchemaIndex;

use crate::error::ServiceError;

pub struct SchemaService {
    embedder: Arc<dyn Embedder>,
    index: Arc<SchemaIndex>,
}

impl SchemaService {
    #[must_use]
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<SchemaIndex>) -> Self {
        Self { embedder, index }
    }

    /// Embed and store one schema definition. Replaces any existing entry
    /// for the same table.
    ///
    /// # Errors
    /// Fails if the embedding backend or the index rejects the definition.
    pub async fn seed_one(&self, definition: SchemaDefinition) -> Result<(), ServiceError> {
        if definition.table_name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("table_name must not be empty".to_owned()));
        }
        let embedding = self.embedder.embed(&definition.embed_text()).await?;
        let table_name = definition.table_name.clone();
        self.index.put(SchemaDescriptor::new(definition, embedding))?;
        tracing::info!(table = %table_name, "seeded schema");
        Ok(())
    }

    /// Batch seeding. Per-table failures are logged and skipped so one bad
    /// definition does not abort the rest; returns the number stored.
    pub async fn seed(&self, definitions: Vec<SchemaDefinition>) -> usize {
        let mut stored = 0;
        for definition in definitions {
            let table = definition.table_name.clone();
            match self.seed_one(definition).await {
                Ok(()) => stored += 1,
                Err(e) => tracing::error!(table = %table, error = %e, "failed to seed schema"),
            }
        }
        stored
    }

    /// Every stored definition, without embeddings.
    ///
    /// # Errors
    /// Fails only if the index is unavailable.
    pub fn list(&self) -> Result<Vec<SchemaDefinition>, ServiceError> {
        let mut definitions: Vec<SchemaDefinition> =
            self.index.list_all()?.iter().map(SchemaDescriptor::definition).collect();
        definitions.sort_by(|a, b| a.table_name.cmp(&b.table_name));
        Ok(definitions)
    }

    /// Ranked similarity search over stored schemas.
    ///
    /// # Errors
    /// Fails if the embedding backend or the index fails.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<RankedSchema>, ServiceError> {
        if self.index.is_empty() {
            return Ok(Vec::new());
        }
        let query_vec = self.embedder.embed(query).await?;
        let hits = self.index.search(&query_vec, k)?;
        Ok(hits
            .into_iter()
            .map(|(descriptor, score)| RankedSchema {
                table_name: descriptor.table_name,
                score,
                columns: descriptor.columns,
                description: descriptor.description,
            })
            .collect())
    }
}
