use serde::{Deserialize, Serialize};

/// One column of an indexed table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
}

/// A table schema as supplied at seeding time, before embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub table_name: String,
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub description: Option<String>,
}

impl SchemaDefinition {
    /// Text handed to the embedding model. Must be stable: the same
    /// rendering is used at seeding time and (via retrieved descriptors)
    /// inside generation prompts.
    #[must_use]
    pub fn embed_text(&self) -> String {
        let mut text = format!("Table: {}\n{}", self.table_name, self.render_ddl());
        if let Some(desc) = &self.description {
            text.push_str("\nDescription: ");
            text.push_str(desc);
        }
        text
    }

    /// Render the columns as a `CREATE TABLE` statement for prompt context.
    #[must_use]
    pub fn render_ddl(&self) -> String {
        let cols = self
            .columns
            .iter()
            .map(|c| {
                let null = if c.nullable { "" } else { " NOT NULL" };
                format!("    {} {}{}", c.name, c.data_type, null)
            })
            .collect::<Vec<_>>()
            .join(",\n");
        format!("CREATE TABLE {} (\n{}\n);", self.table_name, cols)
    }
}

/// A vector-embedded table schema stored in the schema index.
///
/// Immutable once stored; identified uniquely by `table_name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    pub table_name: String,
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub description: Option<String>,
    pub embedding: Vec<f32>,
}

impl SchemaDescriptor {
    #[must_use]
    pub fn new(definition: SchemaDefinition, embedding: Vec<f32>) -> Self {
        Self {
            table_name: definition.table_name,
            columns: definition.columns,
            description: definition.description,
            embedding,
        }
    }

    /// The definition view, without the embedding vector.
    #[must_use]
    pub fn definition(&self) -> SchemaDefinition {
        SchemaDefinition {
            table_name: self.table_name.clone(),
            columns: self.columns.clone(),
            description: self.description.clone(),
        }
    }

    #[must_use]
    pub fn render_ddl(&self) -> String {
        self.definition().render_ddl()
    }
}

/// A schema search hit with its similarity score.
#[derive(Debug, Clone, Serialize)]
pub struct RankedSchema {
    pub table_name: String,
    pub score: f32,
    pub columns: Vec<ColumnDescriptor>,
    pub description: Option<String>,
}
