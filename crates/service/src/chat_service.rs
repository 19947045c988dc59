//! The retrieval-augmented chat pipeline.
//!
//! question → retrieve schemas → assemble prompt → generate → validate →
//! execute → phrase answer → append to session. Every external failure is
//! converted at this boundary into either an explanatory assistant turn or a
//! failed `QueryResult`; only an embedding-space mismatch aborts the request.

use std::sync::Arc;

use serde::Serialize;
use tabletalk_core::{QueryExecutor, QueryResult, Turn};
use tabletalk_index::{Retriever, SchemaIndex};
use tabletalk_llm::Generator;
use tabletalk_sqlguard::{ValidatedSql, ValidationError};

use crate::error::ServiceError;
use crate::prompt::PromptAssembler;
use crate::session_store::SessionStore;

/// Shown when the generation backend is unreachable or times out. The
/// session stays usable; the user may simply retry.
const GENERATION_UNAVAILABLE_MSG: &str =
    "The language model is currently unavailable, so I could not generate a query. \
     Please try again in a moment.";

/// Result of one chat turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub session_id: String,
    pub turn: Turn,
}

pub struct ChatService {
    retriever: Retriever,
    generator: Arc<dyn Generator>,
    executor: Arc<dyn QueryExecutor>,
    sessions: Arc<SessionStore>,
    index: Arc<SchemaIndex>,
    assembler: PromptAssembler,
}

impl ChatService {
    #[must_use]
    pub fn new(
        retriever: Retriever,
        generator: Arc<dyn Generator>,
        executor: Arc<dyn QueryExecutor>,
        sessions: Arc<SessionStore>,
        index: Arc<SchemaIndex>,
        history_window: usize,
    ) -> Self {
        Self {
            retriever,
            generator,
            executor,
            sessions,
            index,
            assembler: PromptAssembler::new(history_window),
        }
    }

    /// Handle one question. Always completes with a result or an explanatory
    /// error message; never hangs past the configured timeouts.
    ///
    /// # Errors
    /// `InvalidInput` for an empty question; `EmbeddingMismatch` when the
    /// question embeds into a different space than the index.
    pub async fn chat(
        &self,
        question: &str,
        session_id: Option<&str>,
    ) -> Result<ChatReply, ServiceError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ServiceError::InvalidInput("question must not be empty".to_owned()));
        }

        let session_id = self.sessions.get_or_create(session_id).await;
        let history = self
            .sessions
            .snapshot(&session_id)
            .await
            .map(|s| s.turns)
            .unwrap_or_default();
        self.sessions.append(&session_id, Turn::user(question)).await;

        let turn = self.answer(question, &history).await?;
        self.sessions.append(&session_id, turn.clone()).await;
        Ok(ChatReply { session_id, turn })
    }

    /// Direct execution path: skip retrieval/generation, keep validation and
    /// bounded execution. Validation failures come back as a failed result
    /// rather than an executed statement.
    pub async fn execute_sql(&self, raw_statement: &str) -> QueryResult {
        match tabletalk_sqlguard::validate_statement(raw_statement) {
            Ok(validated) => {
                self.warn_on_unknown_tables(&validated);
                self.executor.execute(&validated.statement).await
            },
            Err(e) => {
                tracing::info!(error = %e, "direct statement rejected");
                QueryResult::failure(e.to_string())
            },
        }
    }

    async fn answer(&self, question: &str, history: &[Turn]) -> Result<Turn, ServiceError> {
        let schemas = match self.retriever.retrieve(question).await {
            Ok(schemas) => schemas,
            Err(e) if e.is_degraded() => {
                tracing::warn!(error = %e, "retrieval degraded, continuing with empty schema context");
                Vec::new()
            },
            Err(e) => return Err(ServiceError::EmbeddingMismatch(e)),
        };

        let prompt = self.assembler.assemble(question, &schemas, history);
        let raw = match self.generator.generate(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "generation unavailable");
                return Ok(Turn::assistant(GENERATION_UNAVAILABLE_MSG));
            },
        };

        let validated = match tabletalk_sqlguard::validate(&raw) {
            Ok(validated) => validated,
            Err(ValidationError::NoStatement) => {
                // The model answered in prose. Pass it through as an
                // explanatory-only turn; nothing reaches the executor.
                return Ok(Turn::assistant(raw.trim()));
            },
            Err(e) => {
                tracing::info!(error = %e, "generated statement rejected");
                return Ok(Turn::assistant(format!(
                    "I generated a query that did not pass safety validation, so it was not \
                     executed: {e}. Try rephrasing your question."
                )));
            },
        };

        self.warn_on_unknown_tables(&validated);
        let result = self.executor.execute(&validated.statement).await;

        let content = if result.success {
            self.phrase_answer(question, &validated.statement, &result).await
        } else {
            format!(
                "The query failed to execute: {}",
                result.error.as_deref().unwrap_or("unknown error")
            )
        };
        Ok(Turn::assistant_with_query(content, validated.statement, result))
    }

    /// Schema drift is a soft warning: ad-hoc exploration of unindexed
    /// tables stays allowed.
    fn warn_on_unknown_tables(&self, validated: &ValidatedSql) {
        let Ok(known) = self.index.table_names() else { return };
        if references_only_unindexed(&validated.tables, &known) {
            tracing::warn!(
                tables = ?validated.tables,
                "statement references no indexed table"
            );
        }
    }

    async fn phrase_answer(&self, question: &str, sql: &str, result: &QueryResult) -> String {
        let prompt = PromptAssembler::answer_prompt(question, sql, result);
        match self.generator.generate(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "answer phrasing failed, using fallback");
                format!("The query returned {} row(s).", result.row_count)
            },
        }
    }
}

/// True when every referenced table misses the index. Extracted references
/// are lowercased, seeded names keep their original case, so the match is
/// case-insensitive. Empty either side is not drift.
fn references_only_unindexed(referenced: &[String], known: &[String]) -> bool {
    if referenced.is_empty() || known.is_empty() {
        return false;
    }
    referenced.iter().all(|t| !known.iter().any(|k| k.eq_ignore_ascii_case(t)))
}
