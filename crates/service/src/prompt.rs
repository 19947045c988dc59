//! Prompt assembly for SQL generation and answer phrasing.
//!
//! Deterministic given identical inputs. History is truncated to the most
//! recent N turns so prompt size stays bounded; retrieved schemas are
//! rendered verbatim so the generator can only reference real columns.

use tabletalk_core::{QueryResult, Role, SchemaDescriptor, Turn};
use tabletalk_llm::Prompt;

const SQL_SYSTEM_PROMPT: &str = "You are a SQL expert. Generate accurate, safe PostgreSQL queries.
Rules:
1. Only generate SELECT statements (WITH ... SELECT is allowed)
2. Use proper PostgreSQL syntax
3. Include appropriate JOINs when needed
4. Use column names exactly as defined in the schema
5. Return exactly one SQL statement inside a ```sql fenced block
6. You may add one short sentence of explanation after the block";

const ANSWER_SYSTEM_PROMPT: &str = "You are a helpful data analyst. Answer clearly and concisely.
Rules:
1. Answer in natural language
2. Be specific with numbers
3. Keep responses under 200 words";

/// How many result rows are echoed into the answer-phrasing prompt.
const ANSWER_SAMPLE_ROWS: usize = 3;

/// Builds bounded generation requests from retrieved schemas, conversation
/// history, and the question.
#[derive(Debug, Clone, Copy)]
pub struct PromptAssembler {
    history_window: usize,
}

impl PromptAssembler {
    #[must_use]
    pub fn new(history_window: usize) -> Self {
        Self { history_window }
    }

    /// Assemble the SQL-generation prompt.
    #[must_use]
    pub fn assemble(
        &self,
        question: &str,
        schemas: &[SchemaDescriptor],
        history: &[Turn],
    ) -> Prompt {
        let mut user = String::new();

        if schemas.is_empty() {
            user.push_str("No schema context is available for this question.\n\n");
        } else {
            user.push_str("Database Schema:\n");
            for schema in schemas {
                user.push_str("Table: ");
                user.push_str(&schema.table_name);
                user.push('\n');
                user.push_str(&schema.render_ddl());
                if let Some(desc) = &schema.description {
                    user.push_str("Description: ");
                    user.push_str(desc);
                }
                user.push_str("\n\n");
            }
        }

        // Oldest turns drop first; the current question is appended last and
        // is never part of the window.
        let window_start = history.len().saturating_sub(self.history_window);
        let window = &history[window_start..];
        if !window.is_empty() {
            user.push_str("Conversation so far:\n");
            for turn in window {
                let role = match turn.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                };
                user.push_str(role);
                user.push_str(": ");
                user.push_str(&turn.content);
                user.push('\n');
            }
            user.push('\n');
        }

        user.push_str("User Question: ");
        user.push_str(question);
        user.push_str("\n\nGenerate a PostgreSQL SELECT query:");

        Prompt { system: SQL_SYSTEM_PROMPT.to_owned(), user }
    }

    /// Assemble the second-stage prompt that phrases an executed result as a
    /// natural-language answer.
    #[must_use]
    pub fn answer_prompt(question: &str, sql: &str, result: &QueryResult) -> Prompt {
        let mut result_text = String::new();
        if result.row_count == 0 {
            result_text.push_str("No results found.");
        } else {
            result_text.push_str(&format!(
                "Found {} result(s).\nColumns: {}\n",
                result.row_count,
                result.columns.join(", ")
            ));
            for (i, row) in result.rows.iter().take(ANSWER_SAMPLE_ROWS).enumerate() {
                let rendered: Vec<String> = result
                    .columns
                    .iter()
                    .zip(row.iter())
                    .map(|(col, val)| format!("{col}={val}"))
                    .collect();
                result_text.push_str(&format!("Row {}: {}\n", i + 1, rendered.join(", ")));
            }
            if result.row_count > ANSWER_SAMPLE_ROWS {
                result_text.push_str(&format!(
                    "... and {} more rows",
                    result.row_count - ANSWER_SAMPLE_ROWS
                ));
            }
        }

        let user = format!(
            "User Question: {question}\n\nSQL Query Used: {sql}\n\nQuery Results: {result_text}\n\nProvide a helpful response:"
        );
        Prompt { system: ANSWER_SYSTEM_PROMPT.to_owned(), user }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabletalk_core::{ColumnDescriptor, SchemaDefinition};

    fn schema(name: &str) -> SchemaDescriptor {
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
            vec![1.0],
        )
    }

    #[test]
    fn assemble_is_deterministic() {
        let assembler = PromptAssembler::new(4);
        let schemas = vec![schema("accounts")];
        let history = vec![Turn::user("hi"), Turn::assistant("hello")];
        let a = assembler.assemble("how many accounts", &schemas, &history);
        let b = assembler.assemble("how many accounts", &schemas, &history);
        assert_eq!(a, b);
    }

    #[test]
    fn assemble_renders_schema_columns_verbatim() {
        let assembler = PromptAssembler::new(4);
        let prompt = assembler.assemble("q", &[schema("accounts")], &[]);
        assert!(prompt.user.contains("CREATE TABLE accounts"));
        assert!(prompt.user.contains("id INTEGER NOT NULL"));
    }

    #[test]
    fn assemble_drops_oldest_turns_first() {
        let assembler = PromptAssembler::new(2);
        let history: Vec<Turn> =
            (0..5).map(|i| Turn::user(format!("message {i}"))).collect();
        let prompt = assembler.assemble("q", &[], &history);
        assert!(!prompt.user.contains("message 0"));
        assert!(!prompt.user.contains("message 2"));
        assert!(prompt.user.contains("message 3"));
        assert!(prompt.user.contains("message 4"));
    }

    #[test]
    fn assemble_always_keeps_current_question() {
        let assembler = PromptAssembler::new(0);
        let history = vec![Turn::user("old")];
        let prompt = assembler.assemble("the current question", &[], &history);
        assert!(prompt.user.contains("the current question"));
        assert!(!prompt.user.contains("old"));
    }

    #[test]
    fn assemble_instructs_fenced_single_statement() {
        let assembler = PromptAssembler::new(4);
        let prompt = assembler.assemble("q", &[], &[]);
        assert!(prompt.system.contains("exactly one SQL statement"));
        assert!(prompt.system.contains("```sql"));
    }

    #[test]
    fn answer_prompt_samples_rows_and_reports_total() {
        let result = QueryResult::ok(
            vec!["name".to_owned()],
            (0..5).map(|i| vec![serde_json::json!(format!("row{i}"))]).collect(),
        );
        let prompt = PromptAssembler::answer_prompt("q", "SELECT name FROM t", &result);
        assert!(prompt.user.contains("Found 5 result(s)"));
        assert!(prompt.user.contains("row2"));
        assert!(!prompt.user.contains("row3"));
        assert!(prompt.user.contains("... and 2 more rows"));
    }

    #[test]
    fn answer_prompt_handles_empty_result() {
        let result = QueryResult::ok(vec!["name".to_owned()], vec![]);
        let prompt = PromptAssembler::answer_prompt("q", "SELECT name FROM t", &result);
        assert!(prompt.user.contains("No results found."));
    }
}
