//! Read-only safety validation of untrusted, model-generated SQL.
//!
//! This is the trust boundary between generation and execution. A raw model
//! reply goes in; either a single validated read-only statement comes out,
//! or a structured rejection. Nothing is ever executed speculatively.
//!
//! The disallowed-keyword set is a `const` slice so that extending it is a
//! data change, not a control-flow change.

mod extract;
mod lexer;

use thiserror::Error;

pub use extract::extract_candidate;
pub use lexer::{Token, tokenize};

/// Keywords that make a statement non-read-only, matched against bare word
/// tokens anywhere in the statement.
pub const DISALLOWED_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "CREATE", "TRUNCATE", "GRANT", "REVOKE",
    "COPY", "EXEC", "EXECUTE", "CALL", "MERGE", "VACUUM", "SET", "INTO",
];

/// Why a candidate statement was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// No recognizable SQL span in the model output.
    #[error("no SQL statement found in generated output")]
    NoStatement,

    /// A write/DDL keyword appeared in the statement.
    #[error("statement is not read-only: contains {keyword}")]
    WriteNotAllowed { keyword: String },

    /// A statement terminator was followed by further SQL.
    #[error("multiple statements are not allowed")]
    MultipleStatements,

    /// Leading keyword is neither SELECT nor WITH.
    #[error("only SELECT statements are allowed, found leading keyword {keyword}")]
    NotASelect { keyword: String },

    /// WITH chain that never reaches a SELECT.
    #[error("WITH clause does not terminate in a SELECT")]
    CteWithoutSelect,
}

/// A statement that passed every safety check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSql {
    /// The single read-only statement, trailing terminator stripped.
    pub statement: String,
    /// Best-effort table references (words after FROM/JOIN), lowercased.
    /// Used by callers for a soft schema-drift warning only.
    pub tables: Vec<String>,
}

/// Validate raw model output down to one read-only statement.
///
/// Extraction takes the first recognizable SQL span and ignores the rest
/// (never concatenates candidates); the token checks then enforce
/// single-statement, read-only form.
///
/// # Errors
/// A [`ValidationError`] naming the first failed check.
pub fn validate(raw_text: &str) -> Result<ValidatedSql, ValidationError> {
    let candidate = extract_candidate(raw_text).ok_or(ValidationError::NoStatement)?;
    validate_statement(&candidate)
}

/// Validate an already-extracted statement (the direct-execution path, where
/// the caller supplies SQL rather than prose containing SQL).
///
/// # Errors
/// A [`ValidationError`] naming the first failed check.
pub fn validate_statement(statement: &str) -> Result<ValidatedSql, ValidationError> {
    let tokens = tokenize(statement);
    if tokens.is_empty() {
        return Err(ValidationError::NoStatement);
    }

    // Statement stacking: a terminator followed by anything further.
    if let Some(pos) = tokens.iter().position(|t| *t == Token::Semicolon) {
        if tokens.len() > pos + 1 {
            return Err(ValidationError::MultipleStatements);
        }
    }

    for token in &tokens {
        if let Some(word) = token.keyword() {
            if DISALLOWED_KEYWORDS.contains(&word.as_str()) {
                return Err(ValidationError::WriteNotAllowed { keyword: word });
            }
        }
    }

    let leading = tokens
        .iter()
        .find_map(Token::keyword)
        .ok_or(ValidationError::NoStatement)?;
    match leading.as_str() {
        "SELECT" => {},
        "WITH" => {
            let has_select =
                tokens.iter().filter_map(Token::keyword).any(|w| w == "SELECT");
            if !has_select {
                return Err(ValidationError::CteWithoutSelect);
            }
        },
        other => return Err(ValidationError::NotASelect { keyword: other.to_owned() }),
    }

    let statement = statement.trim().trim_end_matches(';').trim_end().to_owned();
    let tables = referenced_tables(&tokens);
    Ok(ValidatedSql { statement, tables })
}

/// Words following FROM or JOIN, lowercased and deduplicated. Subqueries
/// (`FROM (`) contribute nothing at that position; their inner FROMs are
/// still visited because the scan is flat.
fn referenced_tables(tokens: &[Token]) -> Vec<String> {
    let mut tables = Vec::new();
    let mut iter = tokens.iter().peekable();
    while let Some(token) = iter.next() {
        let is_source_intro = matches!(
            token.keyword().as_deref(),
            Some("FROM" | "JOIN")
        );
        if !is_source_intro {
            continue;
        }
        match iter.peek() {
            Some(Token::Word(name)) => {
                let name = name.to_ascii_lowercase();
                if !tables.contains(&name) {
                    tables.push(name);
                }
            },
            Some(Token::QuotedIdent(name)) => {
                let name = name.to_ascii_lowercase();
                if !tables.contains(&name) {
                    tables.push(name);
                }
            },
            _ => {},
        }
    }
    tables
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic case scrambler for the randomized-casing properties.
    fn vary_case(s: &str, mut seed: u64) -> String {
        s.chars()
            .map(|c| {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                if seed & 1 == 0 { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() }
            })
            .collect()
    }

    #[test]
    fn accepts_plain_select() {
        let validated = validate_statement("SELECT * FROM accounts").unwrap();
        assert_eq!(validated.statement, "SELECT * FROM accounts");
        assert_eq!(validated.tables, vec!["accounts"]);
    }

    #[test]
    fn accepts_select_across_randomized_casing_and_whitespace() {
        for seed in 0..16 {
            let sql = vary_case("select\n  count(*)\tfrom transactions  where amount > 100;", seed);
            assert!(validate_statement(&sql).is_ok(), "rejected: {sql}");
        }
    }

    #[test]
    fn accepts_cte_terminating_in_select() {
        let sql = "WITH recent AS (SELECT * FROM transactions WHERE amount > 0)
                   SELECT COUNT(*) FROM recent";
        let validated = validate_statement(sql).unwrap();
        assert!(validated.tables.contains(&"transactions".to_owned()));
        assert!(validated.tables.contains(&"recent".to_owned()));
    }

    #[test]
    fn rejects_every_disallowed_keyword_any_casing() {
        for keyword in DISALLOWED_KEYWORDS {
            for seed in 0..4 {
                let sql = vary_case(&format!("SELECT 1; {keyword} something"), seed);
                // Stacked statements are caught first here; a bare write is
                // caught by the keyword check.
                assert!(validate_statement(&sql).is_err(), "accepted: {sql}");

                let bare = vary_case(&format!("{keyword} INTO t VALUES (1)"), seed);
                let err = validate_statement(&bare).unwrap_err();
                assert!(
                    matches!(err, ValidationError::WriteNotAllowed { .. }),
                    "wrong rejection for {bare}: {err:?}"
                );
            }
        }
    }

    #[test]
    fn rejects_select_into() {
        // SELECT INTO creates a table despite the SELECT leading keyword.
        let err = validate_statement("SELECT * INTO new_table FROM accounts").unwrap_err();
        assert_eq!(err, ValidationError::WriteNotAllowed { keyword: "INTO".to_owned() });
    }

    #[test]
    fn rejects_write_buried_in_select() {
        let err = validate_statement("SELECT * FROM t WHERE id IN (DELETE FROM t RETURNING id)")
            .unwrap_err();
        assert_eq!(err, ValidationError::WriteNotAllowed { keyword: "DELETE".to_owned() });
    }

    #[test]
    fn rejects_stacked_statements() {
        let err = validate_statement("SELECT 1; SELECT 2").unwrap_err();
        assert_eq!(err, ValidationError::MultipleStatements);
    }

    #[test]
    fn trailing_semicolon_alone_is_fine() {
        let validated = validate_statement("SELECT 1;").unwrap();
        assert_eq!(validated.statement, "SELECT 1");
    }

    #[test]
    fn trailing_semicolon_and_whitespace_is_fine() {
        assert!(validate_statement("SELECT 1;   \n").is_ok());
    }

    #[test]
    fn rejects_non_select_leading_keyword() {
        let err = validate_statement("EXPLAIN SELECT 1").unwrap_err();
        assert_eq!(err, ValidationError::NotASelect { keyword: "EXPLAIN".to_owned() });
    }

    #[test]
    fn rejects_with_that_never_selects() {
        // Degenerate, but the check must not assume well-formed CTEs.
        let err = validate_statement("WITH x AS (TABLE y)").unwrap_err();
        assert_eq!(err, ValidationError::CteWithoutSelect);
    }

    #[test]
    fn keyword_inside_string_literal_is_allowed() {
        assert!(validate_statement("SELECT 'DROP TABLE users' AS note").is_ok());
    }

    #[test]
    fn keyword_as_substring_of_identifier_is_allowed() {
        assert!(validate_statement("SELECT created_at, updated_at FROM accounts").is_ok());
    }

    #[test]
    fn empty_input_has_no_statement() {
        assert_eq!(validate_statement("   ").unwrap_err(), ValidationError::NoStatement);
        assert_eq!(validate("no sql here at all").unwrap_err(), ValidationError::NoStatement);
    }

    #[test]
    fn validates_fenced_model_output_end_to_end() {
        let raw = "Here is your query:\n```sql\nSELECT COUNT(*) FROM accounts;\n```\nThis counts all accounts.";
        let validated = validate(raw).unwrap();
        assert_eq!(validated.statement, "SELECT COUNT(*) FROM accounts");
    }

    #[test]
    fn second_candidate_in_output_is_ignored_not_concatenated() {
        let raw = "```sql\nSELECT 1;\n```\nand also\n```sql\nDROP TABLE accounts;\n```";
        let validated = validate(raw).unwrap();
        assert_eq!(validated.statement, "SELECT 1");
    }

    #[test]
    fn join_tables_are_collected() {
        let validated = validate_statement(
            "SELECT c.name, a.balance FROM customers c JOIN accounts a ON a.customer_id = c.customer_id",
        )
        .unwrap();
        assert_eq!(validated.tables, vec!["customers", "accounts"]);
    }
}
