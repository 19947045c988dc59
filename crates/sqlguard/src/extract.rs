//! Candidate extraction from raw model output.
//!
//! Model replies mix prose and code. The extractor finds the first
//! recognizable SQL span: preferably a fenced code block, otherwise the
//! first line that starts with SELECT or WITH. Later candidates are ignored,
//! never concatenated.

/// Extract the first candidate statement from raw model output.
///
/// Returns `None` when the output contains nothing that looks like SQL; the
/// caller treats such a reply as an explanatory-only answer.
#[must_use]
pub fn extract_candidate(raw_text: &str) -> Option<String> {
    if let Some(block) = first_sql_fence(raw_text) {
        return Some(block);
    }
    first_bare_statement(raw_text)
}

/// First fenced block whose content reads as SQL. A language tag on the
/// opening fence (```sql) is stripped; an unterminated fence runs to the end
/// of the text.
fn first_sql_fence(raw_text: &str) -> Option<String> {
    let mut rest = raw_text;
    while let Some(start) = rest.find("```") {
        let after_fence = &rest[start + 3..];
        let (tag, body_start) = match after_fence.find('\n') {
            Some(nl) => (after_fence[..nl].trim(), nl + 1),
            None => (after_fence.trim(), after_fence.len()),
        };
        let body = &after_fence[body_start..];
        let content = match body.find("```") {
            Some(end) => &body[..end],
            None => body,
        };
        let content = content.trim();

        let tag_is_sql = tag.eq_ignore_ascii_case("sql");
        if !content.is_empty() && (tag_is_sql || tag.is_empty()) && looks_like_sql(content) {
            return Some(content.to_owned());
        }

        // Skip past this block (opening fence, body, closing fence if any).
        let consumed = start
            + 3
            + body_start
            + body.find("```").map_or(body.len(), |end| end + 3);
        rest = rest.get(consumed..)?;
    }
    None
}

/// Fallback for unfenced replies: the first line starting with SELECT or
/// WITH, through the end of the text (the statement terminator check
/// downstream handles anything stacked after it).
fn first_bare_statement(raw_text: &str) -> Option<String> {
    let mut offset = 0;
    for line in raw_text.lines() {
        if looks_like_sql(line.trim_start()) {
            return Some(raw_text[offset..].trim().to_owned());
        }
        offset += line.len() + 1;
    }
    None
}

fn looks_like_sql(text: &str) -> bool {
    let first_word: String = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    first_word.eq_ignore_ascii_case("select") || first_word.eq_ignore_ascii_case("with")
}
