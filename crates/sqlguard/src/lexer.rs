//! Minimal SQL lexer for safety checks.
//!
//! Not a full SQL grammar: it only needs to separate keywords from string
//! literals, quoted identifiers, and comments so that deny-list matching
//! cannot false-positive on text inside a literal (`'please INSERT here'`)
//! or inside an identifier (`created_at`).

/// A lexed SQL token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Bare word: keyword, identifier, or number.
    Word(String),
    /// Double-quoted identifier. Never matched against keywords.
    QuotedIdent(String),
    /// Single-quoted string literal. Never matched against keywords.
    StringLit(String),
    /// Statement terminator.
    Semicolon,
    /// Any other single character (operators, parens, commas).
    Punct(char),
}

impl Token {
    /// Uppercased bare-word value, if this token is a bare word.
    #[must_use]
    pub fn keyword(&self) -> Option<String> {
        match self {
            Self::Word(w) => Some(w.to_ascii_uppercase()),
            _ => None,
        }
    }
}

/// Tokenize a statement, skipping whitespace, `--` line comments and
/// `/* */` block comments. Unterminated literals are tolerated: the rest of
/// the input becomes the literal, which is safe for a validator that only
/// rejects.
#[must_use]
pub fn tokenize(sql: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = sql.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            _ if c.is_whitespace() => i += 1,
            '-' if chars.get(i + 1) == Some(&'-') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            },
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i = (i + 2).min(chars.len());
            },
            '\'' => {
                let mut lit = String::new();
                i += 1;
                while i < chars.len() {
                    if chars[i] == '\'' {
                        // '' escapes a quote inside the literal
                        if chars.get(i + 1) == Some(&'\'') {
                            lit.push('\'');
                            i += 2;
                            continue;
                        }
                        i += 1;
                        break;
                    }
                    lit.push(chars[i]);
                    i += 1;
                }
                tokens.push(Token::StringLit(lit));
            },
            '"' => {
                let mut ident = String::new();
                i += 1;
                while i < chars.len() && chars[i] != '"' {
                    ident.push(chars[i]);
                    i += 1;
                }
                i = (i + 1).min(chars.len());
                tokens.push(Token::QuotedIdent(ident));
            },
            ';' => {
                tokens.push(Token::Semicolon);
                i += 1;
            },
            _ if c.is_alphanumeric() || c == '_' => {
                let mut word = String::new();
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    word.push(chars[i]);
                    i += 1;
                }
                tokens.push(Token::Word(word));
            },
            _ => {
                tokens.push(Token::Punct(c));
                i += 1;
            },
        }
    }
    tokens
}
