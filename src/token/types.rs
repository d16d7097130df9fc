use serde::Serialize;

/// Lexical class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Punctuation,
    Literal,
    Whitespace,
    Comment
}

/// Single lexed token.
///
/// `text` is the exact source slice; `value` is the identifier text with
/// quoting removed for words and equals `text` for everything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind:     TokenKind,
    pub text:     String,
    pub value:    String,
    pub quoted:   bool,
    /// Byte offset of the token in the statement text
    pub position: usize
}

impl Token {
    /// Whitespace and comments are not significant
    pub fn is_significant(&self) -> bool {
        !matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// Placeholder-style identifier (`?`, `$1`, `:name`, `@name`)
    pub fn is_bind_marker(&self) -> bool {
        self.kind == TokenKind::Identifier
            && !self.quoted
            && self.text.starts_with([':', '@', '$', '?'])
    }

    /// Keyword or identifier that names something
    pub fn is_word(&self) -> bool {
        matches!(self.kind, TokenKind::Keyword | TokenKind::Identifier) && !self.is_bind_marker()
    }

    /// Unquoted word equal to `keyword`, ignoring case.
    ///
    /// Lexer keyword tables differ between dialects, so plain identifiers are
    /// matched too.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.is_word() && !self.quoted && self.value.eq_ignore_ascii_case(keyword)
    }

    /// Unquoted word matching any of `keywords`
    pub fn is_any_keyword(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.is_keyword(k))
    }

    /// Punctuation token with exactly this text
    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == punct
    }

    /// Upper-cased value, used for keyword dispatch
    pub fn upper(&self) -> String {
        self.value.to_ascii_uppercase()
    }
}
