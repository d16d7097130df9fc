use sqlparser::{
    dialect::Dialect,
    keywords::Keyword,
    tokenizer::{Location, Token as SqlToken, TokenWithSpan, Tokenizer, Whitespace}
};
use tracing::debug;

use super::{Token, TokenKind, TokenStream};
use crate::{dialect::SqlDialect, error::AnalysisError};

/// Characters that open a quoted literal or identifier
const QUOTE_OPENERS: [char; 5] = ['\'', '"', '`', '[', '$'];

/// Tokenize a single statement.
///
/// Lexing is best-effort: if the lexer rejects the input, the longest
/// prefix that lexes cleanly is kept and the remainder becomes one trailing
/// [`TokenKind::Literal`] token, so non-empty input always yields tokens.
///
/// # Errors
///
/// Returns [`AnalysisError::Parse`] when `sql` is empty or whitespace-only.
pub fn tokenize(sql: &str, dialect: SqlDialect) -> Result<TokenStream, AnalysisError> {
    if sql.trim().is_empty() {
        return Err(AnalysisError::empty_statement());
    }
    let parser_dialect = dialect.into_parser_dialect();
    let lines = line_offsets(sql);
    let tokens = match lex(parser_dialect.as_ref(), sql) {
        Ok(raw) => convert(raw, sql, &lines),
        Err(failed_at) => recover(parser_dialect.as_ref(), sql, &lines, failed_at)
    };
    Ok(TokenStream::new(sql, tokens))
}

/// Split a script into statements on top-level `;` tokens.
///
/// Semicolons inside literals and comments never split. Statements are
/// trimmed and empty ones dropped.
pub fn split_statements(sql: &str, dialect: SqlDialect) -> Vec<String> {
    let Ok(stream) = tokenize(sql, dialect) else {
        return Vec::new();
    };
    let mut statements = Vec::new();
    let mut current = String::new();
    for token in &stream {
        if token.is_punct(";") {
            push_statement(&mut statements, &mut current);
        } else {
            current.push_str(&token.text);
        }
    }
    push_statement(&mut statements, &mut current);
    statements
}

fn push_statement(statements: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_owned());
    }
    current.clear();
}

fn lex(dialect: &dyn Dialect, sql: &str) -> Result<Vec<TokenWithSpan>, Location> {
    Tokenizer::new(dialect, sql)
        .tokenize_with_location()
        .map_err(|e| e.location)
}

/// Keep the longest cleanly lexing prefix that ends right before a quote or
/// comment opener, and turn the rest into a single token
fn recover(dialect: &dyn Dialect, sql: &str, lines: &[usize], failed_at: Location) -> Vec<Token> {
    let limit = byte_offset(sql, lines, failed_at).unwrap_or(sql.len());
    debug!(offset = limit, "lexer rejected statement, keeping best-effort prefix");
    let cuts = sql
        .char_indices()
        .filter(|(idx, ch)| {
            *idx <= limit && (QUOTE_OPENERS.contains(ch) || opens_comment(&sql[*idx..]))
        })
        .map(|(idx, _)| idx)
        .rev();
    for cut in cuts {
        if cut == 0 {
            break;
        }
        if let Ok(raw) = lex(dialect, &sql[..cut]) {
            let mut tokens = convert(raw, sql, lines);
            tokens.push(remainder(sql, cut));
            return tokens;
        }
    }
    vec![remainder(sql, 0)]
}

fn opens_comment(rest: &str) -> bool {
    rest.starts_with("/*") || rest.starts_with("--")
}

fn remainder(sql: &str, from: usize) -> Token {
    let text = sql[from..].to_owned();
    let kind = if opens_comment(&text) {
        TokenKind::Comment
    } else {
        TokenKind::Literal
    };
    Token {
        kind,
        value: text.clone(),
        text,
        quoted: false,
        position: from
    }
}

fn convert(raw: Vec<TokenWithSpan>, sql: &str, lines: &[usize]) -> Vec<Token> {
    raw.into_iter()
        .filter(|t| !matches!(t.token, SqlToken::EOF))
        .map(|t| {
            let start = byte_offset(sql, lines, t.span.start);
            let end = byte_offset(sql, lines, t.span.end);
            let text = match (start, end) {
                (Some(s), Some(e)) if s < e => sql.get(s..e).map(str::to_owned),
                _ => None
            }
            .unwrap_or_else(|| t.token.to_string());
            build(t.token, text, start.unwrap_or(0))
        })
        .collect()
}

fn build(token: SqlToken, text: String, position: usize) -> Token {
    let (kind, value, quoted) = match token {
        SqlToken::Word(word) => {
            let quoted = word.quote_style.is_some();
            let kind = if !quoted && word.keyword != Keyword::NoKeyword {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            (kind, word.value, quoted)
        }
        SqlToken::Whitespace(Whitespace::SingleLineComment {
            ..
        })
        | SqlToken::Whitespace(Whitespace::MultiLineComment(_)) => {
            (TokenKind::Comment, text.clone(), false)
        }
        SqlToken::Whitespace(_) => (TokenKind::Whitespace, text.clone(), false),
        SqlToken::Number(..)
        | SqlToken::SingleQuotedString(_)
        | SqlToken::DoubleQuotedString(_)
        | SqlToken::NationalStringLiteral(_)
        | SqlToken::EscapedStringLiteral(_)
        | SqlToken::HexStringLiteral(_)
        | SqlToken::SingleQuotedByteStringLiteral(_)
        | SqlToken::DoubleQuotedByteStringLiteral(_)
        | SqlToken::DollarQuotedString(_) => (TokenKind::Literal, text.clone(), false),
        SqlToken::Placeholder(_) => (TokenKind::Identifier, text.clone(), false),
        _ => (TokenKind::Punctuation, text.clone(), false)
    };
    Token {
        kind,
        text,
        value,
        quoted,
        position
    }
}

/// Byte offset of the first character of every line
fn line_offsets(sql: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    offsets.extend(sql.match_indices('\n').map(|(idx, _)| idx + 1));
    offsets
}

/// Convert a 1-based (line, column) location into a byte offset; columns
/// count characters, not bytes
fn byte_offset(sql: &str, lines: &[usize], location: Location) -> Option<usize> {
    let line = usize::try_from(location.line).ok()?.checked_sub(1)?;
    let column = usize::try_from(location.column).ok()?.checked_sub(1)?;
    let start = *lines.get(line)?;
    let end = lines.get(line + 1).copied().unwrap_or(sql.len());
    let text = sql.get(start..end)?;
    Some(
        text.char_indices()
            .nth(column)
            .map_or(end, |(idx, _)| start + idx)
    )
}
