use super::Token;
use crate::error::AnalysisError;

/// Ordered, immutable token sequence for one statement
#[derive(Debug, Clone)]
pub struct TokenStream {
    source: String,
    tokens: Vec<Token>
}

impl TokenStream {
    pub(crate) fn new(source: &str, tokens: Vec<Token>) -> Self {
        Self {
            source: source.to_owned(),
            tokens
        }
    }

    /// Statement text the tokens were produced from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// First significant token at or after `from`
    pub fn next_significant(&self, from: usize) -> Option<(usize, &Token)> {
        self.tokens
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, t)| t.is_significant())
    }

    /// Last significant token strictly before `before`
    pub fn prev_significant(&self, before: usize) -> Option<(usize, &Token)> {
        self.tokens
            .iter()
            .enumerate()
            .take(before.min(self.tokens.len()))
            .rev()
            .find(|(_, t)| t.is_significant())
    }

    /// Same as [`Self::next_significant`], for call sites where running out
    /// of tokens is a caller error
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Tokenization`] naming `expected` when no
    /// significant token remains.
    pub fn require_significant(
        &self,
        from: usize,
        expected: &str
    ) -> Result<(usize, &Token), AnalysisError> {
        self.next_significant(from)
            .ok_or_else(|| AnalysisError::tokenization(expected, from, &self.source))
    }

    /// Significant tokens with their indices
    pub fn significant(&self) -> impl Iterator<Item = (usize, &Token)> {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_significant())
    }

    /// Index of the `)` closing the `(` at `open`
    pub fn matching_paren(&self, open: usize) -> Option<usize> {
        if !self.tokens.get(open)?.is_punct("(") {
            return None;
        }
        let mut depth = 0usize;
        for (idx, token) in self.tokens.iter().enumerate().skip(open) {
            if token.is_punct("(") {
                depth += 1;
            } else if token.is_punct(")") {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
        }
        None
    }

    /// Index of the innermost unclosed `(` before `index`
    pub fn enclosing_paren(&self, index: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (idx, token) in self.tokens.iter().enumerate().take(index).rev() {
            if token.is_punct(")") {
                depth += 1;
            } else if token.is_punct("(") {
                if depth == 0 {
                    return Some(idx);
                }
                depth -= 1;
            }
        }
        None
    }

    /// Parenthesis depth just before `index`
    pub fn depth_at(&self, index: usize) -> usize {
        let mut depth = 0usize;
        for token in self.tokens.iter().take(index) {
            if token.is_punct("(") {
                depth += 1;
            } else if token.is_punct(")") {
                depth = depth.saturating_sub(1);
            }
        }
        depth
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
