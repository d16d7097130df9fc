//! SQL tokenization on top of the `sqlparser` lexer.
//!
//! Every analysis step works on a [`TokenStream`]: a flat, immutable list of
//! typed tokens with byte positions into the original text. Navigation goes
//! through [`TokenStream::next_significant`] and
//! [`TokenStream::require_significant`], which skip whitespace and comments.
//!
//! # Example
//!
//! ```
//! use sql_template_analyzer::{
//!     dialect::SqlDialect,
//!     token::{TokenKind, tokenize}
//! };
//!
//! let stream = tokenize("SELECT id FROM users -- all", SqlDialect::Generic).unwrap();
//! let (idx, first) = stream.next_significant(0).unwrap();
//! assert_eq!(idx, 0);
//! assert!(first.is_keyword("select"));
//! assert!(stream.iter().any(|t| t.kind == TokenKind::Comment));
//! ```

mod ident;
mod lexer;
mod stream;
mod types;

pub use ident::{ObjectName, read_identifier, read_object_name};
pub use lexer::{split_statements, tokenize};
pub use stream::TokenStream;
pub use types::{Token, TokenKind};
