//! Token model for AutoHotkey v2 source
//!
//! The lexer produces a flat `Vec<Token>` covering every character of the
//! input. [`TokenStream`] wraps it for the parser, exposing only the default
//! channel and parser-style `LA(i)` lookahead through [`TokenLookahead`].
//!
//! Whitespace and end-of-line tokens are significant in AutoHotkey: a newline
//! ends a statement unless the line ended with a continuation operator, and a
//! space separates a bare function name from its first argument. Both stay on
//! the default channel unless the lexer demoted them to `Hidden`.

pub mod token;
pub mod token_stream;

pub use token::{keyword_from_word, Channel, Token, TokenClass, TokenType, LINE_CONTINUATION_OPERATORS};
pub use token_stream::{SkipWhitespace, TokenLookahead, TokenStream, TokenStreamError};

pub use crate::utils::{Position, Span};
