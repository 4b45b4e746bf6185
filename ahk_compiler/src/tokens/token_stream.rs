//! Token stream over the default channel
//!
//! Keeps every token (hidden ones included) for tooling, and an index of the
//! default-channel tokens the parser walks. Whitespace and end-of-line tokens
//! stay on the default channel unless the lexer demoted them, so the parser
//! sees them and can tell `Foo (x)` from `Foo(x)`.

use crate::tokens::token::{Channel, Token, TokenType};

/// Lookahead over significant tokens, numbered from 1 like a parser's LA(i).
/// `la(1)` is the current token, `la(-1)` the previous one. Positions past
/// either end read as `Eof`.
pub trait TokenLookahead {
    fn lt(&self, i: isize) -> Option<&Token>;

    fn la(&self, i: isize) -> TokenType {
        self.lt(i).map(|t| t.token_type).unwrap_or(TokenType::Eof)
    }
}

#[derive(Debug, Clone)]
pub struct TokenStream {
    /// All tokens, hidden channel included
    all_tokens: Vec<Token>,
    /// Indices into all_tokens for default-channel tokens
    significant_indices: Vec<usize>,
    /// Current position in significant_indices
    position: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        let significant_indices = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.channel == Channel::Default)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();

        crate::log_debug!("Token stream built",
            "total_tokens" => tokens.len(),
            "significant_tokens" => significant_indices.len()
        );

        Self {
            all_tokens: tokens,
            significant_indices,
            position: 0,
        }
    }

    // === NAVIGATION ===

    pub fn current(&self) -> Option<&Token> {
        self.peek_ahead(0)
    }

    pub fn current_type(&self) -> TokenType {
        self.current().map(|t| t.token_type).unwrap_or(TokenType::Eof)
    }

    pub fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.significant_indices
            .get(self.position + n)
            .and_then(|&original_index| self.all_tokens.get(original_index))
    }

    /// Step past the current token and return it
    pub fn advance(&mut self) -> Option<&Token> {
        let index = *self.significant_indices.get(self.position)?;
        self.position += 1;
        self.all_tokens.get(index)
    }

    pub fn is_at_end(&self) -> bool {
        self.current_type() == TokenType::Eof
    }

    pub fn check(&self, expected: TokenType) -> bool {
        self.current_type() == expected
    }

    pub fn advance_if(&mut self, expected: TokenType) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, expected: TokenType) -> Result<Token, TokenStreamError> {
        match self.current() {
            Some(token) if token.token_type == expected => {
                let token = token.clone();
                self.advance();
                Ok(token)
            }
            Some(token) if token.token_type != TokenType::Eof => {
                Err(TokenStreamError::UnexpectedToken {
                    expected: expected.as_str().to_string(),
                    found: token.token_type.as_str().to_string(),
                    line: token.line,
                    column: token.column,
                })
            }
            _ => Err(TokenStreamError::UnexpectedEndOfStream {
                expected: expected.as_str().to_string(),
            }),
        }
    }

    pub fn save_position(&self) -> usize {
        self.position
    }

    pub fn restore_position(&mut self, saved_position: usize) {
        self.position = saved_position.min(self.significant_indices.len());
    }

    /// The most recently consumed significant token
    pub fn previous(&self) -> Option<&Token> {
        self.position
            .checked_sub(1)
            .and_then(|p| self.significant_indices.get(p))
            .and_then(|&i| self.all_tokens.get(i))
    }

    // === ACCESS ===

    pub fn all_tokens(&self) -> &[Token] {
        &self.all_tokens
    }

    pub fn len(&self) -> usize {
        self.significant_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.significant_indices.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

impl TokenLookahead for TokenStream {
    fn lt(&self, i: isize) -> Option<&Token> {
        let index = match i {
            0 => return None,
            i if i > 0 => self.position.checked_add(i as usize - 1)?,
            i => self.position.checked_sub(i.unsigned_abs())?,
        };
        self.significant_indices
            .get(index)
            .and_then(|&original| self.all_tokens.get(original))
    }
}

/// Lookahead view that skips whitespace tokens, for decisions that look past
/// the gap between words (`Loop Parse`, `case` labels)
pub struct SkipWhitespace<'a, L: TokenLookahead> {
    inner: &'a L,
}

impl<'a, L: TokenLookahead> SkipWhitespace<'a, L> {
    pub fn new(inner: &'a L) -> Self {
        Self { inner }
    }
}

impl<L: TokenLookahead> TokenLookahead for SkipWhitespace<'_, L> {
    fn lt(&self, i: isize) -> Option<&Token> {
        if i == 0 {
            return None;
        }

        let step: isize = if i > 0 { 1 } else { -1 };
        let mut remaining = i.abs();
        let mut raw: isize = 0;

        loop {
            raw += step;
            let token = self.inner.lt(raw)?;
            if token.token_type == TokenType::Ws {
                continue;
            }
            remaining -= 1;
            if remaining == 0 || token.token_type == TokenType::Eof {
                return Some(token);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TokenStreamError {
    #[error("Expected '{expected}', found '{found}' at {line}:{column}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: u32,
        column: u32,
    },

    #[error("Expected '{expected}', but reached end of input")]
    UnexpectedEndOfStream { expected: String },
}

impl TokenStreamError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            TokenStreamError::UnexpectedToken { .. } => {
                crate::logging::codes::syntax::UNEXPECTED_TOKEN
            }
            TokenStreamError::UnexpectedEndOfStream { .. } => {
                crate::logging::codes::syntax::UNEXPECTED_END_OF_INPUT
            }
        }
    }

    pub fn requires_halt(&self) -> bool {
        crate::logging::codes::requires_halt(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        crate::logging::codes::is_recoverable(self.error_code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;
    use assert_matches::assert_matches;

    fn tok(token_type: TokenType, text: &str, channel: Channel, offset: usize) -> Token {
        Token::new(token_type, text, channel, Position::new(offset, 1, offset as u32 + 1))
    }

    fn sample() -> TokenStream {
        TokenStream::new(vec![
            tok(TokenType::Loop, "Loop", Channel::Default, 0),
            tok(TokenType::Ws, " ", Channel::Default, 4),
            tok(TokenType::LineComment, "; c", Channel::Hidden, 5),
            tok(TokenType::Parse, "Parse", Channel::Default, 8),
            tok(TokenType::Eof, "", Channel::Default, 13),
        ])
    }

    #[test]
    fn test_hidden_tokens_are_skipped() {
        let stream = sample();
        assert_eq!(stream.len(), 4);
        assert_eq!(stream.all_tokens().len(), 5);
        assert_eq!(stream.la(2), TokenType::Ws);
        assert_eq!(stream.la(3), TokenType::Parse);
    }

    #[test]
    fn test_lookahead_past_end_reads_eof() {
        let stream = sample();
        assert_eq!(stream.la(10), TokenType::Eof);
        assert_eq!(stream.la(-1), TokenType::Eof);
        assert!(stream.lt(0).is_none());
    }

    #[test]
    fn test_previous_after_advance() {
        let mut stream = sample();
        stream.advance();
        assert_eq!(stream.la(-1), TokenType::Loop);
        assert_eq!(stream.previous().map(|t| t.token_type), Some(TokenType::Loop));
    }

    #[test]
    fn test_skip_whitespace_view() {
        let stream = sample();
        let view = SkipWhitespace::new(&stream);
        assert_eq!(view.la(1), TokenType::Loop);
        assert_eq!(view.la(2), TokenType::Parse);
        assert_eq!(view.la(3), TokenType::Eof);
        assert_eq!(view.la(7), TokenType::Eof);
    }

    #[test]
    fn test_expect_reports_position() {
        let mut stream = sample();
        assert!(stream.expect(TokenType::Loop).is_ok());
        assert_matches!(
            stream.expect(TokenType::Comma),
            Err(TokenStreamError::UnexpectedToken { line: 1, column: 5, .. })
        );
    }

    #[test]
    fn test_save_and_restore() {
        let mut stream = sample();
        let saved = stream.save_position();
        stream.advance();
        stream.advance();
        stream.restore_position(saved);
        assert_eq!(stream.current_type(), TokenType::Loop);
    }
}
