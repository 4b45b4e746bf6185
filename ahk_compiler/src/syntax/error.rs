//! Syntax errors with error-code mapping
//!
//! Every variant carries the 1-based line and column of the offending token so
//! the facade can report `{message, line, column}` without a source map.

use crate::logging::{codes, Code};
use crate::tokens::Token;

pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error("Unexpected token: expected {expected}, found '{found}' at {line}:{column}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: u32,
        column: u32,
    },

    #[error("Unexpected end of input: expected {expected} at {line}:{column}")]
    UnexpectedEndOfInput {
        expected: String,
        line: u32,
        column: u32,
    },

    #[error(
        "Syntax error at line {line}:{column} - Function calls require a space or \"(\"; commas only separate parameters"
    )]
    FunctionCallComma { line: u32, column: u32 },

    #[error("Label '{name}' is not valid here at {line}:{column}")]
    InvalidLabel { name: String, line: u32, column: u32 },

    #[error("Maximum parser nesting depth exceeded at {line}:{column}")]
    MaxRecursionDepth { line: u32, column: u32 },

    #[error("Unmatched block delimiter: {delimiter} at {line}:{column}")]
    UnmatchedBlockDelimiter {
        delimiter: String,
        line: u32,
        column: u32,
    },

    #[error("Parse error: {message} at {line}:{column}")]
    ParseError {
        message: String,
        line: u32,
        column: u32,
    },

    #[error("Internal parser error: {message}")]
    InternalParserError { message: String },
}

impl SyntaxError {
    /// Unexpected token, or end of input when `found` is the EOF token
    pub fn unexpected(expected: &str, found: &Token) -> Self {
        if found.token_type == crate::tokens::TokenType::Eof {
            return Self::UnexpectedEndOfInput {
                expected: expected.to_string(),
                line: found.line,
                column: found.column,
            };
        }
        Self::UnexpectedToken {
            expected: expected.to_string(),
            found: found.text.clone(),
            line: found.line,
            column: found.column,
        }
    }

    pub fn function_call_comma(comma: &Token) -> Self {
        Self::FunctionCallComma {
            line: comma.line,
            column: comma.column,
        }
    }

    pub fn invalid_label(name: &str, at: &Token) -> Self {
        Self::InvalidLabel {
            name: name.to_string(),
            line: at.line,
            column: at.column,
        }
    }

    pub fn max_recursion_depth(at: &Token) -> Self {
        Self::MaxRecursionDepth {
            line: at.line,
            column: at.column,
        }
    }

    pub fn unmatched_delimiter(delimiter: &str, at: &Token) -> Self {
        Self::UnmatchedBlockDelimiter {
            delimiter: delimiter.to_string(),
            line: at.line,
            column: at.column,
        }
    }

    pub fn parse_error(message: impl Into<String>, at: &Token) -> Self {
        Self::ParseError {
            message: message.into(),
            line: at.line,
            column: at.column,
        }
    }

    pub fn internal_parser_error(message: &str) -> Self {
        Self::InternalParserError {
            message: message.to_string(),
        }
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::UnexpectedEndOfInput { .. } => codes::syntax::UNEXPECTED_END_OF_INPUT,
            Self::FunctionCallComma { .. } => codes::syntax::FUNCTION_CALL_COMMA,
            Self::InvalidLabel { .. } => codes::syntax::INVALID_LABEL,
            Self::MaxRecursionDepth { .. } => codes::syntax::MAX_RECURSION_DEPTH,
            Self::UnmatchedBlockDelimiter { .. } => codes::syntax::UNMATCHED_BLOCK_DELIMITER,
            Self::ParseError { .. } => codes::syntax::PARSE_ERROR,
            Self::InternalParserError { .. } => codes::syntax::INTERNAL_PARSER_ERROR,
        }
    }

    /// 1-based (line, column), when the error has one
    pub fn location(&self) -> Option<(u32, u32)> {
        match self {
            Self::UnexpectedToken { line, column, .. }
            | Self::UnexpectedEndOfInput { line, column, .. }
            | Self::FunctionCallComma { line, column }
            | Self::InvalidLabel { line, column, .. }
            | Self::MaxRecursionDepth { line, column }
            | Self::UnmatchedBlockDelimiter { line, column, .. }
            | Self::ParseError { line, column, .. } => Some((*line, *column)),
            Self::InternalParserError { .. } => None,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }

    /// Message with the registry's recommended action appended
    pub fn enhanced_message(&self) -> String {
        match self {
            Self::UnexpectedToken {
                expected, found, ..
            } => format!(
                "Expected {} but found '{}'. {}",
                expected,
                found,
                self.recommended_action()
            ),
            Self::UnexpectedEndOfInput { expected, .. } => format!(
                "Unexpected end of input while expecting {}. {}",
                expected,
                self.recommended_action()
            ),
            // The comma message is user-facing text already
            Self::FunctionCallComma { .. } => self.to_string(),
            _ => format!("{} ({})", self, self.recommended_action()),
        }
    }
}

impl From<crate::tokens::TokenStreamError> for SyntaxError {
    fn from(error: crate::tokens::TokenStreamError) -> Self {
        use crate::tokens::TokenStreamError;
        match error {
            TokenStreamError::UnexpectedToken {
                expected,
                found,
                line,
                column,
            } => Self::UnexpectedToken {
                expected,
                found,
                line,
                column,
            },
            TokenStreamError::UnexpectedEndOfStream { expected } => Self::UnexpectedEndOfInput {
                expected,
                line: 1,
                column: 1,
            },
        }
    }
}
