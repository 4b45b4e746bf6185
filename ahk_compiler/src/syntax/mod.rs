//! Syntax analysis - token stream to AST
//!
//! The parser is hand-written recursive descent over the default channel.
//! Whitespace and line breaks stay visible to it because they decide where a
//! statement ends and whether `Name x` is a call. The few decisions that need
//! lookahead past a whole line live in [`predicates`]; the rule chain that
//! led to a decision is tracked with [`RuleContext`].

pub mod context;
mod error;
mod expressions;
mod parser;
pub mod predicates;

pub use context::{RuleContext, RuleKind};
pub use error::{SyntaxError, SyntaxResult};
pub use parser::AhkParser;

use crate::ast::Program;
use crate::config::runtime::ParserPreferences;
use crate::lexical::LexerError;
use crate::logging::codes;
use crate::tokens::TokenStream;
use crate::{log_debug, log_error, log_info};

/// Tokenize and parse source text with default preferences
pub fn parse(source: &str) -> Result<Program, ParseFailure> {
    let tokens = crate::lexical::tokenize(source)?;
    Ok(parse_token_stream(TokenStream::new(tokens))?)
}

/// Parse an already tokenized stream
pub fn parse_token_stream(token_stream: TokenStream) -> SyntaxResult<Program> {
    parse_token_stream_with_preferences(token_stream, ParserPreferences::default())
}

pub fn parse_token_stream_with_preferences(
    token_stream: TokenStream,
    preferences: ParserPreferences,
) -> SyntaxResult<Program> {
    log_debug!("Starting syntax analysis", "tokens" => token_stream.len());
    AhkParser::with_preferences(token_stream, preferences).parse_program()
}

/// Failure of [`parse`]: either stage can reject the source
#[derive(Debug, thiserror::Error)]
pub enum ParseFailure {
    #[error(transparent)]
    Lexical(#[from] LexerError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl ParseFailure {
    pub fn error_code(&self) -> codes::Code {
        match self {
            Self::Lexical(error) => error.error_code(),
            Self::Syntax(error) => error.error_code(),
        }
    }
}

/// Check that every syntax error code is registered
pub fn init_syntax_logging() -> Result<(), String> {
    let syntax_codes = [
        codes::syntax::UNEXPECTED_TOKEN,
        codes::syntax::UNEXPECTED_END_OF_INPUT,
        codes::syntax::UNMATCHED_BLOCK_DELIMITER,
        codes::syntax::FUNCTION_CALL_COMMA,
        codes::syntax::INVALID_LABEL,
        codes::syntax::MAX_RECURSION_DEPTH,
        codes::syntax::PARSE_ERROR,
        codes::syntax::INTERNAL_PARSER_ERROR,
    ];

    for code in &syntax_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            log_error!(codes::system::INITIALIZATION_FAILURE,
                "Syntax error code missing from registry",
                "code" => code.as_str()
            );
            return Err(format!(
                "Syntax error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    log_info!("Syntax module logging validation completed");
    Ok(())
}
