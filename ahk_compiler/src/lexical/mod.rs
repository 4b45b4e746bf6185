//! Lexical analysis for AutoHotkey v2
//!
//! [`rules`] holds the per-pass mode state and the classification hooks;
//! [`analyzer`] is the scanner that drives them. A fresh state is created for
//! every call, so concurrent tokenizations share nothing.

pub mod analyzer;
pub mod rules;

use crate::tokens::Token;

pub use analyzer::{LexerError, LexicalAnalyzer, LexicalMetrics};
pub use rules::{hotstring_option_scan, CharLookahead, HotstringMode, LexerState, TokenRules, TokenSnapshot};

/// Tokenize source text with default preferences
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
    LexicalAnalyzer::new().tokenize(source)
}

/// Tokenize and also return the pass metrics (residual depth included)
pub fn tokenize_with_metrics(source: &str) -> Result<(Vec<Token>, LexicalMetrics), LexerError> {
    let mut analyzer = LexicalAnalyzer::new();
    let tokens = analyzer.tokenize(source)?;
    Ok((tokens, analyzer.metrics().clone()))
}

/// Check that every lexical error code is registered
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    let lexical_codes = [
        crate::logging::codes::lexical::INVALID_CHARACTER,
        crate::logging::codes::lexical::UNTERMINATED_STRING,
        crate::logging::codes::lexical::UNTERMINATED_BLOCK_COMMENT,
        crate::logging::codes::lexical::IDENTIFIER_TOO_LONG,
        crate::logging::codes::lexical::STRING_TOO_LARGE,
        crate::logging::codes::lexical::SOURCE_TOO_LARGE,
        crate::logging::codes::lexical::TOO_MANY_TOKENS,
        crate::logging::codes::lexical::UNTERMINATED_REGION,
    ];

    for code in &lexical_codes {
        if crate::logging::codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexical_codes_registered() {
        assert!(init_lexical_analysis_logging().is_ok());
    }

    #[test]
    fn test_tokenize_with_metrics() {
        let (tokens, metrics) = tokenize_with_metrics("x := (1").unwrap();
        assert_eq!(metrics.total_tokens, tokens.len());
        assert_eq!(metrics.final_bracket_depth, 1);
    }
}
