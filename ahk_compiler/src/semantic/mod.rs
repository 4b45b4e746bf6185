//! Semantic tokens for editor highlighting

pub mod builtins;
pub mod provider;
pub mod types;

pub use provider::SemanticTokenProvider;
pub use types::{encode_relative, SemanticToken, SemanticTokenModifier, SemanticTokenType};

/// Semantic tokens for `source` with the default provider
pub fn semantic_tokens(source: &str) -> Result<Vec<SemanticToken>, crate::lexical::LexerError> {
    SemanticTokenProvider::new().tokens(source)
}
