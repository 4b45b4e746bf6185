//! Semantic token model, shaped after the LSP `semanticTokens` payload

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SemanticTokenType {
    Keyword,
    Number,
    String,
    Comment,
    Operator,
    Delimiter,
    Variable,
    Function,
    Method,
    Property,
    Class,
    Parameter,
    Label,
    Macro,
}

impl SemanticTokenType {
    /// Legend order; the index is the LSP token type id
    pub const ALL: [SemanticTokenType; 14] = [
        Self::Keyword,
        Self::Number,
        Self::String,
        Self::Comment,
        Self::Operator,
        Self::Delimiter,
        Self::Variable,
        Self::Function,
        Self::Method,
        Self::Property,
        Self::Class,
        Self::Parameter,
        Self::Label,
        Self::Macro,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Number => "number",
            Self::String => "string",
            Self::Comment => "comment",
            Self::Operator => "operator",
            Self::Delimiter => "delimiter",
            Self::Variable => "variable",
            Self::Function => "function",
            Self::Method => "method",
            Self::Property => "property",
            Self::Class => "class",
            Self::Parameter => "parameter",
            Self::Label => "label",
            Self::Macro => "macro",
        }
    }

    pub fn legend_index(&self) -> u32 {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0) as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SemanticTokenModifier {
    Declaration,
    Readonly,
    DefaultLibrary,
    Documentation,
}

impl SemanticTokenModifier {
    pub const ALL: [SemanticTokenModifier; 4] = [
        Self::Declaration,
        Self::Readonly,
        Self::DefaultLibrary,
        Self::Documentation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Declaration => "declaration",
            Self::Readonly => "readonly",
            Self::DefaultLibrary => "defaultLibrary",
            Self::Documentation => "documentation",
        }
    }

    /// Bit in the LSP modifier set
    pub fn bit(&self) -> u32 {
        let index = Self::ALL.iter().position(|m| m == self).unwrap_or(0);
        1 << index
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticToken {
    /// 0-based line
    pub line: u32,
    /// 0-based character offset within the line
    pub character: u32,
    /// Length in characters
    pub length: u32,
    pub token_type: SemanticTokenType,
    pub token_modifiers: Vec<SemanticTokenModifier>,
}

impl SemanticToken {
    pub fn has_modifier(&self, modifier: SemanticTokenModifier) -> bool {
        self.token_modifiers.contains(&modifier)
    }

    pub fn modifier_bits(&self) -> u32 {
        self.token_modifiers.iter().fold(0, |bits, m| bits | m.bit())
    }
}

/// LSP relative encoding: five integers per token (delta line, delta start,
/// length, type id, modifier bits). Tokens must be in source order.
pub fn encode_relative(tokens: &[SemanticToken]) -> Vec<u32> {
    let mut data = Vec::with_capacity(tokens.len() * 5);
    let (mut previous_line, mut previous_character) = (0u32, 0u32);

    for token in tokens {
        let delta_line = token.line - previous_line;
        let delta_start = if delta_line == 0 {
            token.character - previous_character
        } else {
            token.character
        };
        data.extend_from_slice(&[
            delta_line,
            delta_start,
            token.length,
            token.token_type.legend_index(),
            token.modifier_bits(),
        ]);
        previous_line = token.line;
        previous_character = token.character;
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(line: u32, character: u32, token_type: SemanticTokenType) -> SemanticToken {
        SemanticToken {
            line,
            character,
            length: 1,
            token_type,
            token_modifiers: Vec::new(),
        }
    }

    #[test]
    fn test_relative_encoding() {
        let mut builtin = token(0, 0, SemanticTokenType::Function);
        builtin.token_modifiers.push(SemanticTokenModifier::DefaultLibrary);
        let tokens = vec![
            builtin,
            token(0, 7, SemanticTokenType::String),
            token(2, 4, SemanticTokenType::Variable),
        ];
        assert_eq!(
            encode_relative(&tokens),
            vec![0, 0, 1, 7, 4, 0, 7, 1, 2, 0, 2, 4, 1, 6, 0]
        );
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_value(token(1, 2, SemanticTokenType::Keyword)).unwrap();
        assert_eq!(json["tokenType"], "keyword");
        assert_eq!(
            serde_json::to_value(SemanticTokenModifier::DefaultLibrary).unwrap(),
            "defaultLibrary"
        );
    }
}
