//! Uniform result envelope returned by every facade operation

use crate::ast::Program;
use crate::lexical::LexerError;
use crate::lint::LintDiagnostic;
use crate::semantic::SemanticToken;
use crate::syntax::{ParseFailure, SyntaxError};
use crate::tokens::Token;
use crate::utils::{Position, SourceMap, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// User-facing failure with a 1-based location; defaults to 1:1 when the
/// underlying error has no position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl CompilerError {
    pub fn new(message: impl Into<String>, location: Option<(u32, u32)>) -> Self {
        let (line, column) = location.unwrap_or((1, 1));
        Self {
            message: message.into(),
            line,
            column,
        }
    }

    /// The message with the offending source line and a caret under the column
    pub fn render(&self, source: &str) -> String {
        let position = Position::new(0, self.line, self.column);
        SourceMap::new(source.to_string()).format_error(&Span::point(position), &self.message)
    }
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl From<&LexerError> for CompilerError {
    fn from(error: &LexerError) -> Self {
        Self::new(error.to_string(), error.location())
    }
}

impl From<&SyntaxError> for CompilerError {
    fn from(error: &SyntaxError) -> Self {
        Self::new(error.to_string(), error.location())
    }
}

impl From<&ParseFailure> for CompilerError {
    fn from(error: &ParseFailure) -> Self {
        match error {
            ParseFailure::Lexical(error) => error.into(),
            ParseFailure::Syntax(error) => error.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub errors: Vec<CompilerError>,
}

impl<T> CompilerResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn failed(error: CompilerError) -> Self {
        Self {
            success: false,
            data: None,
            errors: vec![error],
        }
    }

    pub fn from_result<E>(result: Result<T, E>) -> Self
    where
        for<'e> &'e E: Into<CompilerError>,
    {
        match result {
            Ok(data) => Self::ok(data),
            Err(error) => Self::failed((&error).into()),
        }
    }

    pub fn into_result(self) -> Result<T, Vec<CompilerError>> {
        match self.data {
            Some(data) if self.success => Ok(data),
            _ => Err(self.errors),
        }
    }
}

/// Every pass over one source, each with its own outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub tokens: CompilerResult<Vec<Token>>,
    pub ast: CompilerResult<Program>,
    pub diagnostics: CompilerResult<Vec<LintDiagnostic>>,
    pub semantic_tokens: CompilerResult<Vec<SemanticToken>>,
}

impl AnalysisResult {
    pub fn success(&self) -> bool {
        self.tokens.success && self.ast.success && self.diagnostics.success && self.semantic_tokens.success
    }

    /// Errors from every pass, in pass order
    pub fn all_errors(&self) -> Vec<&CompilerError> {
        self.tokens
            .errors
            .iter()
            .chain(&self.ast.errors)
            .chain(&self.diagnostics.errors)
            .chain(&self.semantic_tokens.errors)
            .collect()
    }

    pub fn semantic_token_count(&self) -> usize {
        self.semantic_tokens.data.as_ref().map_or(0, Vec::<SemanticToken>::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_location_defaults() {
        let error = CompilerError::new("Token limit exceeded", None);
        assert_eq!((error.line, error.column), (1, 1));
        assert_eq!(error.to_string(), "1:1: Token limit exceeded");
    }

    #[test]
    fn test_render_points_at_column() {
        let error = CompilerError::new("Functions cannot be called with a comma", Some((2, 7)));
        let rendered = error.render("x := 1\nMsgBox, 1");
        assert!(rendered.contains("--> 2:7"));
        assert!(rendered.contains("2 | MsgBox, 1"));
        assert!(rendered.lines().any(|l| l.ends_with("      ^")));
    }

    #[test]
    fn test_from_syntax_error() {
        let error = SyntaxError::FunctionCallComma { line: 3, column: 7 };
        let result: CompilerResult<()> = CompilerResult::from_result(Err(error));
        assert!(!result.success);
        assert_eq!((result.errors[0].line, result.errors[0].column), (3, 7));
        assert!(result.errors[0].message.starts_with("Syntax error at line 3:7"));
    }

    #[test]
    fn test_serialization_omits_missing_data() {
        let failed: CompilerResult<u32> = CompilerResult::failed(CompilerError::new("bad", Some((2, 4))));
        let json = serde_json::to_value(&failed).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["errors"][0]["line"], 2);
        assert_eq!(CompilerResult::ok(5u32).into_result(), Ok(5));
    }
}
