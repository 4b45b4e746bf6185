//! Compiler facade
//!
//! One entry point per pass over a source string. Every call builds its own
//! lexer, parser and linter, so a single [`AhkCompiler`] can be shared across
//! threads. Failures never escape as `Err`: they are reported inside the
//! returned [`CompilerResult`].

pub mod result;
pub mod statistics;

pub use result::{AnalysisResult, CompilerError, CompilerResult};
pub use statistics::SourceStatistics;

use crate::ast::Program;
use crate::config::runtime::{LexerPreferences, LintPreferences, ParserPreferences, RuntimeConfig};
use crate::lexical::LexicalAnalyzer;
use crate::lint::{AhkLinter, DiagnosticSeverity, LintDiagnostic};
use crate::logging::codes;
use crate::semantic::{SemanticToken, SemanticTokenProvider};
use crate::syntax::parse_token_stream_with_preferences;
use crate::tokens::{Token, TokenStream};
use crate::{log_debug, log_performance};
use std::fmt::Write as _;
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct AhkCompiler {
    lexer_preferences: LexerPreferences,
    parser_preferences: ParserPreferences,
    lint_preferences: LintPreferences,
}

impl AhkCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &RuntimeConfig) -> Self {
        Self {
            lexer_preferences: config.lexer.clone(),
            parser_preferences: config.parser.clone(),
            lint_preferences: config.lint.clone(),
        }
    }

    pub fn tokenize(&self, source: &str) -> CompilerResult<Vec<Token>> {
        CompilerResult::from_result(self.lex(source))
    }

    pub fn parse(&self, source: &str) -> CompilerResult<Program> {
        match self.lex(source) {
            Ok(tokens) => CompilerResult::from_result(self.parse_tokens(tokens)),
            Err(error) => CompilerResult::failed((&error).into()),
        }
    }

    /// Lint diagnostics, parse failures included as diagnostics
    pub fn lint(&self, source: &str) -> CompilerResult<Vec<LintDiagnostic>> {
        CompilerResult::ok(AhkLinter::with_preferences(self.lint_preferences.clone()).lint(source))
    }

    pub fn semantic_tokens(&self, source: &str) -> CompilerResult<Vec<SemanticToken>> {
        CompilerResult::from_result(SemanticTokenProvider::new().tokens(source))
    }

    /// Run every pass; each part of the result succeeds or fails on its own
    pub fn analyze(&self, source: &str) -> AnalysisResult {
        let start_time = Instant::now();

        let tokens = self.tokenize(source);
        let ast = match &tokens.data {
            Some(data) => CompilerResult::from_result(self.parse_tokens(data.clone())),
            None => CompilerResult {
                success: false,
                data: None,
                errors: tokens.errors.clone(),
            },
        };
        let semantic_tokens = match &tokens.data {
            Some(data) => CompilerResult::ok(SemanticTokenProvider::new().classify(data)),
            None => CompilerResult {
                success: false,
                data: None,
                errors: tokens.errors.clone(),
            },
        };

        let analysis = AnalysisResult {
            tokens,
            ast,
            diagnostics: self.lint(source),
            semantic_tokens,
        };

        log_performance!(codes::success::ANALYSIS_COMPLETE, "Analysis completed",
            duration = start_time.elapsed(),
            "success" => analysis.success(),
            "errors" => analysis.all_errors().len(),
            "semantic_tokens" => analysis.semantic_token_count()
        );
        analysis
    }

    /// True when the source parses and lint reports no errors
    pub fn validate(&self, source: &str) -> bool {
        if !self.parse(source).success {
            return false;
        }
        self.lint(source)
            .data
            .map_or(false, |diagnostics| !diagnostics.iter().any(LintDiagnostic::is_error))
    }

    pub fn format_diagnostics(&self, diagnostics: &[LintDiagnostic]) -> String {
        format_diagnostics(diagnostics)
    }

    /// Size and complexity figures. A parse failure still yields the token
    /// counts, with the error attached.
    pub fn statistics(&self, source: &str) -> CompilerResult<SourceStatistics> {
        let tokens = match self.lex(source) {
            Ok(tokens) => tokens,
            Err(error) => return CompilerResult::failed((&error).into()),
        };

        let mut statistics = SourceStatistics::from_tokens(source, &tokens);
        let mut errors = Vec::new();
        match self.parse_tokens(tokens) {
            Ok(program) => statistics.add_program(&program),
            Err(error) => errors.push(CompilerError::from(&error)),
        }

        CompilerResult {
            success: true,
            data: Some(statistics),
            errors,
        }
    }

    fn lex(&self, source: &str) -> Result<Vec<Token>, crate::lexical::LexerError> {
        LexicalAnalyzer::with_preferences(self.lexer_preferences.clone()).tokenize(source)
    }

    fn parse_tokens(&self, tokens: Vec<Token>) -> crate::syntax::SyntaxResult<Program> {
        log_debug!("Facade parse", "tokens" => tokens.len());
        parse_token_stream_with_preferences(TokenStream::new(tokens), self.parser_preferences.clone())
    }
}

/// Human-readable report grouped by severity
pub fn format_diagnostics(diagnostics: &[LintDiagnostic]) -> String {
    if diagnostics.is_empty() {
        return "No issues found!".to_string();
    }

    let mut output = format!("Found {} issue(s):\n", diagnostics.len());
    let sections = [
        (DiagnosticSeverity::Error, "Errors"),
        (DiagnosticSeverity::Warning, "Warnings"),
        (DiagnosticSeverity::Info, "Info"),
    ];

    for (severity, title) in sections {
        let group: Vec<&LintDiagnostic> = diagnostics.iter().filter(|d| d.severity == severity).collect();
        if group.is_empty() {
            continue;
        }
        let _ = writeln!(output, "\n{} ({}):", title, group.len());
        for (index, diagnostic) in group.iter().enumerate() {
            let _ = writeln!(
                output,
                "  {}. Line {}, Col {}: {}",
                index + 1,
                diagnostic.line(),
                diagnostic.column(),
                diagnostic.message
            );
        }
    }

    output.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Statement;
    use crate::lint::DiagnosticRange;
    use assert_matches::assert_matches;

    #[test]
    fn test_tokenize_and_parse() {
        let compiler = AhkCompiler::new();
        let tokens = compiler.tokenize("x := 1");
        assert!(tokens.success);
        assert!(tokens.errors.is_empty());

        let ast = compiler.parse("F1::Send(\"hi\")");
        assert!(ast.success);
        let program = ast.data.unwrap();
        assert_matches!(program.body[0], Statement::Hotkey { .. });
    }

    #[test]
    fn test_remap_parses() {
        let program = AhkCompiler::new().parse("a::b").into_result().unwrap();
        assert_matches!(program.body[0], Statement::Remap { .. });
    }

    #[test]
    fn test_parse_failure_has_location() {
        let result = AhkCompiler::new().parse("MsgBox, 1");
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!((result.errors[0].line, result.errors[0].column), (1, 7));
    }

    #[test]
    fn test_lexer_failure_reaches_every_pass() {
        let analysis = AhkCompiler::new().analyze("s := \"open");
        assert!(!analysis.tokens.success);
        assert!(!analysis.ast.success);
        assert!(!analysis.semantic_tokens.success);
        assert!(analysis.diagnostics.success);
        assert!(!analysis.success());
    }

    #[test]
    fn test_analyze_clean_source() {
        let analysis = AhkCompiler::new().analyze("Greet() {\n    MsgBox(\"hello\")\n}\n");
        assert!(analysis.success());
        assert!(analysis.semantic_token_count() > 0);
        let json = serde_json::to_value(&analysis).unwrap();
        assert!(json.get("semanticTokens").is_some());
    }

    #[test]
    fn test_validate() {
        let compiler = AhkCompiler::new();
        assert!(compiler.validate("count := 1\nMsgBox(count)\n"));
        assert!(!compiler.validate("if true {\n    MsgBox(1)\n"));
        assert!(!compiler.validate("MsgBox, 1"));
    }

    #[test]
    fn test_validate_continuation_sections_and_dynamic_names() {
        let compiler = AhkCompiler::new();
        assert!(compiler.validate("x := \"\n(\nline1\nline2\n)\"\n"));
        assert!(compiler.validate("x := var%n%\n"));
        assert!(compiler.validate("item%i% := %a%%b%\n"));
        assert!(!compiler.validate("x := \"\n(\nline1\n"));
    }

    #[test]
    fn test_statistics_for_nested_control_flow() {
        let source = "Run() {\n    loop 3 {\n        if A_Index > 1 {\n            return\n        }\n    }\n}\n";
        let result = AhkCompiler::new().statistics(source);
        assert!(result.success);
        let statistics = result.data.unwrap();
        assert_eq!(statistics.functions, 1);
        assert_eq!(statistics.complexity, 1 + 1 + 2 + 1);
    }

    #[test]
    fn test_statistics_survive_parse_failure() {
        let result = AhkCompiler::new().statistics("; note\nMsgBox, 1");
        assert!(result.success);
        assert_eq!(result.errors.len(), 1);
        let statistics = result.data.unwrap();
        assert_eq!(statistics.comments, 1);
        assert_eq!(statistics.lines, 2);
        assert_eq!(statistics.complexity, 1);
    }

    #[test]
    fn test_format_diagnostics() {
        assert_eq!(format_diagnostics(&[]), "No issues found!");

        let diagnostics = vec![
            LintDiagnostic::new("ParseError", DiagnosticSeverity::Error, "Unexpected token", DiagnosticRange::at(2, 5)),
            LintDiagnostic::new("ShortName", DiagnosticSeverity::Info, "Short name 'q'", DiagnosticRange::at(1, 1)),
        ];
        let report = AhkCompiler::new().format_diagnostics(&diagnostics);
        assert_eq!(
            report,
            "Found 2 issue(s):\n\nErrors (1):\n  1. Line 2, Col 5: Unexpected token\n\nInfo (1):\n  1. Line 1, Col 1: Short name 'q'"
        );
    }
}
