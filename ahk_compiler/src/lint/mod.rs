//! Static checks over AutoHotkey v2 scripts
//!
//! Token and text rules always run. Tree rules need a parsed program; when
//! parsing fails the parse error itself becomes an error diagnostic.

pub mod token_rules;
pub mod tree_rules;
pub mod types;

pub use types::{DiagnosticRange, DiagnosticSeverity, DiagnosticSink, LintDiagnostic, LintMetrics};

use crate::config::runtime::LintPreferences;
use crate::lexical::LexerError;
use crate::logging::codes;
use crate::syntax::{parse_token_stream, SyntaxError};
use crate::tokens::{Token, TokenStream};
use crate::{log_debug, log_success, log_warning};
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct AhkLinter {
    preferences: LintPreferences,
}

impl AhkLinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(preferences: LintPreferences) -> Self {
        Self { preferences }
    }

    /// Lint source text, returning diagnostics in source order
    pub fn lint(&self, source: &str) -> Vec<LintDiagnostic> {
        self.lint_with_metrics(source).0
    }

    pub fn lint_with_metrics(&self, source: &str) -> (Vec<LintDiagnostic>, LintMetrics) {
        let start_time = Instant::now();
        let mut sink = DiagnosticSink::default();

        let parsed = match crate::lexical::tokenize(source) {
            Ok(tokens) => self.lint_tokens(source, tokens, &mut sink),
            Err(error) => {
                sink.push(lexer_diagnostic(&error));
                false
            }
        };

        let dropped = sink.dropped();
        let diagnostics = sink.into_sorted();
        let mut metrics = LintMetrics::tally(&diagnostics);
        metrics.dropped = dropped;
        metrics.parsed = parsed;
        metrics.duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

        if dropped > 0 {
            log_warning!("Diagnostic limit reached",
                "code" => codes::lint::DIAGNOSTIC_LIMIT_REACHED,
                "dropped" => dropped
            );
        }
        if metrics.errors > 0 {
            log_warning!("Lint found errors",
                "code" => codes::lint::LINT_ERRORS_FOUND,
                "errors" => metrics.errors
            );
        }
        log_success!(codes::success::LINT_COMPLETE, "Lint completed",
            "errors" => metrics.errors,
            "warnings" => metrics.warnings,
            "infos" => metrics.infos,
            "duration_ms" => format!("{:.3}", metrics.duration_ms)
        );

        (diagnostics, metrics)
    }

    /// Returns whether the tokens parsed
    fn lint_tokens(&self, source: &str, tokens: Vec<Token>, sink: &mut DiagnosticSink) -> bool {
        let prefs = &self.preferences;

        token_rules::check_bracket_balance(&tokens, sink);
        if prefs.check_assignment_operator {
            token_rules::check_assignment_operator(&tokens, sink);
        }
        if prefs.check_short_names {
            token_rules::check_short_names(&tokens, sink);
        }
        if prefs.check_trailing_whitespace {
            token_rules::check_trailing_whitespace(source, sink);
        }
        if prefs.check_line_length {
            token_rules::check_line_length(source, sink);
        }

        let program = match parse_token_stream(TokenStream::new(tokens)) {
            Ok(program) => program,
            Err(error) => {
                sink.push(syntax_diagnostic(&error));
                return false;
            }
        };

        log_debug!("Running tree lint rules", "statements" => program.body.len());
        if prefs.check_unreachable_code {
            tree_rules::check_unreachable_code(&program, sink);
        }
        if prefs.check_duplicate_functions {
            tree_rules::check_duplicate_functions(&program, sink);
        }
        true
    }
}

/// Convenience wrapper with default preferences
pub fn lint(source: &str) -> Vec<LintDiagnostic> {
    AhkLinter::new().lint(source)
}

fn syntax_diagnostic(error: &SyntaxError) -> LintDiagnostic {
    let (line, column) = error.location().unwrap_or((1, 1));
    LintDiagnostic::new(
        "ParseError",
        DiagnosticSeverity::Error,
        error.to_string(),
        DiagnosticRange::at(line, column),
    )
}

fn lexer_diagnostic(error: &LexerError) -> LintDiagnostic {
    let (line, column) = error.location().unwrap_or((1, 1));
    LintDiagnostic::new(
        "LexicalError",
        DiagnosticSeverity::Error,
        error.to_string(),
        DiagnosticRange::at(line, column),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes_of(diagnostics: &[LintDiagnostic]) -> Vec<&str> {
        diagnostics.iter().map(|d| d.code.as_str()).collect()
    }

    fn quiet() -> LintPreferences {
        LintPreferences {
            check_trailing_whitespace: false,
            check_short_names: false,
            check_unreachable_code: true,
            check_duplicate_functions: true,
            check_assignment_operator: true,
            check_line_length: false,
        }
    }

    #[test]
    fn test_clean_script() {
        let source = "#Requires AutoHotkey v2.0\n\nGreet(name) {\n    MsgBox \"Hello \" name\n}\n\nF1::Greet(\"you\")\n";
        assert!(AhkLinter::with_preferences(quiet()).lint(source).is_empty());
    }

    #[test]
    fn test_parse_error_becomes_diagnostic() {
        let (diagnostics, metrics) = AhkLinter::new().lint_with_metrics("MsgBox, \"hi\"");
        assert!(!metrics.parsed);
        assert_eq!(codes_of(&diagnostics), vec!["ParseError"]);
        assert!(diagnostics[0].message.contains("commas only separate parameters"));
        assert_eq!(diagnostics[0].range.start, (1, 7));
    }

    #[test]
    fn test_unclosed_block_reports_both() {
        let diagnostics = AhkLinter::with_preferences(quiet()).lint("if x {\n    y := 1\n");
        let codes = codes_of(&diagnostics);
        assert!(codes.contains(&"UnclosedBracket"));
        assert!(codes.contains(&"ParseError"));
        assert!(diagnostics.iter().all(LintDiagnostic::is_error));
    }

    #[test]
    fn test_lexer_error_is_reported() {
        let diagnostics = lint("s := \"never closed");
        assert_eq!(codes_of(&diagnostics), vec!["LexicalError"]);
        assert_eq!(diagnostics[0].range.start, (1, 6));
    }

    #[test]
    fn test_preferences_disable_rules() {
        let mut preferences = quiet();
        preferences.check_assignment_operator = false;
        assert!(AhkLinter::with_preferences(preferences).lint("total = 1").is_empty());
        assert_eq!(
            codes_of(&AhkLinter::with_preferences(quiet()).lint("total = 1")),
            vec!["UseAssignmentOperator"]
        );
    }
}
