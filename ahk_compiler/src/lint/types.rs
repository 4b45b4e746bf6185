//! Diagnostic types produced by the linter

use crate::config::constants::compile_time::lint::MAX_DIAGNOSTICS;
use crate::tokens::Token;
use crate::utils::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
}

impl DiagnosticSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(line, column)` pairs, both 1-based; `end` is exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRange {
    pub start: (u32, u32),
    pub end: (u32, u32),
}

impl DiagnosticRange {
    pub fn new(start: (u32, u32), end: (u32, u32)) -> Self {
        Self { start, end }
    }

    /// Single-character range
    pub fn at(line: u32, column: u32) -> Self {
        Self::new((line, column), (line, column + 1))
    }

    pub fn of_token(token: &Token) -> Self {
        let width = token.text.chars().count().max(1) as u32;
        Self::new((token.line, token.column), (token.line, token.column + width))
    }

    pub fn of_span(span: Span) -> Self {
        Self::new(
            (span.start.line, span.start.column),
            (span.end.line, span.end.column),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintDiagnostic {
    /// Rule name, e.g. `UnclosedBracket`
    pub code: String,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub range: DiagnosticRange,
}

impl LintDiagnostic {
    pub fn new(
        code: &str,
        severity: DiagnosticSeverity,
        message: impl Into<String>,
        range: DiagnosticRange,
    ) -> Self {
        Self {
            code: code.to_string(),
            severity,
            message: message.into(),
            range,
        }
    }

    pub fn line(&self) -> u32 {
        self.range.start.0
    }

    pub fn column(&self) -> u32 {
        self.range.start.1
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl fmt::Display for LintDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] at {}:{}: {}",
            self.severity,
            self.code,
            self.line(),
            self.column(),
            self.message
        )
    }
}

/// Collects diagnostics up to `MAX_DIAGNOSTICS`
#[derive(Debug)]
pub struct DiagnosticSink {
    diagnostics: Vec<LintDiagnostic>,
    limit: usize,
    dropped: usize,
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::with_limit(MAX_DIAGNOSTICS)
    }
}

impl DiagnosticSink {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            diagnostics: Vec::new(),
            limit,
            dropped: 0,
        }
    }

    pub fn push(&mut self, diagnostic: LintDiagnostic) {
        if self.diagnostics.len() < self.limit {
            self.diagnostics.push(diagnostic);
        } else {
            self.dropped += 1;
        }
    }

    pub fn error(&mut self, code: &str, message: impl Into<String>, range: DiagnosticRange) {
        self.push(LintDiagnostic::new(code, DiagnosticSeverity::Error, message, range));
    }

    pub fn warning(&mut self, code: &str, message: impl Into<String>, range: DiagnosticRange) {
        self.push(LintDiagnostic::new(code, DiagnosticSeverity::Warning, message, range));
    }

    pub fn info(&mut self, code: &str, message: impl Into<String>, range: DiagnosticRange) {
        self.push(LintDiagnostic::new(code, DiagnosticSeverity::Info, message, range));
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Diagnostics in source order
    pub fn into_sorted(mut self) -> Vec<LintDiagnostic> {
        self.diagnostics.sort_by_key(|d| d.range.start);
        self.diagnostics
    }
}

/// Per-run counters, logged when linting finishes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintMetrics {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub dropped: usize,
    pub parsed: bool,
    pub duration_ms: f64,
}

impl LintMetrics {
    pub fn tally(diagnostics: &[LintDiagnostic]) -> Self {
        let mut metrics = Self::default();
        for diagnostic in diagnostics {
            match diagnostic.severity {
                DiagnosticSeverity::Error => metrics.errors += 1,
                DiagnosticSeverity::Warning => metrics.warnings += 1,
                DiagnosticSeverity::Info => metrics.infos += 1,
            }
        }
        metrics
    }
}
