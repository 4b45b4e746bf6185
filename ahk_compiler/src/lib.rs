//! AutoHotkey v2 front end: lexer, parser, linter and semantic tokens

pub mod ast;
pub mod compiler;
pub mod config;
pub mod file_processor;
pub mod lexical;
pub mod lint;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod semantic;
pub mod syntax;
pub mod tokens;
pub mod utils;

pub use compiler::{AhkCompiler, AnalysisResult, CompilerError, CompilerResult, SourceStatistics};
pub use lint::{AhkLinter, LintDiagnostic};
pub use pipeline::{PipelineError, PipelineResult};
pub use semantic::{SemanticToken, SemanticTokenProvider};
pub use syntax::{parse, ParseFailure};
