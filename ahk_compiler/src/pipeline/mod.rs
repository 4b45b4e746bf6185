//! File to diagnostics in one call
//!
//! Stages: file processing, lexical analysis, syntax analysis, lint. The
//! first three stop the pipeline on failure; lint findings are data.

mod error;
mod result;
mod validation;

pub use error::PipelineError;
pub use result::PipelineResult;
pub use validation::validate_pipeline;

use crate::config::runtime::RuntimeConfig;
use crate::lexical::LexicalAnalyzer;
use crate::lint::AhkLinter;
use crate::logging;
use std::path::PathBuf;
use std::time::Instant;

/// Process a script with preferences from the environment
pub fn process_file(file_path: &str) -> Result<PipelineResult, PipelineError> {
    process_file_with_config(file_path, &RuntimeConfig::default())
}

pub fn process_file_with_config(
    file_path: &str,
    config: &RuntimeConfig,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();

    logging::with_file_context(PathBuf::from(file_path), 0, || {
        crate::log_info!("Starting script processing pipeline", "file" => file_path);

        let file_result = crate::file_processor::process_file_with_preferences(file_path, &config.file_processor)?;

        let mut analyzer = LexicalAnalyzer::with_preferences(config.lexer.clone());
        let token_stream = analyzer.tokenize_file_result(&file_result)?;
        let lexical_metrics = analyzer.metrics().clone();
        let token_count = token_stream.len();

        let program = crate::syntax::parse_token_stream_with_preferences(token_stream, config.parser.clone())?;

        let diagnostics = AhkLinter::with_preferences(config.lint.clone()).lint(&file_result.source);

        let result = PipelineResult {
            program,
            file_metadata: file_result.metadata,
            lexical_metrics,
            diagnostics,
            token_count,
            processing_duration: start_time.elapsed(),
        };
        result.log_success(file_path);

        Ok(result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::DiagnosticSeverity;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_validate_pipeline() {
        let _ = crate::logging::init_global_logging();
        assert!(validate_pipeline().is_ok());
    }

    #[test]
    fn test_process_script() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("tool.ahk");
        fs::write(&file_path, "#Requires AutoHotkey v2.0\nvalue = 1\nF1::MsgBox(value)\n").unwrap();

        let result = process_file(file_path.to_str().unwrap()).unwrap();
        assert_eq!(result.program.body.len(), 3);
        assert!(result.token_count > 0);
        assert_eq!(result.lexical_metrics.final_bracket_depth, 0);
        assert!(result.diagnostics.iter().any(|d| d.code == "UseAssignmentOperator"));
        assert_eq!(result.count(DiagnosticSeverity::Error), 0);
        assert!(!result.has_errors());
    }

    #[test]
    fn test_stage_failures() {
        let dir = tempdir().unwrap();
        let syntax = dir.path().join("bad.ahk");
        fs::write(&syntax, "MsgBox, \"hi\"\n").unwrap();
        let lexical = dir.path().join("open.ahk");
        fs::write(&lexical, "s := \"open\n").unwrap();

        let error = process_file(syntax.to_str().unwrap()).unwrap_err();
        assert_matches!(error, PipelineError::SyntaxAnalysis(_));
        assert_eq!(error.stage(), "syntax analysis");
        assert_matches!(
            process_file(lexical.to_str().unwrap()),
            Err(PipelineError::LexicalAnalysis(_))
        );
        assert_matches!(
            process_file("missing.ahk"),
            Err(PipelineError::FileProcessing(_))
        );
    }
}
