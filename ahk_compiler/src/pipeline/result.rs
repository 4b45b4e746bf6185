use crate::ast::Program;
use crate::file_processor::FileMetadata;
use crate::lexical::LexicalMetrics;
use crate::lint::{DiagnosticSeverity, LintDiagnostic};
use std::time::Duration;

/// Everything produced for one script file
#[derive(Debug)]
pub struct PipelineResult {
    pub program: Program,
    pub file_metadata: FileMetadata,
    pub lexical_metrics: LexicalMetrics,
    pub diagnostics: Vec<LintDiagnostic>,
    pub token_count: usize,
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn count(&self, severity: DiagnosticSeverity) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(LintDiagnostic::is_error)
    }

    pub fn log_success(&self, file_path: &str) {
        crate::log_success!(
            crate::logging::codes::success::AST_CONSTRUCTION_COMPLETE,
            "Script processing pipeline succeeded",
            "file" => file_path,
            "statements" => self.program.body.len(),
            "diagnostics" => self.diagnostics.len()
        );

        if crate::logging::config::log_performance_events() {
            let seconds = self.processing_duration.as_secs_f64().max(f64::EPSILON);
            crate::log_debug!("Pipeline timing",
                "file" => file_path,
                "duration_ms" => format!("{:.2}", seconds * 1000.0),
                "tokens_per_sec" => format!("{:.0}", self.token_count as f64 / seconds)
            );
        }
    }
}
