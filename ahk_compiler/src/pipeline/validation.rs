use crate::logging::codes;

/// Check that every stage's codes are registered before processing starts
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating pipeline configuration");

    crate::file_processor::init_file_processor_logging()?;
    crate::lexical::init_lexical_analysis_logging()?;
    crate::syntax::init_syntax_logging()?;

    for code in [codes::lint::LINT_ERRORS_FOUND, codes::lint::DIAGNOSTIC_LIMIT_REACHED] {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("Lint code {} not found in metadata registry", code));
        }
    }

    crate::log_success!(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Pipeline validation succeeded",
        "stages_validated" => 4
    );

    Ok(())
}
