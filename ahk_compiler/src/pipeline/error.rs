use crate::file_processor::FileProcessorError;
use crate::lexical::LexerError;
use crate::syntax::SyntaxError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Lexical analysis failed: {0}")]
    LexicalAnalysis(#[from] LexerError),

    #[error("Syntax analysis failed: {0}")]
    SyntaxAnalysis(#[from] SyntaxError),
}

impl PipelineError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::FileProcessing(error) => error.error_code(),
            Self::LexicalAnalysis(error) => error.error_code(),
            Self::SyntaxAnalysis(error) => error.error_code(),
        }
    }

    /// Whether the failing stage leaves nothing for later stages to use
    pub fn requires_halt(&self) -> bool {
        crate::logging::codes::requires_halt(self.error_code().as_str())
    }

    /// Line and column for lexical and syntax failures
    pub fn location(&self) -> Option<(u32, u32)> {
        match self {
            Self::FileProcessing(_) => None,
            Self::LexicalAnalysis(error) => error.location(),
            Self::SyntaxAnalysis(error) => error.location(),
        }
    }

    /// Short stage name for summaries
    pub fn stage(&self) -> &'static str {
        match self {
            Self::FileProcessing(_) => "file processing",
            Self::LexicalAnalysis(_) => "lexical analysis",
            Self::SyntaxAnalysis(_) => "syntax analysis",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_errors_keep_their_codes() {
        let error = PipelineError::from(SyntaxError::FunctionCallComma { line: 2, column: 7 });
        assert_eq!(error.error_code(), crate::logging::codes::syntax::FUNCTION_CALL_COMMA);
        assert_eq!(error.location(), Some((2, 7)));
        assert_eq!(error.stage(), "syntax analysis");
        assert!(error.requires_halt());
    }
}
