//! Script file loading
//!
//! Size and line limits are compile-time constants; extension checks and
//! byte order mark handling are runtime preferences.

mod processor;

use crate::config::constants::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_LINE_COUNT_FOR_ANALYSIS,
};
use crate::log_debug;
pub use processor::{
    is_ahk_file, process_file, process_file_with_preferences, FileMetadata, FileProcessingResult,
    FileProcessor, FileProcessorError,
};
pub use crate::config::constants::compile_time::file_processing::ALLOWED_EXTENSIONS;

/// Check that every file processing code is registered (for system startup)
pub fn init_file_processor_logging() -> Result<(), String> {
    let file_codes = [
        crate::logging::codes::file_processing::FILE_NOT_FOUND,
        crate::logging::codes::file_processing::INVALID_EXTENSION,
        crate::logging::codes::file_processing::FILE_TOO_LARGE,
        crate::logging::codes::file_processing::EMPTY_FILE,
        crate::logging::codes::file_processing::PERMISSION_DENIED,
        crate::logging::codes::file_processing::INVALID_ENCODING,
        crate::logging::codes::file_processing::IO_ERROR,
        crate::logging::codes::file_processing::INVALID_PATH,
        crate::logging::codes::file_processing::TOO_MANY_LINES,
    ];

    for code in &file_codes {
        if crate::logging::codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "File processor error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    log_debug!("File processor compile-time configuration loaded",
        "max_file_size" => MAX_FILE_SIZE,
        "large_file_threshold" => LARGE_FILE_THRESHOLD,
        "max_line_count" => MAX_LINE_COUNT_FOR_ANALYSIS
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_module_api() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("script.ahk2");
        fs::write(&file_path, "F1::MsgBox(\"pressed\")\n").unwrap();

        let result = process_file(file_path.to_str().unwrap()).unwrap();
        assert_eq!(result.metadata.extension.as_deref(), Some("ahk2"));
    }

    #[test]
    fn test_init_logging() {
        assert!(init_file_processor_logging().is_ok());
    }

    #[test]
    fn test_constants_are_accessible() {
        assert_eq!(FileProcessor::max_file_size(), MAX_FILE_SIZE);
        assert!(LARGE_FILE_THRESHOLD <= MAX_FILE_SIZE);
        assert!(MAX_LINE_COUNT_FOR_ANALYSIS > 0);
    }
}
