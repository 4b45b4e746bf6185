//! Script loading with compile-time size limits

use crate::config::constants::compile_time::file_processing::{
    ALLOWED_EXTENSIONS, LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_LINE_COUNT_FOR_ANALYSIS,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::path::{Path, PathBuf};

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug, Clone, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file extension: expected .ahk, .ah2 or .ahk2, found {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File is empty")]
    EmptyFile,

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("Invalid file path: {path}")]
    InvalidPath { path: String },

    #[error("File exceeds maximum line count: {lines} (max: {max_lines})")]
    TooManyLines { lines: usize, max_lines: usize },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            Self::InvalidExtension { .. } => codes::file_processing::INVALID_EXTENSION,
            Self::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            Self::EmptyFile => codes::file_processing::EMPTY_FILE,
            Self::PermissionDenied { .. } => codes::file_processing::PERMISSION_DENIED,
            Self::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            Self::IoError { .. } => codes::file_processing::IO_ERROR,
            Self::InvalidPath { .. } => codes::file_processing::INVALID_PATH,
            Self::TooManyLines { .. } => codes::file_processing::TOO_MANY_LINES,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

/// Case-insensitive check against the allowed script extensions
pub fn is_ahk_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ALLOWED_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Canonical file path
    pub path: PathBuf,
    /// Size on disk in bytes, byte order mark included
    pub size: u64,
    /// Lowercased extension
    pub extension: Option<String>,
    pub line_count: usize,
    pub is_ahk_file: bool,
    /// The file started with a UTF-8 byte order mark
    pub had_byte_order_mark: bool,
    pub modified: Option<std::time::SystemTime>,
}

impl FileMetadata {
    pub fn human_readable_size(&self) -> String {
        human_readable_bytes(self.size)
    }

    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }

    /// Size in KiB plus a tenth of the line count
    pub fn complexity_score(&self) -> f64 {
        self.size as f64 / 1024.0 + self.line_count as f64 * 0.1
    }
}

fn human_readable_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    /// Script text, without a byte order mark when stripping is enabled
    pub source: String,
    pub metadata: FileMetadata,
    pub processing_duration: std::time::Duration,
}

impl FileProcessingResult {
    pub fn char_count(&self) -> usize {
        self.source.chars().count()
    }

    /// Only whitespace
    pub fn is_effectively_empty(&self) -> bool {
        self.source.trim().is_empty()
    }

    /// Characters per millisecond
    pub fn processing_rate(&self) -> f64 {
        let duration_ms = self.processing_duration.as_secs_f64() * 1000.0;
        if duration_ms > 0.0 {
            self.char_count() as f64 / duration_ms
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileProcessor {
    pub require_ahk_extension: bool,
    pub enable_performance_logging: bool,
    pub strip_byte_order_mark: bool,
    pub include_complexity_metrics: bool,
}

impl FileProcessor {
    /// Accepts any extension and strips a byte order mark
    pub fn new() -> Self {
        Self {
            require_ahk_extension: false,
            enable_performance_logging: true,
            strip_byte_order_mark: true,
            include_complexity_metrics: false,
        }
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            require_ahk_extension: prefs.require_ahk_extension,
            enable_performance_logging: prefs.enable_performance_logging,
            strip_byte_order_mark: prefs.strip_byte_order_mark,
            include_complexity_metrics: prefs.include_complexity_metrics,
        }
    }

    pub fn with_ahk_extension_required(mut self, required: bool) -> Self {
        self.require_ahk_extension = required;
        self
    }

    pub fn with_performance_logging(mut self, enabled: bool) -> Self {
        self.enable_performance_logging = enabled;
        self
    }

    pub fn with_byte_order_mark_stripping(mut self, enabled: bool) -> Self {
        self.strip_byte_order_mark = enabled;
        self
    }

    pub fn with_complexity_metrics(mut self, enabled: bool) -> Self {
        self.include_complexity_metrics = enabled;
        self
    }

    pub fn max_file_size() -> u64 {
        MAX_FILE_SIZE
    }

    pub fn large_file_threshold() -> u64 {
        LARGE_FILE_THRESHOLD
    }

    /// Read a script and collect its metadata
    pub fn process_file(&self, file_path: &str) -> Result<FileProcessingResult, FileProcessorError> {
        let start_time = std::time::Instant::now();
        log_debug!("Starting file processing", "file" => file_path);

        let path = self.validate_path(file_path)?;
        let mut metadata = self.get_metadata(&path)?;
        self.validate_file(&metadata, file_path)?;

        let mut source = self.read_file(&path, file_path)?;
        if source.starts_with(BYTE_ORDER_MARK) {
            metadata.had_byte_order_mark = true;
            if self.strip_byte_order_mark {
                source.replace_range(..BYTE_ORDER_MARK.len_utf8(), "");
            }
        }

        let line_count = source.lines().count();
        if line_count > MAX_LINE_COUNT_FOR_ANALYSIS {
            let error = FileProcessorError::TooManyLines {
                lines: line_count,
                max_lines: MAX_LINE_COUNT_FOR_ANALYSIS,
            };
            log_error!(error.error_code(), "File exceeds maximum line count for safe analysis",
                "file" => file_path,
                "lines" => line_count,
                "max_lines" => MAX_LINE_COUNT_FOR_ANALYSIS
            );
            return Err(error);
        }
        metadata.line_count = line_count;

        let result = FileProcessingResult {
            source,
            metadata,
            processing_duration: start_time.elapsed(),
        };
        self.log_processing_success(&result, file_path);

        Ok(result)
    }

    fn log_processing_success(&self, result: &FileProcessingResult, file_path: &str) {
        let duration = format!("{:.2}", result.processing_duration.as_secs_f64() * 1000.0);

        if !self.enable_performance_logging {
            log_success!(codes::success::FILE_PROCESSING_SUCCESS, "File processed successfully",
                "file" => file_path,
                "size_bytes" => result.metadata.size,
                "lines" => result.metadata.line_count,
                "duration_ms" => duration
            );
            return;
        }

        let complexity = if self.include_complexity_metrics {
            format!("{:.2}", result.metadata.complexity_score())
        } else {
            "n/a".to_string()
        };
        log_success!(codes::success::FILE_PROCESSING_SUCCESS, "File processed successfully with performance metrics",
            "file" => file_path,
            "size_human" => result.metadata.human_readable_size(),
            "lines" => result.metadata.line_count,
            "chars" => result.char_count(),
            "duration_ms" => duration,
            "chars_per_ms" => format!("{:.2}", result.processing_rate()),
            "is_large_file" => result.metadata.is_large_file(),
            "byte_order_mark" => result.metadata.had_byte_order_mark,
            "complexity_score" => complexity
        );
    }

    fn validate_path(&self, file_path: &str) -> Result<PathBuf, FileProcessorError> {
        if file_path.is_empty() {
            let error = FileProcessorError::InvalidPath {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "Empty file path provided");
            return Err(error);
        }

        let path = Path::new(file_path);
        if !path.exists() {
            let error = FileProcessorError::FileNotFound {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "File not found", "path" => file_path);
            return Err(error);
        }
        if !path.is_file() {
            let error = FileProcessorError::InvalidPath {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "Path is not a file", "path" => file_path);
            return Err(error);
        }

        path.canonicalize().map_err(|e| {
            let error = FileProcessorError::IoError {
                message: format!("Failed to resolve path '{}': {}", file_path, e),
            };
            log_error!(error.error_code(), "Failed to canonicalize path",
                "path" => file_path,
                "io_error" => e
            );
            error
        })
    }

    fn get_metadata(&self, path: &Path) -> Result<FileMetadata, FileProcessorError> {
        let metadata = fs::metadata(path).map_err(|e| self.io_failure(path, e, "Failed to read file metadata"))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        let file_metadata = FileMetadata {
            path: path.to_path_buf(),
            size: metadata.len(),
            extension,
            line_count: 0,
            is_ahk_file: is_ahk_file(path),
            had_byte_order_mark: false,
            modified: metadata.modified().ok(),
        };

        log_debug!("File metadata collected",
            "size_human" => file_metadata.human_readable_size(),
            "extension" => file_metadata.extension.as_deref().unwrap_or("none"),
            "is_ahk" => file_metadata.is_ahk_file
        );
        Ok(file_metadata)
    }

    fn validate_file(&self, metadata: &FileMetadata, file_path: &str) -> Result<(), FileProcessorError> {
        if metadata.size > MAX_FILE_SIZE {
            let error = FileProcessorError::FileTooLarge {
                size: metadata.size,
                max_size: MAX_FILE_SIZE,
            };
            log_error!(error.error_code(), "File exceeds compile-time maximum size limit",
                "file" => file_path,
                "size_human" => metadata.human_readable_size(),
                "limit_human" => human_readable_bytes(MAX_FILE_SIZE)
            );
            return Err(error);
        }

        if metadata.size == 0 {
            let error = FileProcessorError::EmptyFile;
            log_error!(error.error_code(), "File is empty", "file" => file_path);
            return Err(error);
        }

        if self.require_ahk_extension && !metadata.is_ahk_file {
            let error = FileProcessorError::InvalidExtension {
                extension: metadata.extension.clone(),
            };
            log_error!(error.error_code(), "File does not have an AutoHotkey extension",
                "file" => file_path,
                "extension" => metadata.extension.as_deref().unwrap_or("none")
            );
            return Err(error);
        }

        Ok(())
    }

    fn read_file(&self, path: &Path, file_path: &str) -> Result<String, FileProcessorError> {
        let bytes = fs::read(path).map_err(|e| self.io_failure(path, e, "Failed to read file"))?;

        String::from_utf8(bytes).map_err(|e| {
            let error = FileProcessorError::InvalidEncoding {
                path: path.display().to_string(),
            };
            log_error!(error.error_code(), "Invalid UTF-8 encoding in file",
                "file" => file_path,
                "valid_up_to" => e.utf8_error().valid_up_to()
            );
            error
        })
    }

    fn io_failure(&self, path: &Path, e: std::io::Error, message: &str) -> FileProcessorError {
        let error = match e.kind() {
            std::io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied {
                path: path.display().to_string(),
            },
            _ => FileProcessorError::IoError {
                message: format!("{} '{}': {}", message, path.display(), e),
            },
        };
        log_error!(error.error_code(), message,
            "path" => path.display(),
            "io_error" => e
        );
        error
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

pub fn process_file(file_path: &str) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(file_path)
}

pub fn process_file_with_preferences(
    file_path: &str,
    prefs: &FileProcessorPreferences,
) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::from_preferences(prefs).process_file(file_path)
}
