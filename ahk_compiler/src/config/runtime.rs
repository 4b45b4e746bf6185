// RUNTIME PREFERENCES (User Experience)
//
// Defaults come from AHK_* environment variables. A TOML file with the same
// section names can override them; missing sections keep the environment
// defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessorPreferences {
    /// Reject files without an .ahk/.ah2/.ahk2 extension
    pub require_ahk_extension: bool,

    /// Whether to enable detailed performance logging
    pub enable_performance_logging: bool,

    /// Strip a leading UTF-8 byte order mark before lexing
    pub strip_byte_order_mark: bool,

    /// Whether to include complexity scores in output
    pub include_complexity_metrics: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_ahk_extension: env_bool(env_vars::REQUIRE_AHK_EXTENSION, true),
            enable_performance_logging: env_bool(env_vars::ENABLE_PERFORMANCE_LOGGING, true),
            strip_byte_order_mark: env_bool(env_vars::STRIP_BYTE_ORDER_MARK, true),
            include_complexity_metrics: env_bool(env_vars::INCLUDE_COMPLEXITY_METRICS, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexerPreferences {
    /// Whether to collect per-category token metrics
    pub collect_detailed_metrics: bool,

    /// Count hidden-channel tokens (comments, continuation whitespace) in totals
    pub include_hidden_tokens_in_counts: bool,

    /// Whether to show position information in error messages
    pub include_position_in_errors: bool,
}

impl Default for LexerPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: env_bool(env_vars::LEXER_DETAILED_METRICS, true),
            include_hidden_tokens_in_counts: env_bool(env_vars::LEXER_INCLUDE_HIDDEN, false),
            include_position_in_errors: env_bool(env_vars::LEXER_INCLUDE_POSITIONS, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserPreferences {
    /// Append the rule context ("in class body", ...) to syntax error messages
    pub include_rule_context_in_errors: bool,

    /// Log each top-level statement kind at debug level
    pub trace_statements: bool,
}

impl Default for ParserPreferences {
    fn default() -> Self {
        Self {
            include_rule_context_in_errors: env_bool(env_vars::PARSER_INCLUDE_CONTEXT, true),
            trace_statements: env_bool(env_vars::PARSER_TRACE_STATEMENTS, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LintPreferences {
    pub check_trailing_whitespace: bool,
    pub check_short_names: bool,
    pub check_unreachable_code: bool,
    pub check_duplicate_functions: bool,
    pub check_assignment_operator: bool,
    /// Flag lines longer than `MAX_LINE_LENGTH` characters
    pub check_line_length: bool,
}

impl Default for LintPreferences {
    fn default() -> Self {
        Self {
            check_trailing_whitespace: env_bool(env_vars::LINT_TRAILING_WHITESPACE, true),
            check_short_names: env_bool(env_vars::LINT_SHORT_NAMES, true),
            check_unreachable_code: env_bool(env_vars::LINT_UNREACHABLE_CODE, true),
            check_duplicate_functions: env_bool(env_vars::LINT_DUPLICATE_FUNCTIONS, true),
            check_assignment_operator: env_bool(env_vars::LINT_ASSIGNMENT_OPERATOR, true),
            check_line_length: env_bool(env_vars::LINT_LINE_LENGTH, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Preferred minimum log level
    pub min_log_level: LogLevel,

    /// Whether to include performance metrics in logs
    pub log_performance_events: bool,

    /// Whether to enable cargo-style error reporting
    pub enable_cargo_style_output: bool,

    /// Whether to include file context in log messages
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_bool(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_bool(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            log_performance_events: env_bool(env_vars::LOGGING_LOG_PERFORMANCE, true),
            enable_cargo_style_output: env_bool(env_vars::LOGGING_CARGO_STYLE, true),
            include_file_context: env_bool(env_vars::LOGGING_INCLUDE_FILE_CONTEXT, true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub lexer: LexerPreferences,
    pub parser: ParserPreferences,
    pub lint: LintPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse preferences from TOML text. Sections and keys that are absent keep
    /// their environment defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load preferences from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const REQUIRE_AHK_EXTENSION: &str = "AHK_REQUIRE_AHK_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "AHK_ENABLE_PERFORMANCE_LOGGING";
    pub const STRIP_BYTE_ORDER_MARK: &str = "AHK_STRIP_BYTE_ORDER_MARK";
    pub const INCLUDE_COMPLEXITY_METRICS: &str = "AHK_INCLUDE_COMPLEXITY_METRICS";

    // Lexer
    pub const LEXER_DETAILED_METRICS: &str = "AHK_LEXER_DETAILED_METRICS";
    pub const LEXER_INCLUDE_HIDDEN: &str = "AHK_LEXER_INCLUDE_HIDDEN";
    pub const LEXER_INCLUDE_POSITIONS: &str = "AHK_LEXER_INCLUDE_POSITIONS";

    // Parser
    pub const PARSER_INCLUDE_CONTEXT: &str = "AHK_PARSER_INCLUDE_CONTEXT";
    pub const PARSER_TRACE_STATEMENTS: &str = "AHK_PARSER_TRACE_STATEMENTS";

    // Lint
    pub const LINT_TRAILING_WHITESPACE: &str = "AHK_LINT_TRAILING_WHITESPACE";
    pub const LINT_SHORT_NAMES: &str = "AHK_LINT_SHORT_NAMES";
    pub const LINT_UNREACHABLE_CODE: &str = "AHK_LINT_UNREACHABLE_CODE";
    pub const LINT_DUPLICATE_FUNCTIONS: &str = "AHK_LINT_DUPLICATE_FUNCTIONS";
    pub const LINT_ASSIGNMENT_OPERATOR: &str = "AHK_LINT_ASSIGNMENT_OPERATOR";
    pub const LINT_LINE_LENGTH: &str = "AHK_LINT_LINE_LENGTH";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "AHK_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "AHK_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "AHK_LOGGING_MIN_LEVEL";
    pub const LOGGING_LOG_PERFORMANCE: &str = "AHK_LOGGING_LOG_PERFORMANCE";
    pub const LOGGING_CARGO_STYLE: &str = "AHK_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "AHK_LOGGING_INCLUDE_FILE_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("1"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_toml_overrides_single_key() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [lint]
            check_short_names = false

            [logging]
            min_log_level = "debug"
            "#,
        )
        .unwrap();

        assert!(!config.lint.check_short_names);
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
    }

    #[test]
    fn test_toml_rejects_wrong_types() {
        let result = RuntimeConfig::from_toml_str("[lint]\ncheck_short_names = \"no\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[parser]\ntrace_statements = true").unwrap();

        let config = RuntimeConfig::load(file.path()).unwrap();
        assert!(config.parser.trace_statements);
    }

    #[test]
    fn test_load_missing_file() {
        let result = RuntimeConfig::load(Path::new("/nonexistent/ahk.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
