//! Error and success codes for the AHK compiler
//!
//! Single source of truth for every code the compiler emits, together with the
//! metadata that decides severity, recoverability and whether processing halts.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
    pub const TOO_MANY_LINES: Code = Code::new("E013");
}

pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const UNTERMINATED_BLOCK_COMMENT: Code = Code::new("E022");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const STRING_TOO_LARGE: Code = Code::new("E024");
    pub const SOURCE_TOO_LARGE: Code = Code::new("E025");
    pub const TOO_MANY_TOKENS: Code = Code::new("E026");
    /// Bracket or deref region still open at end of input
    pub const UNTERMINATED_REGION: Code = Code::new("E027");
}

pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E040");
    pub const UNEXPECTED_END_OF_INPUT: Code = Code::new("E041");
    pub const UNMATCHED_BLOCK_DELIMITER: Code = Code::new("E042");
    pub const FUNCTION_CALL_COMMA: Code = Code::new("E043");
    pub const INVALID_LABEL: Code = Code::new("E044");
    pub const MAX_RECURSION_DEPTH: Code = Code::new("E045");
    pub const PARSE_ERROR: Code = Code::new("E046");
    pub const INTERNAL_PARSER_ERROR: Code = Code::new("E047");
}

pub mod lint {
    use super::Code;

    pub const LINT_ERRORS_FOUND: Code = Code::new("W100");
    pub const DIAGNOSTIC_LIMIT_REACHED: Code = Code::new("W101");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const AST_CONSTRUCTION_COMPLETE: Code = Code::new("I040");
    pub const LINT_COMPLETE: Code = Code::new("I050");
    pub const SEMANTIC_TOKENS_COMPLETE: Code = Code::new("I060");
    pub const ANALYSIS_COMPLETE: Code = Code::new("I070");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

type Row = (
    &'static str,
    &'static str,
    Severity,
    bool,
    bool,
    &'static str,
    &'static str,
);

// (code, category, severity, recoverable, requires_halt, description, action)
const REGISTRY_ROWS: &[Row] = &[
    // System
    ("ERR001", "System", Severity::Critical, false, true,
        "Critical internal system error", "File a bug report with the failing script"),
    ("ERR002", "System", Severity::Critical, false, true,
        "System initialization failure", "Check configuration files and environment variables"),
    // File processing
    ("E005", "FileProcessing", Severity::Medium, false, true,
        "Script file not found", "Check the file path"),
    ("E006", "FileProcessing", Severity::Low, false, true,
        "File does not have an AutoHotkey extension", "Use .ahk, .ah2 or .ahk2, or disable AHK_REQUIRE_AHK_EXTENSION"),
    ("E007", "FileProcessing", Severity::High, false, true,
        "File exceeds the maximum size", "Split the script into smaller #Include files"),
    ("E008", "FileProcessing", Severity::Low, true, false,
        "File is empty", "Add script content"),
    ("E009", "FileProcessing", Severity::Medium, false, true,
        "Permission denied reading file", "Check file permissions"),
    ("E010", "FileProcessing", Severity::Medium, false, true,
        "File is not valid UTF-8", "Re-save the script as UTF-8"),
    ("E011", "FileProcessing", Severity::Medium, false, true,
        "I/O error reading file", "Retry or check the storage device"),
    ("E012", "FileProcessing", Severity::Medium, false, true,
        "Invalid file path", "Pass a path to a regular file"),
    ("E013", "FileProcessing", Severity::High, false, true,
        "File has too many lines for analysis", "Split the script into smaller #Include files"),
    // Lexical
    ("E020", "Lexical", Severity::Low, true, false,
        "Unexpected character", "Remove or escape the character"),
    ("E021", "Lexical", Severity::High, false, true,
        "Unterminated string literal", "Close the string with a matching quote"),
    ("E022", "Lexical", Severity::High, false, true,
        "Unterminated block comment", "Close the comment with */ at the start of a line"),
    ("E023", "Lexical", Severity::High, false, true,
        "Identifier exceeds the maximum length", "Use a shorter name"),
    ("E024", "Lexical", Severity::High, false, true,
        "String literal exceeds the maximum size", "Load large text from a file at run time"),
    ("E025", "Lexical", Severity::Critical, false, true,
        "Source exceeds the maximum length", "Split the script into smaller files"),
    ("E026", "Lexical", Severity::Critical, false, true,
        "Token limit exceeded", "Split the script into smaller files"),
    ("E027", "Lexical", Severity::Medium, true, false,
        "Bracket or deref region left open at end of input", "Close every ( [ and % that was opened"),
    // Syntax
    ("E040", "Syntax", Severity::High, false, true,
        "Unexpected token", "Check the statement near the reported position"),
    ("E041", "Syntax", Severity::High, false, true,
        "Unexpected end of input", "Complete the unfinished statement or block"),
    ("E042", "Syntax", Severity::High, false, true,
        "Unmatched block delimiter", "Balance the braces"),
    ("E043", "Syntax", Severity::High, false, true,
        "Comma after function name", "Call functions with a space or parentheses"),
    ("E044", "Syntax", Severity::Medium, false, true,
        "Label is not valid in this context", "Move the label out of the case clause"),
    ("E045", "Syntax", Severity::Critical, false, true,
        "Maximum parser nesting depth exceeded", "Reduce nesting depth"),
    ("E046", "Syntax", Severity::High, false, true,
        "Parse error", "Check the statement near the reported position"),
    ("E047", "Syntax", Severity::Critical, false, true,
        "Internal parser error", "File a bug report with the failing script"),
    // Lint
    ("W100", "Lint", Severity::Medium, true, false,
        "Lint reported error-severity diagnostics", "Review the diagnostics list"),
    ("W101", "Lint", Severity::Low, true, false,
        "Diagnostic limit reached, further diagnostics dropped", "Fix the reported issues and re-run"),
    // Success
    ("I001", "Success", Severity::Low, true, false,
        "Operation completed successfully", "No action required"),
    ("I004", "Success", Severity::Low, true, false,
        "System initialization completed", "No action required"),
    ("I006", "Success", Severity::Low, true, false,
        "File processing completed", "No action required"),
    ("I020", "Success", Severity::Low, true, false,
        "Tokenization completed", "No action required"),
    ("I040", "Success", Severity::Low, true, false,
        "AST construction completed", "No action required"),
    ("I050", "Success", Severity::Low, true, false,
        "Lint completed", "No action required"),
    ("I060", "Success", Severity::Low, true, false,
        "Semantic tokens computed", "No action required"),
    ("I070", "Success", Severity::Low, true, false,
        "Analysis completed", "No action required"),
];

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTRY_ROWS
            .iter()
            .map(|&(code, category, severity, recoverable, halt, description, action)| {
                (
                    code,
                    ErrorMetadata::new(
                        code,
                        category,
                        severity,
                        recoverable,
                        halt,
                        description,
                        action,
                    ),
                )
            })
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_code_constant_has_metadata() {
        let codes = [
            system::INTERNAL_ERROR,
            file_processing::TOO_MANY_LINES,
            lexical::UNTERMINATED_REGION,
            syntax::FUNCTION_CALL_COMMA,
            syntax::INTERNAL_PARSER_ERROR,
            lint::DIAGNOSTIC_LIMIT_REACHED,
            success::ANALYSIS_COMPLETE,
        ];
        for code in codes {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_classification() {
        assert!(requires_halt("E043"));
        assert!(!is_recoverable("E043"));
        assert!(is_recoverable("E027"));
        assert_eq!(get_category("E021"), "Lexical");
        assert_eq!(get_severity("E025"), Severity::Critical);
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("E999"), "Unknown error");
        assert_eq!(get_category("E999"), "Unknown");
        assert!(!requires_halt("E999"));
    }

    #[test]
    fn test_registry_rows_are_unique() {
        assert_eq!(get_error_registry().len(), REGISTRY_ROWS.len());
    }
}
