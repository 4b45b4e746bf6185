//! Process-wide logging
//!
//! One [`LoggingService`] and one [`ErrorCollector`] per process, installed by
//! [`init_global_logging`]. Until then every macro is a no-op, so the library
//! can be embedded (an editor extension, a test) without any setup.
//!
//! Errors and warnings raised while a script is being processed are also
//! stored against that script so the CLI can print a cargo-style report at
//! the end of a run.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::OnceLock;

pub use codes::Code;
pub use collector::{ErrorCollector, FileProcessingContext, ProcessingSummary};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, MultiLogger, StructuredLogger};

static GLOBAL_LOGGER: OnceLock<LoggingService> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<ErrorCollector> = OnceLock::new();

thread_local! {
    static CURRENT_SCRIPT: RefCell<Option<FileProcessingContext>> = const { RefCell::new(None) };
}

/// Install the service described by the runtime preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Invalid logging limits: {}", e))?;
    init_global_logging_with_service(LoggingService::with_config())?;

    log_with_context(
        LogEvent::success(
            codes::success::SYSTEM_INITIALIZATION_COMPLETED,
            "Logging ready",
        ),
        Vec::new(),
    );
    Ok(())
}

/// Install a caller-built service, e.g. one backed by a [`MemoryLogger`]
pub fn init_global_logging_with_service(service: LoggingService) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Logging already initialized".to_string())?;
    // The collector is only ever set together with the logger.
    let _ = GLOBAL_ERROR_COLLECTOR.set(ErrorCollector::new());
    Ok(())
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get()
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR.get()
}

pub fn set_file_context(file_path: PathBuf, file_id: usize) {
    CURRENT_SCRIPT.with(|current| {
        *current.borrow_mut() = Some(FileProcessingContext { file_path, file_id });
    });
}

pub fn clear_file_context() {
    CURRENT_SCRIPT.with(|current| *current.borrow_mut() = None);
}

/// Run `f` with events attributed to `file_path`
pub fn with_file_context<F, R>(file_path: PathBuf, file_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_file_context(file_path, file_id);
    let result = f();
    clear_file_context();
    result
}

pub fn get_current_file_context() -> Option<FileProcessingContext> {
    CURRENT_SCRIPT.with(|current| current.borrow().clone())
}

fn truncate_message(message: &str) -> String {
    let limit = config::get_max_log_message_length();
    if message.len() <= limit {
        return message.to_string();
    }
    let mut end = limit;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &message[..end])
}

/// Backend of the logging macros
pub fn log_with_context(mut event: LogEvent, context: Vec<(&str, &str)>) {
    event.message = truncate_message(&event.message);
    for (key, value) in context {
        event = event.with_context(key, value);
    }

    let script = get_current_file_context();
    if let (Some(script), true) = (&script, config::include_file_context()) {
        event = event
            .with_context("file", &script.file_path.display().to_string())
            .with_context("file_id", &script.file_id.to_string());
    }

    if event.is_error() || event.is_warning() {
        if let (Some(script), Some(collector)) = (&script, try_get_global_error_collector()) {
            collector.record_event(&script.file_path, event.clone());
        }
    }

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Used by `log_error!`
pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    let event = LogEvent::error(code, message);
    let event = match span {
        Some(span) => event.with_span(span),
        None => event,
    };
    log_with_context(event, context);
}

/// Used by `log_success!`
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    log_with_context(LogEvent::success(code, message), context);
}

/// Print the per-script error report collected so far
pub fn print_cargo_style_summary() {
    if let Some(collector) = try_get_global_error_collector() {
        print!("{}", collector::format_cargo_style_errors(collector));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_context_management() {
        let file_path = PathBuf::from("hotkeys.ahk");

        assert!(get_current_file_context().is_none());

        set_file_context(file_path.clone(), 1);
        assert_eq!(get_current_file_context().unwrap().file_path, file_path);

        clear_file_context();
        assert!(get_current_file_context().is_none());
    }

    #[test]
    fn test_with_file_context() {
        let file_path = PathBuf::from("remap.ahk");

        let result = with_file_context(file_path.clone(), 2, || {
            assert_eq!(get_current_file_context().unwrap().file_id, 2);
            42
        });

        assert_eq!(result, 42);
        assert!(get_current_file_context().is_none());
    }

    #[test]
    fn test_truncate_message_respects_char_boundaries() {
        let limit = config::get_max_log_message_length();
        let long = "é".repeat(limit);
        let truncated = truncate_message(&long);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= limit + 3);
        assert_eq!(truncate_message("short"), "short");
    }

    #[test]
    fn test_logging_without_init_is_silent() {
        log_error_with_context(codes::system::INTERNAL_ERROR, "dropped", None, Vec::new());
    }
}
