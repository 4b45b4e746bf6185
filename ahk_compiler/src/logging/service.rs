//! Logging service and logger backends

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Level-filtering front end over a single logger backend
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Create service from the runtime logging preferences
    pub fn with_config() -> Self {
        let min_level = config::get_min_log_level();
        let mut multi = MultiLogger::new(min_level);

        if config::use_console_logging() {
            multi = if config::use_structured_logging() {
                multi.with_structured_console(min_level)
            } else {
                multi.with_console(min_level)
            };
        }

        Self::new(Arc::new(multi), min_level)
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }

    pub fn log_error(&self, error_code: Code, message: &str) {
        self.log_event(LogEvent::error(error_code, message));
    }

    pub fn log_success(&self, success_code: Code, message: &str) {
        self.log_event(LogEvent::success(success_code, message));
    }

    pub fn log_warning(&self, message: &str) {
        self.log_event(LogEvent::warning(message));
    }

    pub fn log_info(&self, message: &str) {
        self.log_event(LogEvent::info(message));
    }

    pub fn log_debug(&self, message: &str) {
        self.log_event(LogEvent::debug(message));
    }
}

fn emit_line(level: LogLevel, line: &str) {
    if level == LogLevel::Error {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}

/// Human-readable lines; errors on stderr
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            emit_line(event.level, &event.format());
        }
    }
}

/// JSON lines, falling back to plain text if an event cannot be encoded
pub struct StructuredLogger {
    min_level: LogLevel,
}

impl StructuredLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            let line = event.format_json().unwrap_or_else(|_| event.format());
            emit_line(event.level, &line);
        }
    }
}

/// Keeps the most recent events in memory, up to the log buffer size
#[derive(Default)]
pub struct MemoryLogger {
    events: Mutex<VecDeque<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn events(&self) -> MutexGuard<'_, VecDeque<LogEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.events().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.events().clear();
    }

    pub fn event_count(&self) -> usize {
        self.events().len()
    }

    pub fn get_errors(&self) -> Vec<LogEvent> {
        self.events().iter().filter(|e| e.is_error()).cloned().collect()
    }

    pub fn has_error_with_code(&self, code: Code) -> bool {
        self.events().iter().any(|e| e.is_error() && e.code == code)
    }

    pub fn has_success_with_code(&self, code: Code) -> bool {
        self.events().iter().any(|e| e.is_info() && e.code == code)
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let capacity = config::get_error_buffer_size();
        let mut events = self.events();
        while events.len() >= capacity {
            events.pop_front();
        }
        events.push_back(event.clone());
    }
}

/// Fan-out logger
pub struct MultiLogger {
    loggers: Vec<Arc<dyn Logger>>,
    min_level: LogLevel,
}

impl MultiLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self {
            loggers: Vec::new(),
            min_level,
        }
    }

    pub fn add_logger(&mut self, logger: Arc<dyn Logger>) {
        self.loggers.push(logger);
    }

    pub fn with_console(mut self, console_level: LogLevel) -> Self {
        self.add_logger(Arc::new(ConsoleLogger::new(console_level)));
        self
    }

    pub fn with_structured_console(mut self, console_level: LogLevel) -> Self {
        self.add_logger(Arc::new(StructuredLogger::new(console_level)));
        self
    }

    pub fn with_memory(mut self) -> (Self, Arc<MemoryLogger>) {
        let memory_logger = Arc::new(MemoryLogger::new());
        self.add_logger(memory_logger.clone());
        (self, memory_logger)
    }
}

impl Logger for MultiLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            for logger in &self.loggers {
                logger.log(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_memory_logger() {
        let logger = MemoryLogger::new();

        logger.log(&LogEvent::info("Message 1"));
        logger.log(&LogEvent::error(
            codes::lexical::UNTERMINATED_STRING,
            "Error message",
        ));

        assert_eq!(logger.event_count(), 2);
        assert_eq!(logger.get_events()[0].message, "Message 1");
        assert_eq!(logger.get_errors().len(), 1);
        assert!(logger.has_error_with_code(codes::lexical::UNTERMINATED_STRING));
        assert_eq!(logger.get_errors()[0].category(), "Lexical");

        logger.clear();
        assert_eq!(logger.event_count(), 0);
    }

    #[test]
    fn test_multi_logger_fans_out() {
        let (multi, first) = MultiLogger::new(LogLevel::Debug).with_memory();
        let (multi, second) = multi.with_memory();

        multi.log(&LogEvent::debug("both"));

        assert_eq!(first.event_count(), 1);
        assert_eq!(second.event_count(), 1);
    }

    #[test]
    fn test_logging_service() {
        let logger = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(logger.clone(), LogLevel::Debug);

        service.log_error(codes::syntax::UNEXPECTED_TOKEN, "Test error");
        service.log_success(codes::success::AST_CONSTRUCTION_COMPLETE, "Parsed");
        service.log_info("Test info");

        assert_eq!(logger.event_count(), 3);
        assert!(logger.has_error_with_code(codes::syntax::UNEXPECTED_TOKEN));
        assert!(logger.has_success_with_code(codes::success::AST_CONSTRUCTION_COMPLETE));
    }

    #[test]
    fn test_log_level_filtering() {
        let logger = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(logger.clone(), LogLevel::Error);

        service.log_debug("Debug message");
        service.log_warning("Warning message");
        service.log_error(codes::system::INTERNAL_ERROR, "Error message");

        assert_eq!(logger.event_count(), 1);
        assert!(logger.has_error_with_code(codes::system::INTERNAL_ERROR));
    }
}
