//! Per-file event collection with cargo-style reporting

use super::events::LogEvent;
use crate::config::constants::compile_time::logging::MAX_LOG_EVENTS_PER_FILE;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// The script a thread is currently working on
#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub files_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
}

impl ProcessingSummary {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.total_warnings > 0
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Thread-safe event store keyed by file
pub struct ErrorCollector {
    file_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
    processing_start: Instant,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            file_events: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    /// Record an event for a file. Past `MAX_LOG_EVENTS_PER_FILE` one
    /// truncation warning is stored and later events are dropped.
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut events = lock(&self.file_events);
        let file_events = events.entry(file_path.to_path_buf()).or_default();

        if file_events.len() < MAX_LOG_EVENTS_PER_FILE {
            file_events.push(event);
        } else if file_events.len() == MAX_LOG_EVENTS_PER_FILE {
            file_events.push(LogEvent::warning(&format!(
                "Too many events for file (limit: {})",
                MAX_LOG_EVENTS_PER_FILE
            )));
        }
    }

    pub fn get_file_events(&self, file_path: &Path) -> Vec<LogEvent> {
        lock(&self.file_events)
            .get(file_path)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_file_errors(&self, file_path: &Path) -> Vec<LogEvent> {
        lock(&self.file_events)
            .get(file_path)
            .map(|events| events.iter().filter(|e| e.is_error()).cloned().collect())
            .unwrap_or_default()
    }

    pub fn file_has_errors(&self, file_path: &Path) -> bool {
        lock(&self.file_events)
            .get(file_path)
            .is_some_and(|events| events.iter().any(|e| e.is_error()))
    }

    pub fn get_all_file_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        lock(&self.file_events).clone()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = lock(&self.file_events);

        let mut summary = ProcessingSummary {
            total_files: events.len(),
            total_processing_time: self.processing_start.elapsed(),
            ..Default::default()
        };

        for file_events in events.values() {
            let errors = file_events.iter().filter(|e| e.is_error()).count();
            let warnings = file_events.iter().filter(|e| e.is_warning()).count();

            if errors > 0 {
                summary.failed_files += 1;
            } else if warnings > 0 {
                summary.files_with_warnings += 1;
            } else {
                summary.successful_files += 1;
            }

            summary.total_errors += errors;
            summary.total_warnings += warnings;
        }

        summary
    }

    pub fn total_event_count(&self) -> usize {
        lock(&self.file_events).values().map(Vec::len).sum()
    }

    pub fn clear(&self) {
        lock(&self.file_events).clear();
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn location(file_path: &Path, event: &LogEvent) -> String {
    event
        .span
        .as_ref()
        .map(|s| {
            format!(
                "\n  --> {}:{}:{}",
                file_path.display(),
                s.start().line,
                s.start().column
            )
        })
        .unwrap_or_default()
}

/// Render collected errors and warnings grouped by file, cargo style
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (file_path, events) in &collector.get_all_file_events() {
        let reportable: Vec<_> = events
            .iter()
            .filter(|e| e.is_error() || e.is_warning())
            .collect();
        if reportable.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", file_path.display()));

        for event in reportable {
            let label = if event.is_error() { "error" } else { "warning" };
            output.push_str(&format!(
                "{}[{}]: {}{}\n",
                label,
                event.code.as_str(),
                event.message,
                location(file_path, event)
            ));

            for (key, value) in &event.context {
                if key != "file" && key != "file_id" {
                    output.push_str(&format!("  = {}: {}\n", key, value));
                }
            }

            if event.is_error() {
                let action = event.recommended_action();
                if action != "No specific action available" {
                    output.push_str(&format!("  = help: {}\n", action));
                }
            }
        }

        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_files > 0 {
        output.push_str(&format!(
            "Checked {} file(s) in {:.2}s\n",
            summary.total_files,
            summary.total_processing_time.as_secs_f64()
        ));
    }
    if summary.has_errors() {
        output.push_str(&format!("Total errors: {}\n", summary.total_errors));
    }
    if summary.has_warnings() {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::utils::{Position, Span};

    #[test]
    fn test_error_collector_basic() {
        let collector = ErrorCollector::new();
        let file_path = PathBuf::from("hotkeys.ahk");

        collector.record_event(
            &file_path,
            LogEvent::error(codes::lexical::UNTERMINATED_STRING, "Test error"),
        );

        assert_eq!(collector.get_file_events(&file_path).len(), 1);
        assert!(collector.file_has_errors(&file_path));
        assert_eq!(collector.get_file_errors(&file_path).len(), 1);
    }

    #[test]
    fn test_processing_summary() {
        let collector = ErrorCollector::new();

        collector.record_event(
            Path::new("a.ahk"),
            LogEvent::error(codes::syntax::UNEXPECTED_TOKEN, "Error"),
        );
        collector.record_event(Path::new("b.ahk"), LogEvent::warning("Warning"));
        collector.record_event(Path::new("c.ahk"), LogEvent::info("fine"));

        let summary = collector.get_summary();
        assert_eq!(summary.total_files, 3);
        assert_eq!(summary.failed_files, 1);
        assert_eq!(summary.files_with_warnings, 1);
        assert_eq!(summary.successful_files, 1);
        assert_eq!(summary.total_errors, 1);
        assert_eq!(summary.total_warnings, 1);
    }

    #[test]
    fn test_per_file_limit_adds_single_truncation_warning() {
        let collector = ErrorCollector::new();
        let file_path = PathBuf::from("big.ahk");

        for _ in 0..MAX_LOG_EVENTS_PER_FILE + 5 {
            collector.record_event(&file_path, LogEvent::info("event"));
        }

        let events = collector.get_file_events(&file_path);
        assert_eq!(events.len(), MAX_LOG_EVENTS_PER_FILE + 1);
        assert!(events.last().unwrap().is_warning());
    }

    #[test]
    fn test_cargo_style_output() {
        let collector = ErrorCollector::new();
        let span = Span::point(Position::new(3, 2, 4));
        collector.record_event(
            Path::new("main.ahk"),
            LogEvent::error(codes::syntax::FUNCTION_CALL_COMMA, "comma after name")
                .with_span(span)
                .with_context("file", "main.ahk"),
        );

        let report = format_cargo_style_errors(&collector);
        assert!(report.contains("Checking main.ahk..."));
        assert!(report.contains("error[E043]: comma after name"));
        assert!(report.contains("--> main.ahk:2:4"));
        assert!(!report.contains("= file:"));
        assert!(report.contains("Checked 1 file(s)"));
        assert!(report.contains("Total errors: 1"));
    }

    #[test]
    fn test_clear() {
        let collector = ErrorCollector::new();
        collector.record_event(Path::new("x.ahk"), LogEvent::warning("w"));
        collector.clear();
        assert_eq!(collector.total_event_count(), 0);
    }
}
