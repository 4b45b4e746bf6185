//! Logging limits (build profile) and preferences (runtime)
//!
//! The preferences are installed once, normally from the CLI's `--config`
//! file; before that the environment defaults apply.

use crate::config::constants::compile_time::logging::{
    LOG_BUFFER_SIZE, MAX_LOG_EVENTS_PER_FILE, MAX_LOG_MESSAGE_LENGTH, SECURITY_MIN_LOG_LEVEL,
};
use crate::config::runtime::LoggingPreferences;
use crate::logging::events::LogLevel;
use std::sync::OnceLock;

static PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    PREFERENCES
        .set(preferences)
        .map_err(|_| "Logging preferences already installed".to_string())
}

fn preferences() -> LoggingPreferences {
    PREFERENCES.get().cloned().unwrap_or_default()
}

/// The profile's floor: levels at or above it are always reported
pub fn get_security_log_level() -> LogLevel {
    match SECURITY_MIN_LOG_LEVEL {
        0 => LogLevel::Error,
        1 => LogLevel::Warning,
        _ => LogLevel::Info,
    }
}

/// Requested level, raised to the security floor when lower
pub fn get_min_log_level() -> LogLevel {
    preferences()
        .min_log_level
        .to_events_log_level()
        .max(get_security_log_level())
}

pub fn use_structured_logging() -> bool {
    preferences().use_structured_logging
}

pub fn use_console_logging() -> bool {
    preferences().enable_console_logging
}

pub fn log_performance_events() -> bool {
    preferences().log_performance_events
}

pub fn use_cargo_style_output() -> bool {
    preferences().enable_cargo_style_output
}

pub fn include_file_context() -> bool {
    preferences().include_file_context
}

/// Capacity of the in-memory logger
pub fn get_error_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

pub fn get_max_log_message_length() -> usize {
    MAX_LOG_MESSAGE_LENGTH
}

/// Reject limit combinations the collector cannot honour
pub fn validate_config() -> Result<(), String> {
    if !(100..=100_000).contains(&LOG_BUFFER_SIZE) {
        return Err(format!("LOG_BUFFER_SIZE {} outside 100..=100000", LOG_BUFFER_SIZE));
    }
    if MAX_LOG_EVENTS_PER_FILE > LOG_BUFFER_SIZE {
        return Err(format!(
            "MAX_LOG_EVENTS_PER_FILE {} exceeds LOG_BUFFER_SIZE {}",
            MAX_LOG_EVENTS_PER_FILE, LOG_BUFFER_SIZE
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(validate_config().is_ok());
    }

    #[test]
    fn test_min_level_respects_security_floor() {
        assert!(get_min_log_level() >= get_security_log_level());
    }
}
