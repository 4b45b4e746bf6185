//! Logging macros taking `Code` values and `"key" => Display` context pairs

#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr) => {
        $crate::logging::log_error_with_context($code, $message, None, vec![])
    };

    ($code:expr, $message:expr, span = $span:expr) => {
        $crate::logging::log_error_with_context($code, $message, Some($span), vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_error_with_context($code, $message, None, context_refs)
        }
    };

    ($code:expr, $message:expr, span = $span:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_error_with_context($code, $message, Some($span), context_refs)
        }
    };
}

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr) => {
        $crate::logging::log_success_with_context($code, $message, vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_success_with_context($code, $message, context_refs)
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::logging::log_with_context($crate::logging::LogEvent::info($message), vec![])
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_with_context($crate::logging::LogEvent::info($message), context_refs)
        }
    };
}

#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        $crate::logging::log_with_context($crate::logging::LogEvent::warning($message), vec![])
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_with_context($crate::logging::LogEvent::warning($message), context_refs)
        }
    };
}

/// Debug events are built only when the configured level admits them
#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        if $crate::logging::config::get_min_log_level() >= $crate::logging::LogLevel::Debug {
            $crate::logging::log_with_context($crate::logging::LogEvent::debug($message), vec![])
        }
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::config::get_min_log_level() >= $crate::logging::LogLevel::Debug {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_with_context($crate::logging::LogEvent::debug($message), context_refs)
        }
    };
}

/// Success event with a `duration_ms` context entry
#[macro_export]
macro_rules! log_performance {
    ($code:expr, $message:expr, duration = $duration:expr) => {
        $crate::log_success!($code, $message,
            "duration_ms" => format!("{:.3}", $duration.as_secs_f64() * 1000.0)
        )
    };

    ($code:expr, $message:expr, duration = $duration:expr, $($key:expr => $value:expr),+) => {
        $crate::log_success!($code, $message,
            "duration_ms" => format!("{:.3}", $duration.as_secs_f64() * 1000.0),
            $($key => $value),+
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::logging::codes;
    use crate::utils::{Position, Span};
    use std::time::Duration;

    #[test]
    fn test_macros_accept_display_values() {
        let file_size: u64 = 1024;
        let path = std::path::PathBuf::from("scripts/main.ahk");

        log_error!(codes::lexical::UNTERMINATED_STRING, "Unterminated string",
            "line" => 3,
            "quote" => '"'
        );
        log_error!(
            codes::syntax::FUNCTION_CALL_COMMA,
            "comma",
            span = Span::point(Position::start())
        );
        log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenized", "tokens" => 157);
        log_info!("Processing file", "is_large" => file_size > 1000);
        log_warning!("Residual bracket depth", "path" => path.display());
        log_debug!("scan", "depth" => -1);
        log_performance!(
            codes::success::FILE_PROCESSING_SUCCESS,
            "done",
            duration = Duration::from_millis(15),
            "file_size" => file_size
        );
    }
}
