//! Configuration module for the AHK compiler
//! Automatically uses generated constants from TOML configuration

// Generated at compile time from config/<profile>.toml
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod constants;
pub mod runtime;

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("AHK_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("AHK_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info_names_profile() {
        assert!(build_info::source_info().ends_with(&format!("{}.toml", build_info::profile())));
    }

    #[test]
    fn test_generated_limits_are_consistent() {
        assert!(compile_time::lexical::MAX_SOURCE_LENGTH as u64 <= compile_time::file_processing::MAX_FILE_SIZE);
        assert!(compile_time::syntax::MAX_STATEMENT_SCAN_TOKENS > 0);
        assert!(compile_time::lint::MAX_DIAGNOSTICS > 0);
    }
}
