//! Limits used across the compiler
//!
//! Profile-dependent values are generated by build.rs from
//! `config/<profile>.toml` and re-exported here, next to the fixed limits that
//! do not vary by profile. Call sites import from this module only.

pub mod compile_time {
    pub mod file_processing {
        pub use crate::config::compile_time::file_processing::*;

        /// Extensions accepted for AutoHotkey v2 scripts (lowercase)
        pub const ALLOWED_EXTENSIONS: &[&str] = &["ahk", "ah2", "ahk2"];
    }

    pub mod lexical {
        pub use crate::config::compile_time::lexical::*;

        /// Longest `#Directive` name the scanner will accept
        pub const MAX_DIRECTIVE_NAME_LENGTH: usize = 64;

        /// Longest hotstring option block (`:opts:`)
        pub const MAX_HOTSTRING_OPTIONS_LENGTH: usize = 64;
    }

    pub mod syntax {
        pub use crate::config::compile_time::syntax::*;
    }

    pub mod lint {
        pub use crate::config::compile_time::lint::*;

        /// Names the short-variable check accepts
        pub const CONVENTIONAL_SHORT_NAMES: &[&str] = &["i", "j", "k", "n", "x", "y", "_"];
    }

    pub mod logging {
        pub use crate::config::compile_time::logging::*;
    }
}
