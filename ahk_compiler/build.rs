// build.rs - compile-time limits from config/<profile>.toml
//
// Every limit becomes a `pub const` in OUT_DIR/constants.rs, grouped into one
// module per TOML section. Limits are checked against hard ceilings here so an
// edited profile cannot produce an unbounded lexer or parser.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct Profile {
    file_processing: FileProcessing,
    lexical: Lexical,
    syntax: Syntax,
    lint: Lint,
    logging: Logging,
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct FileProcessing {
    max_file_size: u64,
    large_file_threshold: u64,
    max_line_count_for_analysis: usize,
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct Lexical {
    max_source_length: usize,
    max_string_size: usize,
    max_identifier_length: usize,
    max_token_count: usize,
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct Syntax {
    max_parse_depth: usize,
    max_context_stack_depth: usize,
    max_statement_scan_tokens: usize,
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct Lint {
    max_diagnostics: usize,
    short_name_threshold: usize,
    max_line_length: usize,
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct Logging {
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_file: usize,
    security_min_log_level: u8,
}

/// One generated module: (constant name, Rust type, value)
type Section = (&'static str, Vec<(&'static str, &'static str, String)>);

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=AHK_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=AHK_CONFIG_DIR");

    let profile_name = env::var("AHK_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let path = profile_path(&profile_name);
    println!("cargo:rerun-if-changed={}", path.display());

    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Cannot read limits profile {}: {}", path.display(), e));
    let profile: Profile = toml::from_str(&content)
        .unwrap_or_else(|e| panic!("Invalid limits profile {}: {}", path.display(), e));

    if let Err(problem) = check_limits(&profile, &profile_name) {
        panic!("Limits profile {} rejected: {}", path.display(), problem);
    }

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let generated = render(&profile_name, &sections(&profile));
    fs::write(Path::new(&out_dir).join("constants.rs"), generated).expect("write constants.rs");
}

/// `<workspace>/<AHK_CONFIG_DIR or config>/<profile>.toml`
fn profile_path(profile_name: &str) -> PathBuf {
    let config_dir = env::var("AHK_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("crate lives inside the workspace");

    workspace_root
        .join(config_dir)
        .join(format!("{}.toml", profile_name))
}

fn check_limits(profile: &Profile, profile_name: &str) -> Result<(), String> {
    const CEILING_FILE_SIZE: u64 = 1_000_000_000;
    const CEILING_TOKEN_COUNT: usize = 100_000_000;
    const CEILING_PARSE_DEPTH: usize = 10_000;

    let files = &profile.file_processing;
    let lexical = &profile.lexical;
    let syntax = &profile.syntax;

    if files.max_file_size > CEILING_FILE_SIZE {
        return Err("max_file_size is above the hard ceiling".into());
    }
    if files.large_file_threshold > files.max_file_size {
        return Err("large_file_threshold must not exceed max_file_size".into());
    }
    if lexical.max_source_length as u64 > files.max_file_size {
        return Err("max_source_length must not exceed max_file_size".into());
    }
    if lexical.max_token_count > CEILING_TOKEN_COUNT {
        return Err("max_token_count is above the hard ceiling".into());
    }
    if syntax.max_parse_depth > CEILING_PARSE_DEPTH {
        return Err("max_parse_depth is above the hard ceiling".into());
    }
    if syntax.max_statement_scan_tokens == 0 || syntax.max_context_stack_depth == 0 {
        return Err("syntax limits must be positive".into());
    }
    if profile.lint.max_diagnostics == 0 {
        return Err("max_diagnostics must be positive".into());
    }
    if profile.logging.security_min_log_level > 2 {
        return Err("security_min_log_level must be 0, 1 or 2".into());
    }

    if profile_name == "production" && (files.max_file_size > 50_000_000 || syntax.max_parse_depth > 1_000) {
        return Err("production limits must stay under 50 MB files and depth 1000".into());
    }
    Ok(())
}

fn sections(profile: &Profile) -> Vec<Section> {
    let f = &profile.file_processing;
    let x = &profile.lexical;
    let s = &profile.syntax;
    let l = &profile.lint;
    let g = &profile.logging;

    vec![
        ("file_processing", vec![
            ("MAX_FILE_SIZE", "u64", f.max_file_size.to_string()),
            ("LARGE_FILE_THRESHOLD", "u64", f.large_file_threshold.to_string()),
            ("MAX_LINE_COUNT_FOR_ANALYSIS", "usize", f.max_line_count_for_analysis.to_string()),
        ]),
        ("lexical", vec![
            ("MAX_SOURCE_LENGTH", "usize", x.max_source_length.to_string()),
            ("MAX_STRING_SIZE", "usize", x.max_string_size.to_string()),
            ("MAX_IDENTIFIER_LENGTH", "usize", x.max_identifier_length.to_string()),
            ("MAX_TOKEN_COUNT", "usize", x.max_token_count.to_string()),
        ]),
        ("syntax", vec![
            ("MAX_PARSE_DEPTH", "usize", s.max_parse_depth.to_string()),
            ("MAX_CONTEXT_STACK_DEPTH", "usize", s.max_context_stack_depth.to_string()),
            ("MAX_STATEMENT_SCAN_TOKENS", "usize", s.max_statement_scan_tokens.to_string()),
        ]),
        ("lint", vec![
            ("MAX_DIAGNOSTICS", "usize", l.max_diagnostics.to_string()),
            ("SHORT_NAME_THRESHOLD", "usize", l.short_name_threshold.to_string()),
            ("MAX_LINE_LENGTH", "usize", l.max_line_length.to_string()),
        ]),
        ("logging", vec![
            ("LOG_BUFFER_SIZE", "usize", g.log_buffer_size.to_string()),
            ("MAX_LOG_MESSAGE_LENGTH", "usize", g.max_log_message_length.to_string()),
            ("MAX_LOG_EVENTS_PER_FILE", "usize", g.max_log_events_per_file.to_string()),
            ("SECURITY_MIN_LOG_LEVEL", "u8", g.security_min_log_level.to_string()),
        ]),
    ]
}

fn render(profile_name: &str, sections: &[Section]) -> String {
    let mut code = String::new();
    let _ = writeln!(code, "// Generated by build.rs from the `{}` limits profile", profile_name);
    code.push_str("pub mod compile_time {\n");
    for (module, constants) in sections {
        let _ = writeln!(code, "    pub mod {} {{", module);
        for (name, ty, value) in constants {
            let _ = writeln!(code, "        pub const {}: {} = {};", name, ty, value);
        }
        code.push_str("    }\n");
    }
    code.push_str("}\n");
    code
}
