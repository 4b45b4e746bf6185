use ahk_compiler::compiler::{format_diagnostics, AhkCompiler, CompilerError, CompilerResult};
use ahk_compiler::config::runtime::RuntimeConfig;
use ahk_compiler::{file_processor, logging, pipeline};
use serde::Serialize;
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Pipeline,
    Tokens,
    Ast,
    Lint,
    Semantic,
    Stats,
}

#[derive(Debug, PartialEq)]
struct CliOptions {
    mode: Mode,
    json: bool,
    config_path: Option<String>,
    inputs: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map(String::as_str).unwrap_or("ahk_compiler");
    if args.len() < 2 {
        eprintln!("Usage: {} <script.ahk>... [options]", program_name);
        eprintln!("       {} --help", program_name);
        std::process::exit(1);
    }
    if args[1..].iter().any(|a| a == "--help") {
        print_help(program_name);
        return Ok(());
    }

    let options = parse_options(&args[1..]);
    if options.inputs.is_empty() {
        eprintln!("Error: no input files");
        std::process::exit(1);
    }

    let config = match &options.config_path {
        Some(path) => RuntimeConfig::load(Path::new(path))?,
        None => RuntimeConfig::default(),
    };
    logging::config::init_runtime_preferences(config.logging.clone())?;
    logging::init_global_logging()?;
    pipeline::validate_pipeline()?;

    let mut failed = false;
    for input in &options.inputs {
        let ok = if options.mode == Mode::Pipeline {
            run_pipeline(input, &config, options.json)?
        } else {
            run_pass(input, &config, &options)?
        };
        failed |= !ok;
    }

    if logging::config::use_cargo_style_output() {
        logging::print_cargo_style_summary();
    }
    if failed {
        std::process::exit(1);
    }
    Ok(())
}

fn print_help(program_name: &str) {
    println!("AutoHotkey v2 compiler v{}", env!("CARGO_PKG_VERSION"));
    println!("Tokenizer, parser, linter and semantic token provider for AutoHotkey v2 scripts");
    println!();
    println!("USAGE:");
    println!("    {} <script.ahk>... [options]", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help            Show this help message");
    println!("    --tokens          Print the token stream");
    println!("    --ast             Print the syntax tree");
    println!("    --lint            Print lint diagnostics");
    println!("    --semantic        Print semantic tokens");
    println!("    --stats           Print size and complexity statistics");
    println!("    --json            Emit JSON instead of text");
    println!("    --config FILE     Load runtime preferences from a TOML file");
    println!();
    println!("Without a pass option the full pipeline runs: file checks, lexing,");
    println!("parsing and lint. Supported extensions: {}", file_processor::ALLOWED_EXTENSIONS.join(", "));
    println!("Limits: {}", ahk_compiler::config::build_info::source_info());
}

fn parse_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions {
        mode: Mode::Pipeline,
        json: false,
        config_path: None,
        inputs: Vec::new(),
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--tokens" => options.mode = Mode::Tokens,
            "--ast" => options.mode = Mode::Ast,
            "--lint" => options.mode = Mode::Lint,
            "--semantic" => options.mode = Mode::Semantic,
            "--stats" => options.mode = Mode::Stats,
            "--json" => options.json = true,
            "--config" => {
                if i + 1 < args.len() {
                    options.config_path = Some(args[i + 1].clone());
                    i += 1;
                } else {
                    eprintln!("Warning: --config requires a path");
                }
            }
            other if other.starts_with("--") => {
                eprintln!("Warning: Unknown option '{}'", other);
            }
            input => options.inputs.push(input.to_string()),
        }
        i += 1;
    }

    options
}

/// Full pipeline on one file; returns whether it passed
fn run_pipeline(input: &str, config: &RuntimeConfig, json: bool) -> Result<bool, Box<dyn std::error::Error>> {
    match pipeline::process_file_with_config(input, config) {
        Ok(result) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&result.diagnostics)?);
            } else {
                println!("{}:", input);
                println!(
                    "  {} statements, {} tokens, {} lines in {:.2}ms",
                    result.program.body.len(),
                    result.token_count,
                    result.file_metadata.line_count,
                    result.processing_duration.as_secs_f64() * 1000.0
                );
                for line in format_diagnostics(&result.diagnostics).lines() {
                    println!("  {}", line);
                }
            }
            Ok(!result.has_errors())
        }
        Err(error) => {
            eprintln!("{}: {} failed [{}]", input, error.stage(), error.error_code());
            match (error.location(), file_processor::process_file_with_preferences(input, &config.file_processor)) {
                (Some(location), Ok(file)) => {
                    let located = CompilerError::new(error.to_string(), Some(location));
                    eprint!("{}", located.render(&file.source));
                }
                _ => eprintln!("  {}", error),
            }
            Ok(false)
        }
    }
}

/// One facade pass on one file; returns whether it passed
fn run_pass(input: &str, config: &RuntimeConfig, options: &CliOptions) -> Result<bool, Box<dyn std::error::Error>> {
    let file = match file_processor::process_file_with_preferences(input, &config.file_processor) {
        Ok(file) => file,
        Err(error) => {
            eprintln!("{}: [{}] {}", input, error.error_code(), error);
            return Ok(false);
        }
    };
    let compiler = AhkCompiler::with_config(config);
    let source = file.source.as_str();

    match options.mode {
        Mode::Tokens => emit(compiler.tokenize(source), source, options.json, |tokens| {
            tokens
                .iter()
                .map(|t| format!("{}:{} {:?} {:?}", t.line, t.column, t.token_type, t.text))
                .collect::<Vec<_>>()
                .join("\n")
        }),
        Mode::Ast => emit(compiler.parse(source), source, options.json, |program| format!("{:#?}", program)),
        Mode::Lint => {
            let result = compiler.lint(source);
            let clean = result
                .data
                .as_ref()
                .map_or(false, |diagnostics| !diagnostics.iter().any(|d| d.is_error()));
            emit(result, source, options.json, |diagnostics| format_diagnostics(diagnostics))?;
            Ok(clean)
        }
        Mode::Semantic => emit(compiler.semantic_tokens(source), source, options.json, |tokens| {
            tokens
                .iter()
                .map(|t| format!("{}:{} len {} {}", t.line, t.character, t.length, t.token_type.as_str()))
                .collect::<Vec<_>>()
                .join("\n")
        }),
        Mode::Stats => emit(compiler.statistics(source), source, options.json, |s| {
            format!(
                "lines: {}\ntokens: {}\nfunctions: {}\nclasses: {}\ncomments: {}\nhotkeys: {}\ncomplexity: {}",
                s.lines, s.tokens, s.functions, s.classes, s.comments, s.hotkeys, s.complexity
            )
        }),
        Mode::Pipeline => run_pipeline(input, config, options.json),
    }
}

fn emit<T: Serialize>(
    result: CompilerResult<T>,
    source: &str,
    json: bool,
    render: impl FnOnce(&T) -> String,
) -> Result<bool, Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(result.success);
    }

    if let Some(data) = &result.data {
        println!("{}", render(data));
    }
    for error in &result.errors {
        eprint!("{}", error.render(source));
    }
    Ok(result.success)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_options() {
        let options = parse_options(&args(&["a.ahk", "--lint", "--json", "--config", "prefs.toml", "b.ah2"]));
        assert_eq!(options.mode, Mode::Lint);
        assert!(options.json);
        assert_eq!(options.config_path.as_deref(), Some("prefs.toml"));
        assert_eq!(options.inputs, vec!["a.ahk", "b.ah2"]);
    }

    #[test]
    fn test_parse_options_defaults() {
        let options = parse_options(&args(&["--unknown", "x.ahk", "--config"]));
        assert_eq!(options.mode, Mode::Pipeline);
        assert!(!options.json);
        assert!(options.config_path.is_none());
        assert_eq!(options.inputs, vec!["x.ahk"]);
    }
}
