//! # Rule file converter
//!
//! Reads a human rule file, lints it against an optional spec file, and emits the canonical
//! JSON rule file on stdout (SPEC_FULL §6/§13).
//!
//! ## Usage
//!
//! ```bash
//! ruleconv rules.txt
//! ruleconv rules.txt lint-spec.json
//! ```
//!
//! ## Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | success |
//! | 1 | usage error |
//! | 2 | rules file not found |
//! | 3 | lint spec file not found |
//! | 4 | rules file could not be read |
//! | 5 | lint spec file could not be read |
//! | 6 | lint spec file could not be decoded |
//! | 7 | rules file failed to parse |
//! | 8 | rules failed linting |
//! | 9 | canonical encoding failed |

use std::path::Path;
use std::process::ExitCode;

use clap::Parser as ClapParser;

use rules_engine::config::Config;
use rules_engine::linter::{lint, LintSpec};
use rules_engine::parser::parse_rule_line;
use rules_engine::serialize::encode_rules;

#[derive(ClapParser, Debug)]
#[command(name = "ruleconv", about = "Convert a human rule file into canonical JSON")]
struct Args {
    /// Path to the human rule-text file.
    rules_file: String,
    /// Optional path to a linter spec file.
    lint_spec_file: Option<String>,
    /// Log level override.
    #[arg(long, default_value = "info")]
    log_level: String,
    /// Emit logs as JSON.
    #[arg(long)]
    log_json: bool,
    /// Path to a rolling log file (defaults to stderr).
    #[arg(long)]
    log_file: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let _guard = rules_engine::logging::init(&args.log_level, args.log_json, args.log_file.as_deref());

    let config = Config::load().unwrap_or_default();

    if !Path::new(&args.rules_file).exists() {
        eprintln!("rules file not found: {}", args.rules_file);
        return ExitCode::from(2);
    }
    let source = match std::fs::read_to_string(&args.rules_file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("failed to read rules file: {e}");
            return ExitCode::from(4);
        }
    };

    let spec = match &args.lint_spec_file {
        None => None,
        Some(path) => {
            if !Path::new(path).exists() {
                eprintln!("lint spec file not found: {path}");
                return ExitCode::from(3);
            }
            let spec_source = match std::fs::read_to_string(path) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("failed to read lint spec file: {e}");
                    return ExitCode::from(5);
                }
            };
            match serde_json::from_str::<LintSpec>(&spec_source) {
                Ok(spec) => Some(spec),
                Err(e) => {
                    eprintln!("failed to decode lint spec file: {e}");
                    return ExitCode::from(6);
                }
            }
        }
    };

    let mut numbered_rules = Vec::new();
    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = strip_comment(raw_line).trim();
        if trimmed.is_empty() {
            continue;
        }
        match parse_rule_line(line_no, trimmed) {
            Ok(rule) => numbered_rules.push((line_no, trimmed.to_string(), rule)),
            Err(e) => {
                eprintln!("line {line_no}: {e}");
                return ExitCode::from(7);
            }
        }
    }

    let issues = lint(&numbered_rules, spec.as_ref());
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("{issue}");
        }
        if config.linter.strict || spec.is_some() {
            return ExitCode::from(8);
        }
    }

    let rules: Vec<_> = numbered_rules.into_iter().map(|(_, _, r)| r).collect();
    let encoded = encode_rules(&rules);
    match serde_json::to_string_pretty(&encoded) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("failed to encode rules as JSON: {e}");
            ExitCode::from(9)
        }
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}
