//! # Interactive REPL
//!
//! Loads a canonical JSON rule file, then lets a user `know`, `forget`, and `ask` questions
//! against the resulting brain (SPEC_FULL §13). Grounded on the teacher's `inputlayer-client`
//! readline loop: a `rustyline::DefaultEditor` with persistent history under the user's home
//! directory, and a dot-command help/quit convention.
//!
//! ## Commands
//!
//! - `know <question> <answer-spec>` - set a known fact (`(bool)true`, `(int)3`, `(double)2.5`, or a bare string)
//! - `forget <question>` - remove a known fact
//! - `ask <question>` - resolve a question, deriving it from rules if necessary
//! - `.help` - show this command reference
//! - `.quit` - exit

use std::path::PathBuf;

use clap::Parser as ClapParser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use rules_engine::answer::{Answer, Registry};
use rules_engine::brain::Brain;
use rules_engine::config::Config;
use rules_engine::error::AnswerError;
use rules_engine::facts::Facts;
use rules_engine::serialize::decode_rules;

#[derive(ClapParser, Debug)]
#[command(name = "rules-repl", about = "Interactively query a rule set")]
struct Args {
    /// Path to a canonical JSON rule file.
    rules_file: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let _guard = rules_engine::logging::init("info", false, None);
    let config = Config::load().unwrap_or_default();

    let source = std::fs::read_to_string(&args.rules_file)?;
    let json: serde_json::Value = serde_json::from_str(&source)?;
    let registry = Registry::new();
    let rules = decode_rules(&json, &registry)?;

    let mut brain = Brain::new(config.engine.strategy.into());
    brain.add(rules);
    let mut facts = Facts::new(brain, registry, config.engine.cache_answers);

    println!("rules-engine REPL — {} rule(s) loaded from {}", facts_rule_count(&args.rules_file), args.rules_file);
    println!("Type .help for a command reference.");

    run_repl(&mut facts)
}

fn facts_rule_count(path: &str) -> String {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str::<serde_json::Value>(&s).ok())
        .and_then(|v| v.as_array().map(|a| a.len().to_string()))
        .unwrap_or_else(|| "?".to_string())
}

fn run_repl(facts: &mut Facts) -> Result<(), Box<dyn std::error::Error>> {
    let mut rl = DefaultEditor::new()?;
    let history_path = history_path();
    if history_path.exists() {
        let _ = rl.load_history(&history_path);
    }

    loop {
        match rl.readline("rules> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);
                if line == ".quit" {
                    println!("Goodbye!");
                    break;
                }
                if line == ".help" {
                    print_help();
                    continue;
                }
                handle_command(facts, line);
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {err:?}");
                break;
            }
        }
    }

    let _ = rl.save_history(&history_path);
    Ok(())
}

fn handle_command(facts: &mut Facts, line: &str) {
    let mut parts = line.splitn(3, ' ');
    match parts.next() {
        Some("know") => {
            let (Some(question), Some(answer_text)) = (parts.next(), parts.next()) else {
                println!("usage: know <question> <answer-spec>");
                return;
            };
            match parse_answer_spec(answer_text) {
                Ok(answer) => {
                    facts.know(question, answer);
                    println!("ok");
                }
                Err(e) => println!("error: {e}"),
            }
        }
        Some("forget") => {
            let Some(question) = parts.next() else {
                println!("usage: forget <question>");
                return;
            };
            facts.forget(question);
            println!("ok");
        }
        Some("ask") => {
            let Some(question) = parts.next() else {
                println!("usage: ask <question>");
                return;
            };
            match facts.ask(question) {
                Ok(result) => print_answer(&result.answer, result.ambiguous_rules.len()),
                Err(e) => print_answer_error(&e),
            }
        }
        _ => println!("unrecognized command, type .help"),
    }
}

fn print_answer(answer: &Answer, ambiguous_tiers: usize) {
    println!("{answer:?}");
    if ambiguous_tiers > 0 {
        println!("({ambiguous_tiers} ambiguous tier(s) resolved by first-candidate selection)");
    }
}

fn print_answer_error(err: &AnswerError) {
    println!("error: {err}");
}

/// Parse the same `(bool)true` / `(int)3` / `(double)2.5` / bare-string forms the converter's
/// rule-text grammar accepts for answers, minus the named-assignment form (the REPL only ever
/// sets known facts, never assignment-backed rules).
fn parse_answer_spec(text: &str) -> Result<Answer, String> {
    if let Some(rest) = text.strip_prefix("(bool)") {
        return match rest {
            "true" => Ok(Answer::Bool(true)),
            "false" => Ok(Answer::Bool(false)),
            other => Err(format!("not a bool literal: {other}")),
        };
    }
    if let Some(rest) = text.strip_prefix("(int)") {
        return rest.parse::<i64>().map(Answer::Int).map_err(|e| e.to_string());
    }
    if let Some(rest) = text.strip_prefix("(double)") {
        return rest.parse::<f64>().map(Answer::Double).map_err(|e| e.to_string());
    }
    if let Some(rest) = text.strip_prefix("(string)") {
        return Ok(Answer::String(rest.to_string()));
    }
    Ok(Answer::String(text.to_string()))
}

fn history_path() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        let dir = home.join(".rules-engine");
        let _ = std::fs::create_dir_all(&dir);
        dir.join("history")
    } else {
        PathBuf::from(".rules-engine_history")
    }
}

fn print_help() {
    println!("Commands:");
    println!("  know <question> <answer-spec>   set a known fact");
    println!("  forget <question>               remove a known fact");
    println!("  ask <question>                  resolve a question");
    println!("  .help                           show this help");
    println!("  .quit                           exit");
    println!();
    println!("Answer specs: (bool)true, (int)3, (double)2.5, (string)text, or a bare string.");
}
