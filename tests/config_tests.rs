//! Config loading and env-var override tests (SPEC_FULL §10.3).

use rules_engine::config::{Config, StrategyConfig};
use tempfile::TempDir;

#[test]
fn defaults_fail_closed_and_do_not_cache() {
    let config = Config::default();
    assert_eq!(config.engine.strategy, StrategyConfig::Fail);
    assert!(!config.engine.cache_answers);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, "text");
    assert!(!config.linter.strict);
}

#[test]
fn from_file_overrides_engine_section() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(
        &path,
        "[engine]\ncache_answers = true\nstrategy = \"undefined\"\n\n[linter]\nstrict = true\n",
    )
    .unwrap();

    let config = Config::from_file(path.to_str().unwrap()).unwrap();
    assert!(config.engine.cache_answers);
    assert_eq!(config.engine.strategy, StrategyConfig::Undefined);
    assert!(config.linter.strict);
}

#[test]
fn missing_file_still_yields_defaults() {
    let temp = TempDir::new().unwrap();
    let nonexistent = temp.path().join("nonexistent.toml");
    let config = Config::from_file(nonexistent.to_str().unwrap()).unwrap();
    let defaults = Config::default();
    assert_eq!(config.engine.strategy, defaults.engine.strategy);
    assert_eq!(config.engine.cache_answers, defaults.engine.cache_answers);
}
