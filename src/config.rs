//! Configuration System
//!
//! Provides hierarchical configuration loading from:
//! - config.toml (default configuration)
//! - config.local.toml (git-ignored local overrides)
//! - Environment variables (RULES_* prefix)
//!
//! ## Example
//!
//! ```toml
//! # config.toml
//! [engine]
//! cache_answers = true
//! strategy = "undefined"
//!
//! [logging]
//! level = "debug"
//! ```
//!
//! Environment variable overrides:
//! ```bash
//! RULES_ENGINE__CACHE_ANSWERS=true
//! RULES_LOGGING__LEVEL=debug
//! ```

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::rule::SelectionStrategy;

/// Top-level configuration controlling the defaults binaries construct a [`crate::brain::Brain`]
/// / [`crate::facts::Facts`] with (SPEC_FULL §10.3). It never changes engine semantics, which
/// are fixed entirely by the rules a client supplies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub linter: LinterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub cache_answers: bool,
    #[serde(default)]
    pub strategy: StrategyConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyConfig {
    #[default]
    Fail,
    Undefined,
}

impl From<StrategyConfig> for SelectionStrategy {
    fn from(value: StrategyConfig) -> Self {
        match value {
            StrategyConfig::Fail => SelectionStrategy::Fail,
            StrategyConfig::Undefined => SelectionStrategy::Undefined,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinterConfig {
    /// When true, the converter CLI treats lint warnings as fatal (exit code 8).
    #[serde(default)]
    pub strict: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            cache_answers: false,
            strategy: StrategyConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            engine: EngineConfig::default(),
            logging: LoggingConfig::default(),
            linter: LinterConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Merges in order:
    /// 1. config.toml (base configuration)
    /// 2. config.local.toml (local overrides, git-ignored)
    /// 3. Environment variables (RULES_* prefix, `__`-separated nesting)
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(figment::providers::Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Toml::file("config.local.toml"))
            .merge(Env::prefixed("RULES_").split("__"))
            .extract()
    }

    /// Load configuration from a specific file path.
    pub fn from_file(path: &str) -> Result<Self, figment::Error> {
        Figment::from(figment::providers::Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("RULES_").split("__"))
            .extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_fails_closed() {
        let config = Config::default();
        assert_eq!(config.engine.strategy, StrategyConfig::Fail);
        assert!(!config.engine.cache_answers);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("[engine]"));
        assert!(toml_str.contains("[logging]"));
    }

    #[test]
    fn from_file_loads_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[engine]\ncache_answers = true\nstrategy = \"undefined\"\n",
        )
        .unwrap();
        let config = Config::from_file(path.to_str().unwrap()).unwrap();
        assert!(config.engine.cache_answers);
        assert_eq!(config.engine.strategy, StrategyConfig::Undefined);
    }
}
