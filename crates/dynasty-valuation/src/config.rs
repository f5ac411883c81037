// Configuration loading and parsing (league.toml, strategy.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::engine::EngineOptions;
use crate::league::picks::MAX_TRACKED_ROUND;
use crate::valuation::composite::CompositeWeights;
use crate::valuation::needs::NeedsConfig;

/// Longest pick lookahead accepted from league.toml.
pub const MAX_LOOKAHEAD_YEARS: u16 = 10;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub strategy: StrategyConfig,
    pub db_path: String,
    pub data_paths: DataPaths,
}

impl Config {
    /// Engine knobs assembled from both config files.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            season: self.league.season,
            lookahead_years: self.league.lookahead_years,
            tracked_rounds: self.league.tracked_rounds,
            weights: self.strategy.weights,
            needs: self.strategy.needs,
            debug: self.strategy.debug,
        }
    }
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    /// Season to value as of. When omitted, each snapshot's own season is
    /// used, then the current calendar year.
    #[serde(default)]
    pub season: Option<u16>,
    #[serde(default = "default_lookahead_years")]
    pub lookahead_years: u16,
    #[serde(default = "default_tracked_rounds")]
    pub tracked_rounds: u8,
}

fn default_lookahead_years() -> u16 {
    2
}

fn default_tracked_rounds() -> u8 {
    MAX_TRACKED_ROUND
}

// ---------------------------------------------------------------------------
// strategy.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire strategy.toml file.
#[derive(Debug, Clone, Deserialize)]
struct StrategyFile {
    weights: CompositeWeights,
    #[serde(default)]
    needs: NeedsConfig,
    #[serde(default)]
    output: OutputSection,
    database: DatabaseSection,
    data_paths: DataPaths,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OutputSection {
    #[serde(default)]
    debug: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

/// The public strategy config assembled from the strategy.toml sections.
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    pub weights: CompositeWeights,
    pub needs: NeedsConfig,
    pub debug: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub market_values: String,
    pub pick_values: String,
    /// League snapshot JSON files to value.
    #[serde(default)]
    pub leagues: Vec<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/strategy.toml`, relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    // --- strategy.toml (required) ---
    let strategy_path = config_dir.join("strategy.toml");
    let strategy_text = read_file(&strategy_path)?;
    let strategy_file: StrategyFile =
        toml::from_str(&strategy_text).map_err(|e| ConfigError::ParseError {
            path: strategy_path.clone(),
            source: e,
        })?;

    let config = Config {
        league: league_file.league,
        strategy: StrategyConfig {
            weights: strategy_file.weights,
            needs: strategy_file.needs,
            debug: strategy_file.output.debug,
        },
        db_path: strategy_file.database.path,
        data_paths: strategy_file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// Config files the loader requires, each seeded from `defaults/` when absent.
const CONFIG_FILES: [&str; 2] = ["league.toml", "strategy.toml"];

/// Seed `config/` with any required file it lacks, copied from `defaults/`.
/// Files already in `config/` are left untouched. Returns the files that
/// were written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    let mut copied = Vec::new();
    for name in CONFIG_FILES {
        let target = config_dir.join(name);
        if target.is_file() {
            continue;
        }
        let source = defaults_dir.join(name);
        if !source.is_file() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "{name} is missing from both config/ and defaults/ in {}",
                    base_dir.display()
                ),
            });
        }
        seed_file(&source, &target)?;
        copied.push(target);
    }

    Ok(copied)
}

fn seed_file(source: &Path, target: &Path) -> Result<(), ConfigError> {
    let copy_error = |e: std::io::Error| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {} to {}: {e}", source.display(), target.display()),
    };
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(copy_error)?;
    }
    std::fs::copy(source, target).map_err(copy_error)?;
    Ok(())
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message,
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let rounds = config.league.tracked_rounds;
    if !(1..=MAX_TRACKED_ROUND).contains(&rounds) {
        return Err(invalid(
            "league.tracked_rounds",
            format!("must be between 1 and {MAX_TRACKED_ROUND}, got {rounds}"),
        ));
    }

    let lookahead = config.league.lookahead_years;
    if lookahead > MAX_LOOKAHEAD_YEARS {
        return Err(invalid(
            "league.lookahead_years",
            format!("must be at most {MAX_LOOKAHEAD_YEARS}, got {lookahead}"),
        ));
    }

    // Weights: any non-negative values with a positive total.
    let w = &config.strategy.weights;
    for (name, val) in w.named() {
        if !val.is_finite() || val < 0.0 {
            return Err(invalid(&format!("weights.{name}"), format!("must be >= 0, got {val}")));
        }
    }
    if w.total() <= 0.0 {
        return Err(invalid("weights", "at least one weight must be > 0".into()));
    }

    let needs = &config.strategy.needs;
    let needs_fields: &[(&str, f64)] = &[
        ("needs.qb_buffer", needs.qb_buffer),
        ("needs.skill_buffer", needs.skill_buffer),
        ("needs.surplus_margin", needs.surplus_margin),
    ];
    for (name, val) in needs_fields {
        if !val.is_finite() || *val < 0.0 {
            return Err(invalid(name, format!("must be >= 0, got {val}")));
        }
    }
    if needs.max_matches == 0 {
        return Err(invalid("needs.max_matches", "must be > 0".into()));
    }

    if config.db_path.trim().is_empty() {
        return Err(invalid("database.path", "must not be empty".into()));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
