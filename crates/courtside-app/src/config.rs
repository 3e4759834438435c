// Configuration loading and parsing (config/dashboard.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use courtside_core::window::ALL_OPPONENTS;

use crate::source::{find_team, teams::team_names};

/// Config file name, both under `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "dashboard.toml";

/// Upper bound on how many seasons may be loaded at once.
pub const MAX_SEASONS_BACK: usize = 25;

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

    #[error("no config yet and no template at {path}")]
    MissingTemplate { path: PathBuf },

    #[error("failed to seed config at {path}: {source}")]
    SeedError {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// dashboard.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub player: PlayerConfig,
    pub query: QueryConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Which player to chart: a team (full name or abbreviation) and a name on
/// that team's roster for the most recent season.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerConfig {
    pub team: String,
    pub name: String,
}

/// The user-adjustable dashboard parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    pub over_under_line: f64,
    pub lookback_games: usize,
    pub seasons_back: usize,
    /// Opponent abbreviation, or `"All"` for the lookback window.
    #[serde(default = "default_opponent")]
    pub opponent: String,
    #[serde(default)]
    pub opponent_cap: Option<usize>,
}

impl QueryConfig {
    /// The opponent filter, with the "All" sentinel mapped to `None`.
    pub fn opponent_filter(&self) -> Option<&str> {
        let opponent = self.opponent.trim();
        (!opponent.is_empty() && opponent != ALL_OPPONENTS).then_some(opponent)
    }
}

fn default_opponent() -> String {
    ALL_OPPONENTS.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Http,
    Csv,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_season_type")]
    pub season_type: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub csv_dir: String,
}

fn default_base_url() -> String {
    "https://stats.nba.com/stats".to_string()
}

fn default_season_type() -> String {
    "Regular Season".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Also render one report per opponent the player has faced.
    #[serde(default)]
    pub opponent_breakdown: bool,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/dashboard.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()` for normal startup.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Seed `config/dashboard.toml` from `defaults/dashboard.toml` when there
/// is no config yet. An existing config is left alone. Returns the path that
/// was written, if any.
pub fn seed_config(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.is_file() {
        return Ok(None);
    }

    let template = base_dir.join("defaults").join(CONFIG_FILE);
    if !template.is_file() {
        return Err(ConfigError::MissingTemplate { path: template });
    }

    let seed_err = |source| ConfigError::SeedError {
        path: target.clone(),
        source,
    };
    std::fs::create_dir_all(base_dir.join("config")).map_err(seed_err)?;
    std::fs::copy(&template, &target).map_err(seed_err)?;
    info!("seeded {} from {}", target.display(), template.display());
    Ok(Some(target))
}

/// Load config relative to the current working directory, seeding it from
/// the defaults first if needed.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    seed_config(&cwd)?;
    load_config_from(&cwd)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if find_team(&config.player.team).is_none() {
        return Err(invalid(
            "player.team",
            format!(
                "unknown team {:?}; expected one of: {}",
                config.player.team,
                team_names().join(", ")
            ),
        ));
    }
    if config.player.name.trim().is_empty() {
        return Err(invalid("player.name", "must not be empty"));
    }

    let q = &config.query;
    if !q.over_under_line.is_finite() || q.over_under_line < 0.0 {
        return Err(invalid(
            "query.over_under_line",
            format!("must be a finite number >= 0, got {}", q.over_under_line),
        ));
    }
    if q.lookback_games == 0 {
        return Err(invalid("query.lookback_games", "must be > 0"));
    }
    if !(1..=MAX_SEASONS_BACK).contains(&q.seasons_back) {
        return Err(invalid(
            "query.seasons_back",
            format!("must be between 1 and {MAX_SEASONS_BACK}, got {}", q.seasons_back),
        ));
    }
    if q.opponent_cap == Some(0) {
        return Err(invalid("query.opponent_cap", "must be > 0 when set"));
    }

    let s = &config.source;
    if s.timeout_secs == 0 {
        return Err(invalid("source.timeout_secs", "must be > 0"));
    }
    if s.kind == SourceKind::Csv && s.csv_dir.trim().is_empty() {
        return Err(invalid("source.csv_dir", "required when source.kind = \"csv\""));
    }
    if s.kind == SourceKind::Http && s.base_url.trim().is_empty() {
        return Err(invalid("source.base_url", "required when source.kind = \"http\""));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
