//! Application configuration.
//!
//! Loaded from `config.toml` in the data directory; every section falls back
//! to its defaults when the file or a key is missing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "GAMEKEEPER_DATA_DIR";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Level curve used to seed the level table
    pub levels: LevelSettings,
    /// Streak rules
    pub streaks: StreakSettings,
    /// Starting balances
    pub economy: EconomySettings,
    /// Daily challenge generation
    pub challenges: ChallengeSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            levels: LevelSettings::default(),
            streaks: StreakSettings::default(),
            economy: EconomySettings::default(),
            challenges: ChallengeSettings::default(),
        }
    }
}

impl AppConfig {
    /// Path of the SQLite database inside the data directory.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("gamekeeper.db")
    }
}

/// Level curve: `min_xp(level) = floor(base_xp * (level - 1) ^ exponent)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelSettings {
    pub base_xp: u64,
    pub exponent: f64,
    pub max_level: u32,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            base_xp: 100,
            exponent: 1.5,
            max_level: 50,
        }
    }
}

/// Streak rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreakSettings {
    /// Minimum time between two counted activities
    pub min_increment_gap_hours: u32,
    /// Freeze duration used when the caller does not pick one
    pub default_freeze_hours: u32,
    /// Longest freeze a caller may ask for
    pub max_freeze_hours: u32,
    /// Freeze charges a newly created streak starts with
    pub starting_freezes: u32,
}

impl Default for StreakSettings {
    fn default() -> Self {
        Self {
            min_increment_gap_hours: 12,
            default_freeze_hours: 24,
            max_freeze_hours: 720,
            starting_freezes: 0,
        }
    }
}

/// Balances granted to new users.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomySettings {
    pub starting_coins: u64,
    pub starting_gems: u64,
}

impl Default for EconomySettings {
    fn default() -> Self {
        Self {
            starting_coins: 100,
            starting_gems: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeSettings {
    /// Challenges offered each day, drawn from the template catalog
    pub per_day: u32,
}

impl Default for ChallengeSettings {
    fn default() -> Self {
        Self { per_day: 3 }
    }
}

/// Get the application data directory.
///
/// `GAMEKEEPER_DATA_DIR` wins over the platform directory.
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    directories::ProjectDirs::from("com", "gamekeeper", "Gamekeeper")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Load application configuration from the default data directory.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&get_data_dir())
}

/// Load application configuration from `<data_dir>/config.toml`.
pub fn load_config_from(data_dir: &Path) -> Result<AppConfig, ConfigError> {
    let path = data_dir.join("config.toml");

    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(AppConfig {
            data_dir: data_dir.to_path_buf(),
            ..Default::default()
        });
    }

    let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let mut config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.data_dir = data_dir.to_path_buf();

    Ok(config)
}

/// Save application configuration to `<data_dir>/config.toml`.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    std::fs::create_dir_all(&config.data_dir).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(config.data_dir.join("config.toml"), content)
        .map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
